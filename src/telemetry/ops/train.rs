use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Train;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, BuildSpec, Submit, Poll, Record }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::BuildSpec => "build_spec",
        Phase::Submit => "submit",
        Phase::Poll => "poll",
        Phase::Record => "record",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::BuildSpec => info_span!("build_spec"),
        Phase::Submit => info_span!("submit"),
        Phase::Poll => info_span!("poll"),
        Phase::Record => info_span!("record"),
    }}
}

impl OpMarker for Train {
    const NAME: &'static str = "train";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("train") }
}
