use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Deploy;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Create, Poll, Record }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Create => "create",
        Phase::Poll => "poll",
        Phase::Record => "record",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Create => info_span!("create"),
        Phase::Poll => info_span!("poll"),
        Phase::Record => info_span!("record"),
    }}
}

impl OpMarker for Deploy {
    const NAME: &'static str = "deploy";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("deploy") }
}
