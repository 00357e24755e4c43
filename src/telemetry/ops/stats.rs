use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Stats;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Summary, Dataset, Job, Endpoint }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Summary => "summary",
        Phase::Dataset => "dataset",
        Phase::Job => "job",
        Phase::Endpoint => "endpoint",
    }}
    fn span(&self) -> Span { match self {
        Phase::Summary => info_span!("summary"),
        Phase::Dataset => info_span!("dataset"),
        Phase::Job => info_span!("job"),
        Phase::Endpoint => info_span!("endpoint"),
    }}
}

impl OpMarker for Stats {
    const NAME: &'static str = "stats";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("stats") }
}
