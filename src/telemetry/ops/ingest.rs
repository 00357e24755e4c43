use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Ingest;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Dataset, FetchRows, ParseRows, WriteExample }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Dataset => "dataset",
        Phase::FetchRows => "fetch_rows",
        Phase::ParseRows => "parse_rows",
        Phase::WriteExample => "write_example",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Dataset => info_span!("dataset"),
        Phase::FetchRows => info_span!("fetch_rows"),
        Phase::ParseRows => info_span!("parse_rows"),
        Phase::WriteExample => info_span!("write_example"),
    }}
}

impl OpMarker for Ingest {
    const NAME: &'static str = "ingest";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("ingest") }
}
