use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Pack;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, SelectExamples, Render, Tokenize, PackBlocks, WriteShard, UpdateStatus }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::SelectExamples => "select_examples",
        Phase::Render => "render",
        Phase::Tokenize => "tokenize",
        Phase::PackBlocks => "pack_blocks",
        Phase::WriteShard => "write_shard",
        Phase::UpdateStatus => "update_status",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::SelectExamples => info_span!("select_examples"),
        Phase::Render => info_span!("render"),
        Phase::Tokenize => info_span!("tokenize"),
        Phase::PackBlocks => info_span!("pack_blocks"),
        Phase::WriteShard => info_span!("write_shard"),
        Phase::UpdateStatus => info_span!("update_status"),
    }}
}

impl OpMarker for Pack {
    const NAME: &'static str = "pack";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("pack") }
}
