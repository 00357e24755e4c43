use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Query;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Resolve, BuildPrompt, Invoke, Post }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Resolve => "resolve",
        Phase::BuildPrompt => "build_prompt",
        Phase::Invoke => "invoke",
        Phase::Post => "post",
    }}
    fn span(&self) -> Span { match self {
        Phase::Resolve => info_span!("resolve"),
        Phase::BuildPrompt => info_span!("build_prompt"),
        Phase::Invoke => info_span!("invoke"),
        Phase::Post => info_span!("post"),
    }}
}

impl OpMarker for Query {
    const NAME: &'static str = "query";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("query") }
}
