use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Upload;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, FetchBatch, ReadShard, PutObject, MarkUploaded }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::FetchBatch => "fetch_batch",
        Phase::ReadShard => "read_shard",
        Phase::PutObject => "put_object",
        Phase::MarkUploaded => "mark_uploaded",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::FetchBatch => info_span!("fetch_batch"),
        Phase::ReadShard => info_span!("read_shard"),
        Phase::PutObject => info_span!("put_object"),
        Phase::MarkUploaded => info_span!("mark_uploaded"),
    }}
}

impl OpMarker for Upload {
    const NAME: &'static str = "upload";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("upload") }
}
