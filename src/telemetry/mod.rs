pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

// Factory helpers: one typed context per pipeline op
pub fn init() -> LogCtx<ops::init::Init> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn dataset() -> LogCtx<ops::dataset::Dataset> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn ingest() -> LogCtx<ops::ingest::Ingest> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn pack() -> LogCtx<ops::pack::Pack> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn upload() -> LogCtx<ops::upload::Upload> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn train() -> LogCtx<ops::train::Train> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn deploy() -> LogCtx<ops::deploy::Deploy> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn query() -> LogCtx<ops::query::Query> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn stats() -> LogCtx<ops::stats::Stats> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn gc() -> LogCtx<ops::gc::Gc> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
