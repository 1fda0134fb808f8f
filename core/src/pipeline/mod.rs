// core/src/pipeline/mod.rs

//! A small asynchronous step pipeline.
//!
//! A `Pipeline<TData, Err>` is an ordered list of named steps. Each step owns
//! zero or more handlers that receive a shared `ContextData<TData>` and return
//! `Result<PipelineControl, Err>`. Checkout and webhook fulfillment are both
//! written as pipelines so that every stage shows up as its own span in the logs
//! and can stop the run early with an acknowledged outcome.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline, StepDef};
