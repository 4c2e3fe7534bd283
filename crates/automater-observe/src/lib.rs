//! Observability for the automater trigger service: subscriber setup and
//! the span field names shared by the HTTP layer and the pipeline.

pub mod fields;
pub mod tracing_setup;
