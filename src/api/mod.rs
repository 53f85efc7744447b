//! HTTP API.
//!
//! JSON over axum. Handlers translate bodies into pipeline calls and map
//! [`crate::pipeline::PipelineError`] onto status codes in [`error`].

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
