//! Shared plumbing for the tinyredis binaries: logging setup.

pub mod tracing;

pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, build_subscriber, init_tracing};
