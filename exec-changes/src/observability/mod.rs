//! Observability utilities.

mod logging;
mod tracing;

pub use logging::{env_filter, init_tracing};
pub use tracing::{ResolutionSpanAttributes, SpanTimer};
