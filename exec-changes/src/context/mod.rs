//! Context management for incremental execution.
//!
//! Each step receives an immutable context and hands the next step a new
//! one that is a strict superset of what it received.

mod incremental;

pub use incremental::{IncrementalChangesContext, IncrementalContext, WorkContext};
