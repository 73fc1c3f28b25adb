//! Execution state and error conditions.
//!
//! - [`ExecutionContext`] - per-invocation state: registers, call lineage, lineage-owned static
//!   state
//! - [`EmulationError`] - conditions raised while emulating

mod context;
mod error;

pub use context::ExecutionContext;
pub use error::{platform_exception, EmulationError, InvalidInstanceReason};
