//! Emulated-method framework.
//!
//! An emulated method reproduces the externally observable behavior of a platform API call the
//! interpreter cannot execute directly (reflection, native code, I/O).
//!
//! - [`EmulatedMethod`] - the handler contract
//! - [`EmulatedMethods`] - signature-keyed registry and dispatch
//! - [`ReturnBuilder`] - seed-then-commit return register writes
//! - [`InvokeOutcome`] - normal or abrupt completion of a dispatched call

mod builder;
mod manager;
mod types;

pub use builder::ReturnBuilder;
pub use manager::EmulatedMethods;
pub use types::{EmulatedMethod, InvokeOutcome};
