//! Runtime value representation.
//!
//! - [`Value`] - a tracked register value: known (with a [`Payload`]) or unknown, always with a
//!   declared type
//! - [`Payload`] - the concrete content of a known value
//! - [`Instance`] - field state of an emulated object
//!
//! There is no merge/join here; combining states from different branches belongs to the
//! surrounding analysis.

mod emvalue;
mod instance;

pub use emvalue::{Payload, Value};
pub use instance::Instance;
