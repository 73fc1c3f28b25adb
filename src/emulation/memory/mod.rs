//! Memory model: registers and static fields.
//!
//! - [`RegisterFile`] - registers of one invocation, with parameter window and return slot
//! - [`StaticFieldStore`] - static field access for local classes, with initialization
//! - [`ClassInitializer`] - hook for running `<clinit>` bodies

mod registers;
mod statics;

pub use registers::RegisterFile;
pub use statics::{ClassInitializer, StaticFieldStore};
