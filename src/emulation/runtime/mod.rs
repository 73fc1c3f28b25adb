//! Runtime support: emulated methods and their handlers.
//!
//! - `emulated` - handler contract, registry and dispatch
//! - [`reflect`] - `java.lang.reflect.Field` handlers

mod emulated;
pub mod reflect;

pub use emulated::{EmulatedMethod, EmulatedMethods, InvokeOutcome, ReturnBuilder};
pub use reflect::{
    FieldHandle, LocalFieldHandle, OpaqueFieldHandle, PlatformReflection, ReflectionTable,
    UnavailableReflection,
};
