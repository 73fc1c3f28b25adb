//! Metadata of the analyzed artifact.
//!
//! This module holds the static description of the code under analysis, as handed over by the
//! (external) dex loader:
//!
//! - [`TypeDescriptor`] / [`Primitive`] - Dalvik type descriptors
//! - [`AccessFlags`] / [`Visibility`] - field access flags
//! - [`FieldId`] / [`FieldDescriptor`] - field identity and declared fields
//! - [`ClassDef`] / [`ClassRegistry`] - local class definitions and the registry that separates
//!   local from non-local classes
//!
//! Everything here is immutable once loaded and safe to share across threads.

mod access;
mod field;
mod registry;
mod typedesc;

pub use access::{AccessFlags, Visibility};
pub use field::{FieldDescriptor, FieldId};
pub use registry::{ClassDef, ClassRegistry};
pub use typedesc::{
    Primitive, TypeDescriptor, FIELD_DESCRIPTOR, OBJECT_DESCRIPTOR, STRING_DESCRIPTOR,
};
