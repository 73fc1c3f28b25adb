//! Reflective field handles.
//!
//! A `java.lang.reflect.Field` value in a register is a [`FieldHandle`]. Two variants exist:
//!
//! - [`LocalFieldHandle`] - the analyzer's own symbolic handle for a field of a local class,
//!   resolved against the [`ClassRegistry`](crate::metadata::ClassRegistry)
//! - [`OpaqueFieldHandle`] - a handle for a field of a non-local class, described by the
//!   [`PlatformReflection`](super::PlatformReflection) fallback
//!
//! Handlers only ever talk to the trait; which variant they hold never matters to them.

use std::{fmt, sync::Arc};

use crate::{
    emulation::{EmulationError, ExecutionContext, Payload, VirtualMachine},
    metadata::{FieldDescriptor, FieldId, TypeDescriptor},
    Result,
};

/// Capability of a reflective field handle.
pub trait FieldHandle: Send + Sync + fmt::Debug {
    /// Identity of the field the handle refers to.
    fn id(&self) -> &FieldId;

    /// Returns `true` if the handle was created for a field of a local class.
    fn is_local(&self) -> bool;

    /// Resolves the full field descriptor, including access flags.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::NoSuchField`] if neither the registry nor the fallback knows
    /// the field.
    fn describe(&self, vm: &VirtualMachine) -> Result<FieldDescriptor>;

    /// The class declaring the field.
    fn defining_class(&self) -> &TypeDescriptor {
        self.id().defining_class()
    }

    /// The field name.
    fn name(&self) -> &str {
        self.id().name()
    }

    /// The field's declared type.
    fn declared_type(&self) -> &TypeDescriptor {
        self.id().declared_type()
    }
}

/// Symbolic handle for a field of a local class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalFieldHandle {
    id: FieldId,
}

impl LocalFieldHandle {
    /// Creates a handle for `id`.
    #[must_use]
    pub fn new(id: FieldId) -> Self {
        LocalFieldHandle { id }
    }

    /// Creates a handle for a declared field.
    #[must_use]
    pub fn from_descriptor(field: &FieldDescriptor) -> Self {
        Self::new(field.id().clone())
    }
}

impl FieldHandle for LocalFieldHandle {
    fn id(&self) -> &FieldId {
        &self.id
    }

    fn is_local(&self) -> bool {
        true
    }

    fn describe(&self, vm: &VirtualMachine) -> Result<FieldDescriptor> {
        vm.registry().find_field(&self.id).ok_or_else(|| {
            EmulationError::NoSuchField {
                field: self.id.clone(),
            }
            .into()
        })
    }
}

/// Handle for a field of a non-local class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueFieldHandle {
    id: FieldId,
}

impl OpaqueFieldHandle {
    /// Creates a handle for `id`.
    #[must_use]
    pub fn new(id: FieldId) -> Self {
        OpaqueFieldHandle { id }
    }
}

impl FieldHandle for OpaqueFieldHandle {
    fn id(&self) -> &FieldId {
        &self.id
    }

    fn is_local(&self) -> bool {
        false
    }

    fn describe(&self, vm: &VirtualMachine) -> Result<FieldDescriptor> {
        vm.reflection().describe(&self.id).ok_or_else(|| {
            EmulationError::NoSuchField {
                field: self.id.clone(),
            }
            .into()
        })
    }
}

/// Reads the field handle a `java.lang.reflect.Field` method is invoked on (parameter 0).
///
/// Returns `None` for an unknown handle: the call's result is then unknown as well.
///
/// # Errors
///
/// Returns [`EmulationError::UnexpectedParameter`] if parameter 0 is known but not a field
/// handle (including `null`).
pub(crate) fn receiver(context: &ExecutionContext) -> Result<Option<Arc<dyn FieldHandle>>> {
    let value = context.registers().peek_parameter(0)?;
    match value.payload() {
        None => Ok(None),
        Some(Payload::FieldHandle(handle)) => Ok(Some(Arc::clone(handle))),
        Some(_) => Err(EmulationError::UnexpectedParameter {
            index: 0,
            expected: "field handle",
            found: value.declared_type().clone(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emulation::{RegisterFile, Value},
        metadata::{AccessFlags, ClassDef, ClassRegistry},
    };

    fn vm() -> VirtualMachine {
        let registry = ClassRegistry::from_definitions(vec![ClassDef::new(
            TypeDescriptor::class("LC;"),
        )
        .field("f", TypeDescriptor::int(), AccessFlags::PUBLIC)])
        .unwrap();
        VirtualMachine::builder(Arc::new(registry)).build()
    }

    #[test]
    fn test_local_describe() {
        let vm = vm();
        let handle = LocalFieldHandle::new(FieldId::parse("LC;->f:I").unwrap());
        let field = handle.describe(&vm).unwrap();
        assert!(field.is_public());
        assert!(handle.is_local());
        assert_eq!(handle.name(), "f");

        let missing = LocalFieldHandle::new(FieldId::parse("LC;->f:J").unwrap());
        assert!(matches!(
            missing.describe(&vm).unwrap_err().emulation(),
            Some(EmulationError::NoSuchField { .. })
        ));
    }

    #[test]
    fn test_opaque_without_fallback() {
        let vm = vm();
        let handle = OpaqueFieldHandle::new(FieldId::parse("LX;->y:I").unwrap());
        assert!(!handle.is_local());
        assert!(handle.describe(&vm).is_err());
    }

    #[test]
    fn test_receiver() {
        let handle: Arc<dyn FieldHandle> =
            Arc::new(LocalFieldHandle::new(FieldId::parse("LC;->f:I").unwrap()));
        let ctx = ExecutionContext::new(RegisterFile::with_parameters(vec![
            Value::field_handle(Arc::clone(&handle)),
        ]));
        assert_eq!(receiver(&ctx).unwrap().unwrap().id(), handle.id());

        let ctx = ExecutionContext::new(RegisterFile::with_parameters(vec![Value::unknown(
            TypeDescriptor::field(),
        )]));
        assert!(receiver(&ctx).unwrap().is_none());

        let ctx = ExecutionContext::new(RegisterFile::with_parameters(vec![Value::int(1)]));
        assert!(matches!(
            receiver(&ctx).unwrap_err().emulation(),
            Some(EmulationError::UnexpectedParameter { index: 0, .. })
        ));
    }
}
