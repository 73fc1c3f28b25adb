//! `java.lang.reflect.Field.getName()` and `Field.getModifiers()`.

use crate::{
    emulation::{
        reflect::{handle::receiver, FIELD_GET_MODIFIERS, FIELD_GET_NAME},
        EmulatedMethod, ExecutionContext, ReturnBuilder, Value, VirtualMachine,
    },
    metadata::{AccessFlags, TypeDescriptor},
    Result,
};

/// Bits `Field.getModifiers()` reports (`java.lang.reflect.Modifier.fieldModifiers()`).
const FIELD_MODIFIERS: AccessFlags = AccessFlags::PUBLIC
    .union(AccessFlags::PRIVATE)
    .union(AccessFlags::PROTECTED)
    .union(AccessFlags::STATIC)
    .union(AccessFlags::FINAL)
    .union(AccessFlags::VOLATILE)
    .union(AccessFlags::TRANSIENT);

/// Handler for `Field.getName()`.
///
/// The name is part of the handle's identity, so this never consults the registry or the
/// fallback and never fails for a known handle.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldGetName;

impl EmulatedMethod for FieldGetName {
    fn signature(&self) -> &str {
        FIELD_GET_NAME
    }

    fn execute(&self, _vm: &VirtualMachine, context: &mut ExecutionContext) -> Result<()> {
        let result = ReturnBuilder::seed(context, TypeDescriptor::string());
        let Some(handle) = receiver(context)? else {
            return Ok(());
        };
        result.commit(context, Value::string(handle.name()))
    }
}

/// Handler for `Field.getModifiers()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldGetModifiers;

impl EmulatedMethod for FieldGetModifiers {
    fn signature(&self) -> &str {
        FIELD_GET_MODIFIERS
    }

    fn execute(&self, vm: &VirtualMachine, context: &mut ExecutionContext) -> Result<()> {
        let result = ReturnBuilder::seed(context, TypeDescriptor::int());
        let Some(handle) = receiver(context)? else {
            return Ok(());
        };

        let field = handle.describe(vm)?;
        // Masked to 0xDF, always positive.
        #[allow(clippy::cast_possible_wrap)]
        let modifiers = (field.access_flags() & FIELD_MODIFIERS).bits() as i32;
        result.commit(context, Value::int(modifiers))
    }
}
