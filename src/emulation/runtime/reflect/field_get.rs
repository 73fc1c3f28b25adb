//! `java.lang.reflect.Field.get(Object)`.
//!
//! # Resolution
//!
//! | Step | Static field | Instance field |
//! |------|--------------|----------------|
//! | 1. Identify | handle → [`FieldDescriptor`] | handle → [`FieldDescriptor`] |
//! | 2. Access | non-public fails with `AccessDenied` | non-public fails with `AccessDenied` |
//! | 3. Dispatch | instance ignored, read through the static store (local) or the fallback (non-local) | instance (unboxed) must be a compatible non-null reference; read its own state (local) or ask the fallback (non-local) |
//! | 4. Commit | boxed into the `Ljava/lang/Object;` return register | boxed into the `Ljava/lang/Object;` return register |
//!
//! Under [`InitOrder::InitializeFirst`] a static read initializes the defining class before
//! step 2; under [`InitOrder::AccessCheckFirst`] it happens in step 3.

use log::debug;

use crate::{
    emulation::{
        reflect::{handle::receiver, FIELD_GET},
        EmulatedMethod, EmulationError, ExecutionContext, InitOrder, InvalidInstanceReason,
        Payload, ReturnBuilder, Value, VirtualMachine,
    },
    metadata::{FieldDescriptor, TypeDescriptor},
    Result,
};

/// Handler for `Field.get(Object)`.
///
/// Parameter 0 is the field handle, parameter 1 the instance (ignored for static fields).
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldGet;

impl EmulatedMethod for FieldGet {
    fn signature(&self) -> &str {
        FIELD_GET
    }

    fn execute(&self, vm: &VirtualMachine, context: &mut ExecutionContext) -> Result<()> {
        let result = ReturnBuilder::seed(context, TypeDescriptor::object());

        let Some(handle) = receiver(context)? else {
            return Ok(());
        };
        let field = handle.describe(vm)?;

        let value = if field.is_static() {
            read_static(vm, context, &field)?
        } else {
            check_access(&field)?;
            let instance = context.registers().peek_parameter(1)?.clone();
            read_instance(vm, &field, &instance)?
        };

        result.commit(context, value)
    }
}

fn check_access(field: &FieldDescriptor) -> Result<()> {
    if field.is_public() {
        return Ok(());
    }
    Err(EmulationError::AccessDenied {
        field: field.id().clone(),
        visibility: field.visibility(),
    }
    .into())
}

/// Initializes the defining class in the context's lineage. Non-local classes have no
/// interpretable initializer; their first access is only recorded.
fn initialize(
    vm: &VirtualMachine,
    context: &mut ExecutionContext,
    class: &TypeDescriptor,
) -> Result<()> {
    if vm.registry().is_local_class(class) {
        vm.statics().ensure_initialized(context, class)?;
    } else if context.mark_class_initialized(class) {
        debug!("initializing non-local {class} at depth {}", context.call_depth());
    }
    Ok(())
}

fn read_static(
    vm: &VirtualMachine,
    context: &mut ExecutionContext,
    field: &FieldDescriptor,
) -> Result<Value> {
    match vm.config().init_order {
        InitOrder::InitializeFirst => {
            initialize(vm, context, field.defining_class())?;
            check_access(field)?;
        }
        InitOrder::AccessCheckFirst => {
            check_access(field)?;
            initialize(vm, context, field.defining_class())?;
        }
    }

    if vm.registry().is_local_class(field.defining_class()) {
        return vm.statics().get_field(context, field.id());
    }

    Ok(vm
        .reflection()
        .static_value(field)
        .unwrap_or_else(|| Value::unknown(field.declared_type().clone())))
}

fn read_instance(
    vm: &VirtualMachine,
    field: &FieldDescriptor,
    instance: &Value,
) -> Result<Value> {
    let invalid = |reason: InvalidInstanceReason| -> crate::Error {
        EmulationError::InvalidInstance {
            field: field.id().clone(),
            reason,
        }
        .into()
    };
    let incompatible = |found: &TypeDescriptor| {
        invalid(InvalidInstanceReason::Incompatible {
            found: found.clone(),
        })
    };
    let unknown = || Value::unknown(field.declared_type().clone());

    // Results of earlier reflective reads arrive boxed.
    let instance = instance.unboxed();
    let runtime_class = match instance.payload() {
        None => instance.declared_type().clone(),
        Some(Payload::Null) => return Err(invalid(InvalidInstanceReason::Null)),
        Some(Payload::Object(object)) => object.class().clone(),
        Some(Payload::String(_)) => TypeDescriptor::string(),
        Some(Payload::FieldHandle(_)) => TypeDescriptor::field(),
        Some(_) => return Err(incompatible(instance.declared_type())),
    };

    if !vm.is_instance_of(&runtime_class, field.defining_class()) {
        return Err(incompatible(&runtime_class));
    }

    if instance.is_unknown() {
        return Ok(unknown());
    }

    if vm.registry().is_local_class(field.defining_class()) {
        return Ok(instance
            .as_instance()
            .map_or_else(unknown, |object| object.read_field(field.id())));
    }

    Ok(vm
        .reflection()
        .instance_value(field, instance)
        .unwrap_or_else(unknown))
}
