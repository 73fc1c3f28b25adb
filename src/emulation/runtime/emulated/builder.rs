//! Two-phase return-register writes.

use crate::{
    emulation::{EmulationError, ExecutionContext, Payload, Value},
    metadata::TypeDescriptor,
    Result,
};

/// Tentative result of an emulated method.
///
/// [`seed`](Self::seed) writes an unknown value of the method's return type before anything is
/// resolved; [`commit`](Self::commit) replaces it once the call succeeded. Dropping the builder
/// without committing leaves the seeded unknown value as the call's result.
///
/// # Example
///
/// ```rust
/// use dexscope::emulation::{ExecutionContext, RegisterFile, ReturnBuilder, Value};
/// use dexscope::metadata::TypeDescriptor;
///
/// let mut context = ExecutionContext::new(RegisterFile::default());
///
/// let result = ReturnBuilder::seed(&mut context, TypeDescriptor::object());
/// assert!(context.registers().read_return_register().unwrap().is_unknown());
///
/// result.commit(&mut context, Value::int(1))?;
/// let value = context.registers().read_return_register().unwrap();
/// assert_eq!(value.declared_type(), &TypeDescriptor::object());
/// assert_eq!(value.unboxed(), &Value::int(1));
/// # Ok::<(), dexscope::Error>(())
/// ```
#[derive(Debug)]
#[must_use = "dropping a ReturnBuilder leaves the seeded unknown value as the result"]
pub struct ReturnBuilder {
    declared_type: TypeDescriptor,
}

impl ReturnBuilder {
    /// Seeds the return register with an unknown value of `declared_type`.
    pub fn seed(context: &mut ExecutionContext, declared_type: TypeDescriptor) -> Self {
        context
            .registers_mut()
            .assign_return_register(Value::unknown(declared_type.clone()));
        ReturnBuilder { declared_type }
    }

    /// The return type the register is declared with.
    #[must_use]
    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }

    /// Replaces the seeded value with the resolved one.
    ///
    /// A value of exactly the return type is stored as is. For a `Ljava/lang/Object;` return
    /// type any other value is boxed: the register keeps the generic outer type and the value
    /// keeps its own declared type inside the payload.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::TypeMismatch`] if the value cannot be stored under the return
    /// type. The seeded value stays in place.
    pub fn commit(self, context: &mut ExecutionContext, value: Value) -> Result<()> {
        let value = if value.declared_type() == &self.declared_type {
            value
        } else if self.declared_type.is_object() {
            Value::boxed(value)
        } else {
            return Err(EmulationError::TypeMismatch {
                expected: self.declared_type,
                found: value.payload().map_or("unknown", Payload::kind),
            }
            .into());
        };

        context.registers_mut().assign_return_register(value);
        Ok(())
    }
}
