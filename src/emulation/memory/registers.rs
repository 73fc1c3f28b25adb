//! Per-invocation register state.
//!
//! A [`RegisterFile`] is created for each method invocation and discarded on return. It holds
//! the method's registers, the parameter window the caller populates before the call, and two
//! slots outside the numbered registers:
//!
//! - the return slot, this invocation's own result
//! - the invoke result, the result of the last call this frame made (what `move-result` reads)
//!
//! # Parameter Window
//!
//! As in the Dalvik calling convention, parameters occupy the highest-numbered registers, in
//! argument order. A `long` or `double` parameter takes two consecutive registers but remains a
//! single parameter index:
//!
//! ```text
//! registers: 5, parameters: (I, J)
//!
//!   v0  v1  v2  v3  v4
//!   --  --  p0  p1  p1'
//! ```
//!
//! Parameter indices used by [`RegisterFile::peek_parameter`] count parameters, not registers.

use log::trace;

use crate::{
    emulation::{EmulationError, Value},
    metadata::TypeDescriptor,
    Result,
};

/// Registers of one method invocation.
///
/// # Example
///
/// ```rust
/// use dexscope::emulation::{RegisterFile, Value};
/// use dexscope::metadata::TypeDescriptor;
///
/// let mut registers = RegisterFile::with_parameters(vec![
///     Value::int(7),
///     Value::unknown(TypeDescriptor::object()),
/// ]);
///
/// assert_eq!(registers.peek_parameter(0)?, &Value::int(7));
/// // Peeking does not consume.
/// assert_eq!(registers.peek_parameter(0)?, &Value::int(7));
///
/// registers.assign_return_register(Value::int(1));
/// registers.assign_return_register(Value::int(2));
/// assert_eq!(registers.read_return_register(), Some(&Value::int(2)));
/// # Ok::<(), dexscope::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct RegisterFile {
    /// Register slots; `None` until first written.
    registers: Vec<Option<Value>>,
    /// First register of each parameter, in argument order.
    parameters: Vec<usize>,
    /// This invocation's own result.
    return_slot: Option<Value>,
    /// Result of the last invocation made from this frame.
    invoke_result: Option<Value>,
    trace: bool,
}

impl RegisterFile {
    /// Creates a register file with `register_count` registers and a parameter window laid out
    /// from `parameter_types` at the top of the frame.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::RegisterOutOfRange`] if the parameters do not fit in
    /// `register_count` registers.
    pub fn new(register_count: usize, parameter_types: &[TypeDescriptor]) -> Result<Self> {
        let width: usize = parameter_types
            .iter()
            .map(TypeDescriptor::register_width)
            .sum();
        if width > register_count {
            return Err(EmulationError::RegisterOutOfRange {
                index: width - 1,
                count: register_count,
            }
            .into());
        }

        let mut parameters = Vec::with_capacity(parameter_types.len());
        let mut next = register_count - width;
        for ty in parameter_types {
            parameters.push(next);
            next += ty.register_width();
        }

        Ok(RegisterFile {
            registers: vec![None; register_count],
            parameters,
            return_slot: None,
            invoke_result: None,
            trace: false,
        })
    }

    /// Creates a register file holding exactly the given parameters, already assigned.
    ///
    /// This is the frame an emulated method sees: no locals, only arguments.
    #[must_use]
    pub fn with_parameters(values: Vec<Value>) -> Self {
        let mut registers = Vec::new();
        let mut parameters = Vec::with_capacity(values.len());
        for value in values {
            parameters.push(registers.len());
            let wide = value.declared_type().is_wide();
            registers.push(Some(value));
            if wide {
                registers.push(None);
            }
        }

        RegisterFile {
            registers,
            parameters,
            return_slot: None,
            invoke_result: None,
            trace: false,
        }
    }

    /// Enables `trace!` logging of parameter peeks and return-register writes.
    pub fn set_tracing(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Number of registers, parameter registers included.
    #[must_use]
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Number of parameters (not registers) in the parameter window.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Returns the value bound to parameter `index` without consuming it.
    ///
    /// # Errors
    ///
    /// - [`EmulationError::ParameterOutOfRange`] if `index` is not a parameter index
    /// - [`EmulationError::UninitializedRegister`] if the caller never populated the parameter
    pub fn peek_parameter(&self, index: usize) -> Result<&Value> {
        let register = self.parameter_register(index)?;
        let value = self.read_register(register)?;
        if self.trace {
            trace!("peek p{index} (v{register}) = {value}");
        }
        Ok(value)
    }

    /// Binds a parameter before the invocation. Used by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::ParameterOutOfRange`] if `index` is not a parameter index.
    pub fn assign_parameter(&mut self, index: usize, value: Value) -> Result<()> {
        let register = self.parameter_register(index)?;
        self.assign_register(register, value)
    }

    /// Writes a register.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::RegisterOutOfRange`] if `index` is outside the frame.
    pub fn assign_register(&mut self, index: usize, value: Value) -> Result<()> {
        let count = self.registers.len();
        let slot = self
            .registers
            .get_mut(index)
            .ok_or(EmulationError::RegisterOutOfRange { index, count })?;
        *slot = Some(value);
        Ok(())
    }

    /// Reads a register.
    ///
    /// # Errors
    ///
    /// - [`EmulationError::RegisterOutOfRange`] if `index` is outside the frame
    /// - [`EmulationError::UninitializedRegister`] if nothing was written to it
    pub fn read_register(&self, index: usize) -> Result<&Value> {
        match self.registers.get(index) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(EmulationError::UninitializedRegister { index }.into()),
            None => Err(EmulationError::RegisterOutOfRange {
                index,
                count: self.registers.len(),
            }
            .into()),
        }
    }

    /// Binds `value` as the invocation's result. Last write wins.
    pub fn assign_return_register(&mut self, value: Value) {
        if self.trace {
            trace!("return <- {value}");
        }
        self.return_slot = Some(value);
    }

    /// The current result, if any was assigned.
    #[must_use]
    pub fn read_return_register(&self) -> Option<&Value> {
        self.return_slot.as_ref()
    }

    /// Removes and returns the current result.
    pub fn take_return_register(&mut self) -> Option<Value> {
        self.return_slot.take()
    }

    /// Records the result of a call made from this frame.
    pub fn assign_invoke_result(&mut self, value: Value) {
        if self.trace {
            trace!("invoke result <- {value}");
        }
        self.invoke_result = Some(value);
    }

    /// Forgets the previous call's result, after a call that produced none.
    pub fn clear_invoke_result(&mut self) {
        self.invoke_result = None;
    }

    /// Result of the last call made from this frame, if it produced one.
    #[must_use]
    pub fn read_invoke_result(&self) -> Option<&Value> {
        self.invoke_result.as_ref()
    }

    /// Removes and returns the last call's result (`move-result`).
    pub fn take_invoke_result(&mut self) -> Option<Value> {
        self.invoke_result.take()
    }

    fn parameter_register(&self, index: usize) -> Result<usize> {
        self.parameters.get(index).copied().ok_or_else(|| {
            EmulationError::ParameterOutOfRange {
                index,
                count: self.parameters.len(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Primitive;

    #[test]
    fn test_parameter_window_layout() {
        let long = TypeDescriptor::Primitive(Primitive::Long);
        let mut registers =
            RegisterFile::new(5, &[TypeDescriptor::int(), long.clone()]).unwrap();

        registers.assign_parameter(0, Value::int(1)).unwrap();
        registers.assign_parameter(1, Value::long(2)).unwrap();

        assert_eq!(registers.parameter_count(), 2);
        assert_eq!(registers.read_register(2).unwrap(), &Value::int(1));
        assert_eq!(registers.read_register(3).unwrap(), &Value::long(2));
        assert_eq!(registers.peek_parameter(1).unwrap().declared_type(), &long);
    }

    #[test]
    fn test_parameters_must_fit() {
        let err = RegisterFile::new(1, &[TypeDescriptor::int(), TypeDescriptor::int()])
            .unwrap_err();
        assert!(matches!(
            err.emulation(),
            Some(EmulationError::RegisterOutOfRange { count: 1, .. })
        ));
    }

    #[test]
    fn test_peek_out_of_range() {
        let registers = RegisterFile::with_parameters(vec![Value::int(0)]);
        let err = registers.peek_parameter(1).unwrap_err();
        assert_eq!(
            err.emulation(),
            Some(&EmulationError::ParameterOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn test_peek_unassigned_parameter() {
        let registers = RegisterFile::new(2, &[TypeDescriptor::int()]).unwrap();
        let err = registers.peek_parameter(0).unwrap_err();
        assert_eq!(
            err.emulation(),
            Some(&EmulationError::UninitializedRegister { index: 1 })
        );
    }

    #[test]
    fn test_wide_parameter_counts_once() {
        let registers = RegisterFile::with_parameters(vec![Value::long(1), Value::int(2)]);
        assert_eq!(registers.parameter_count(), 2);
        assert_eq!(registers.register_count(), 3);
        assert_eq!(registers.peek_parameter(1).unwrap(), &Value::int(2));
    }

    #[test]
    fn test_return_register_last_write_wins() {
        let mut registers = RegisterFile::default();
        assert!(registers.read_return_register().is_none());

        registers.assign_return_register(Value::unknown(TypeDescriptor::object()));
        registers.assign_return_register(Value::int(5));
        assert_eq!(registers.take_return_register(), Some(Value::int(5)));
        assert!(registers.read_return_register().is_none());
    }

    #[test]
    fn test_invoke_result_separate_from_return() {
        let mut registers = RegisterFile::default();
        registers.assign_invoke_result(Value::int(3));
        assert!(registers.read_return_register().is_none());

        registers.assign_return_register(Value::int(4));
        assert_eq!(registers.take_invoke_result(), Some(Value::int(3)));
        assert!(registers.read_invoke_result().is_none());
        assert_eq!(registers.read_return_register(), Some(&Value::int(4)));
    }

    #[test]
    fn test_register_bounds() {
        let mut registers = RegisterFile::new(2, &[]).unwrap();
        assert!(registers.assign_register(1, Value::int(0)).is_ok());
        assert!(registers.assign_register(2, Value::int(0)).is_err());
        assert!(matches!(
            registers.read_register(0).unwrap_err().emulation(),
            Some(EmulationError::UninitializedRegister { index: 0 })
        ));
    }
}
