//! Core types for emulated methods.
//!
//! - [`EmulatedMethod`]: the uniform contract every handler implements
//! - [`InvokeOutcome`]: what happened when the opcode loop dispatched a call

use crate::{
    emulation::{EmulationError, ExecutionContext, VirtualMachine},
    Result,
};

/// A handler reproducing the observable behavior of a platform API call the interpreter cannot
/// execute.
///
/// # Contract
///
/// - The caller has populated the parameter window of `context`'s register file in the real
///   call's argument order, receiver first
/// - The handler either leaves exactly one return-register assignment, or returns an error
/// - Handlers run synchronously and never suspend
///
/// Handlers that return a value seed the return register before resolving anything (see
/// [`ReturnBuilder`](crate::emulation::ReturnBuilder)), so a failing call still leaves a
/// well-typed unknown result behind.
///
/// # Examples
///
/// ```rust
/// use dexscope::emulation::{EmulatedMethod, ExecutionContext, ReturnBuilder, VirtualMachine};
/// use dexscope::metadata::TypeDescriptor;
///
/// struct NanoTime;
///
/// impl EmulatedMethod for NanoTime {
///     fn signature(&self) -> &str {
///         "Ljava/lang/System;->nanoTime()J"
///     }
///
///     fn execute(&self, _vm: &VirtualMachine, context: &mut ExecutionContext) -> dexscope::Result<()> {
///         // The clock is not deterministic.
///         let _ = ReturnBuilder::seed(context, TypeDescriptor::parse("J")?);
///         Ok(())
///     }
/// }
/// ```
pub trait EmulatedMethod: Send + Sync {
    /// Full signature of the emulated method, e.g.
    /// `Ljava/lang/reflect/Field;->get(Ljava/lang/Object;)Ljava/lang/Object;`.
    fn signature(&self) -> &str;

    /// Executes the call against `context`.
    ///
    /// # Errors
    ///
    /// Conditions for which [`EmulationError::is_platform_exception`] holds model the exception
    /// the real call would throw; anything else is a failure of the analysis.
    fn execute(&self, vm: &VirtualMachine, context: &mut ExecutionContext) -> Result<()>;
}

/// Result of dispatching a call through
/// [`EmulatedMethods::invoke`](crate::emulation::EmulatedMethods::invoke).
///
/// # Examples
///
/// ```rust,ignore
/// match vm.invoke(signature, &mut context)? {
///     InvokeOutcome::NotEmulated => {
///         // interpret the callee, or treat its result as unknown
///     }
///     InvokeOutcome::Completed => {
///         let result = context.registers_mut().take_return_register();
///     }
///     InvokeOutcome::Threw { exception_class, .. } => {
///         // dispatch to the matching catch handler
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeOutcome {
    /// No handler is registered for the signature.
    NotEmulated,

    /// The handler completed normally. The result, if any, is in the return register.
    Completed,

    /// The call completed abruptly with a platform exception.
    ///
    /// The return register still holds whatever the handler seeded.
    Threw {
        /// Descriptor of the thrown exception class.
        exception_class: &'static str,
        /// The condition that caused it.
        condition: EmulationError,
    },
}

impl InvokeOutcome {
    /// Returns `true` if the call completed abruptly.
    #[must_use]
    pub fn is_throw(&self) -> bool {
        matches!(self, InvokeOutcome::Threw { .. })
    }
}
