//! Registry and dispatch of emulated methods.
//!
//! This module provides [`EmulatedMethods`], which maps full method signatures to handlers and
//! runs them on behalf of the opcode loop.

use std::{collections::HashMap, sync::Arc};

use log::{debug, trace};

use crate::{
    emulation::{
        runtime::emulated::types::{EmulatedMethod, InvokeOutcome},
        ExecutionContext, VirtualMachine,
    },
    Result,
};

/// Registry of emulated methods, keyed by full method signature.
///
/// # Dispatch
///
/// [`invoke`](Self::invoke) looks up the handler for a signature and runs it:
///
/// 1. No handler: [`InvokeOutcome::NotEmulated`], the context is untouched
/// 2. Handler succeeded: [`InvokeOutcome::Completed`]
/// 3. Handler raised a platform exception condition: [`InvokeOutcome::Threw`] naming the
///    exception class, which the opcode loop turns into an abrupt completion
/// 4. Any other error is a failure of the analysis and propagates as `Err`
///
/// # Examples
///
/// ```rust
/// use dexscope::emulation::{reflect, EmulatedMethods};
///
/// let mut methods = EmulatedMethods::new();
/// reflect::register(&mut methods);
///
/// assert!(methods.can_emulate(reflect::FIELD_GET));
/// assert!(!methods.can_emulate("Ljava/lang/Object;->hashCode()I"));
/// ```
#[derive(Default, Clone)]
pub struct EmulatedMethods {
    methods: HashMap<String, Arc<dyn EmulatedMethod>>,
}

impl EmulatedMethods {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its own signature.
    ///
    /// A handler already registered for the same signature is replaced and returned.
    pub fn register(&mut self, method: Arc<dyn EmulatedMethod>) -> Option<Arc<dyn EmulatedMethod>> {
        let signature = method.signature().to_string();
        self.methods.insert(signature, method)
    }

    /// Returns the handler for `signature`.
    #[must_use]
    pub fn get(&self, signature: &str) -> Option<Arc<dyn EmulatedMethod>> {
        self.methods.get(signature).cloned()
    }

    /// Returns `true` if a handler is registered for `signature`.
    #[must_use]
    pub fn can_emulate(&self, signature: &str) -> bool {
        self.methods.contains_key(signature)
    }

    /// Dispatches a call.
    ///
    /// # Arguments
    ///
    /// * `vm` - The virtual machine the handler may consult
    /// * `signature` - Full signature of the called method
    /// * `context` - Context whose parameter window holds the call's arguments
    ///
    /// # Errors
    ///
    /// Returns the handler's error if it is not a platform exception condition.
    pub fn invoke(
        &self,
        vm: &VirtualMachine,
        signature: &str,
        context: &mut ExecutionContext,
    ) -> Result<InvokeOutcome> {
        let Some(method) = self.methods.get(signature) else {
            return Ok(InvokeOutcome::NotEmulated);
        };

        if vm.config().tracing.trace_dispatch {
            trace!("dispatch {signature} at depth {}", context.call_depth());
        }

        let err = match method.execute(vm, context) {
            Ok(()) => return Ok(InvokeOutcome::Completed),
            Err(err) => err,
        };

        if let Some(condition) = err.emulation() {
            if let Some(exception_class) = condition.exception_class() {
                debug!("{signature} threw {exception_class}: {condition}");
                return Ok(InvokeOutcome::Threw {
                    exception_class,
                    condition: condition.clone(),
                });
            }
        }

        debug!("{signature} failed: {err}");
        Err(err)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered signatures, in no particular order.
    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for EmulatedMethods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut signatures: Vec<_> = self.signatures().collect();
        signatures.sort_unstable();
        f.debug_struct("EmulatedMethods")
            .field("methods", &signatures)
            .finish()
    }
}
