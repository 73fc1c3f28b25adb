//! Execution context of one method invocation.
//!
//! The [`ExecutionContext`] owns the active [`RegisterFile`], the call lineage leading to it and
//! the lineage-owned static state: the set of classes whose static initialization already ran
//! and the current values of their static fields.
//!
//! # Lineages
//!
//! A lineage is one hypothetical program run. All contexts created with
//! [`spawn_child`](ExecutionContext::spawn_child) share the caller's static state, so a class
//! initialized by a callee stays initialized for the caller, whether or not the callee is ever
//! joined. [`join_child`](ExecutionContext::join_child) only hands the callee's result to the
//! caller.
//!
//! [`fork`](ExecutionContext::fork) starts a new lineage from the current point: the fork gets
//! an independent copy of the static state. Initializations performed on one branch are never
//! visible on the other.
//!
//! ```text
//!   root ──spawn──▶ child ──join──▶ root'        (one lineage, state shared)
//!     │
//!     └──fork──▶ root (copy) ...                  (independent lineage)
//! ```

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use log::debug;

use crate::{
    emulation::{EmulationError, RegisterFile, Value, VmConfig},
    metadata::{FieldId, TypeDescriptor},
    Result,
};

/// Static state owned by one lineage. Grows monotonically.
#[derive(Clone, Debug, Default)]
struct LineageState {
    initialized_classes: DashSet<TypeDescriptor>,
    static_values: DashMap<FieldId, Value>,
}

/// State of one method invocation within a lineage.
///
/// # Example
///
/// ```rust
/// use dexscope::emulation::{ExecutionContext, RegisterFile, Value};
///
/// let mut root = ExecutionContext::new(RegisterFile::default());
///
/// let mut callee = root.spawn_child(
///     "Lcom/example/A;->f()I",
///     RegisterFile::default(),
/// )?;
/// assert_eq!(callee.call_depth(), 1);
/// callee.registers_mut().assign_return_register(Value::int(3));
///
/// root.join_child(callee);
/// assert_eq!(root.registers_mut().take_invoke_result(), Some(Value::int(3)));
/// assert!(root.registers().read_return_register().is_none());
/// # Ok::<(), dexscope::Error>(())
/// ```
#[derive(Debug)]
pub struct ExecutionContext {
    registers: RegisterFile,
    /// Method signatures of the frames above the root, outermost first.
    lineage: Vec<String>,
    state: Arc<LineageState>,
    max_call_depth: usize,
    trace_registers: bool,
}

impl ExecutionContext {
    /// Creates the root context of a new lineage with the default configuration.
    #[must_use]
    pub fn new(registers: RegisterFile) -> Self {
        Self::with_config(registers, &VmConfig::default())
    }

    /// Creates the root context of a new lineage.
    #[must_use]
    pub fn with_config(mut registers: RegisterFile, config: &VmConfig) -> Self {
        registers.set_tracing(config.tracing.trace_registers);
        ExecutionContext {
            registers,
            lineage: Vec::new(),
            state: Arc::default(),
            max_call_depth: config.max_call_depth,
            trace_registers: config.tracing.trace_registers,
        }
    }

    /// The active register file.
    #[must_use]
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// The active register file, mutably.
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Number of calls between the lineage root and this context.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.lineage.len()
    }

    /// Method signatures of the calls leading to this context, outermost first.
    #[must_use]
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Returns `true` if `class` was initialized in this lineage.
    #[must_use]
    pub fn is_class_initialized(&self, class: &TypeDescriptor) -> bool {
        self.state.initialized_classes.contains(class)
    }

    /// Classes initialized in this lineage, in descriptor order.
    #[must_use]
    pub fn initialized_classes(&self) -> Vec<TypeDescriptor> {
        let mut classes: Vec<_> = self
            .state
            .initialized_classes
            .iter()
            .map(|class| class.key().clone())
            .collect();
        classes.sort();
        classes
    }

    /// Records `class` as initialized. Returns `false` if it already was.
    pub(crate) fn mark_class_initialized(&mut self, class: &TypeDescriptor) -> bool {
        self.state.initialized_classes.insert(class.clone())
    }

    /// Current value of a static field in this lineage, if it was ever stored.
    pub(crate) fn static_value(&self, field: &FieldId) -> Option<Value> {
        self.state
            .static_values
            .get(field)
            .map(|entry| entry.value().clone())
    }

    pub(crate) fn set_static_value(&mut self, field: FieldId, value: Value) {
        self.state.static_values.insert(field, value);
    }

    /// Creates the context of a call made from this one.
    ///
    /// The child shares this context's static state. Initializations it performs are visible
    /// here immediately and survive the child being dropped without a join.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::CallDepthExceeded`] if the child would be deeper than the
    /// configured maximum.
    pub fn spawn_child(
        &mut self,
        method: impl Into<String>,
        mut registers: RegisterFile,
    ) -> Result<ExecutionContext> {
        let depth = self.lineage.len() + 1;
        if depth > self.max_call_depth {
            return Err(EmulationError::CallDepthExceeded {
                depth,
                limit: self.max_call_depth,
            }
            .into());
        }

        let method = method.into();
        debug!("spawn {method} at depth {depth}");

        let mut lineage = self.lineage.clone();
        lineage.push(method);
        registers.set_tracing(self.trace_registers);

        Ok(ExecutionContext {
            registers,
            lineage,
            state: Arc::clone(&self.state),
            max_call_depth: self.max_call_depth,
            trace_registers: self.trace_registers,
        })
    }

    /// Returns from a child context.
    ///
    /// The child's result, if it assigned one, becomes this context's invoke result (what
    /// `move-result` reads). This context's own return register is untouched.
    pub fn join_child(&mut self, mut child: ExecutionContext) {
        debug!(
            "join {} at depth {}",
            child.lineage.last().map_or("<root>", String::as_str),
            child.call_depth()
        );

        match child.registers.take_return_register() {
            Some(result) => self.registers.assign_invoke_result(result),
            None => self.registers.clear_invoke_result(),
        }
    }

    /// Starts an independent hypothetical path from the current point.
    ///
    /// The fork gets its own copy of the registers and static state. Nothing done on either
    /// side is visible on the other.
    #[must_use]
    pub fn fork(&self) -> ExecutionContext {
        debug!(
            "fork at depth {} with {} initialized classes",
            self.call_depth(),
            self.state.initialized_classes.len()
        );
        ExecutionContext {
            registers: self.registers.clone(),
            lineage: self.lineage.clone(),
            state: Arc::new(LineageState::clone(&self.state)),
            max_call_depth: self.max_call_depth,
            trace_registers: self.trace_registers,
        }
    }
}
