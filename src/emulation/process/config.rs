//! Virtual machine configuration types.
//!
//! - [`VmConfig`] - Top-level configuration container
//! - [`InitOrder`] - Ordering of static initialization and access checks for reflective reads
//! - [`TracingConfig`] - High-volume logging switches
//!
//! # Configuration Presets
//!
//! - [`VmConfig::analysis()`] - Defaults, for deobfuscation and constant propagation
//! - [`VmConfig::strict_jdk()`] - JDK reflection ordering (access check before initialization)
//! - [`VmConfig::minimal()`] - Shallow call depth, tracing off
//!
//! # Example
//!
//! ```rust
//! use dexscope::emulation::{InitOrder, VmConfig};
//!
//! let config = VmConfig::analysis()
//!     .with_max_call_depth(16)
//!     .with_init_order(InitOrder::AccessCheckFirst);
//! assert_eq!(config.max_call_depth, 16);
//! ```

/// Configuration of a [`VirtualMachine`](crate::emulation::VirtualMachine).
///
/// # Default Configuration
///
/// - 50 call depth limit
/// - [`InitOrder::InitializeFirst`]
/// - Dispatch tracing on, register tracing off
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum depth of a call lineage.
    ///
    /// [`ExecutionContext::spawn_child`](crate::emulation::ExecutionContext::spawn_child) fails
    /// with `CallDepthExceeded` beyond this depth.
    pub max_call_depth: usize,

    /// Whether a static reflective read initializes the defining class before or after the
    /// visibility check.
    pub init_order: InitOrder,

    /// Logging switches for high-volume events.
    pub tracing: TracingConfig,
}

/// Ordering of the static-initialization side effect relative to the access check of a
/// reflective static field read.
///
/// Initialization is idempotent per lineage under both orders; the order only decides whether a
/// read that fails with `AccessDenied` has already initialized the defining class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitOrder {
    /// Initialize the defining class, then check access.
    ///
    /// This is what the Android runtime does: the declaring class is made initialized before the
    /// reflective accessor verifies the caller's access.
    #[default]
    InitializeFirst,

    /// Check access, then initialize the defining class.
    ///
    /// The JDK ordering: an inaccessible field never triggers initialization.
    AccessCheckFirst,
}

/// Logging switches.
///
/// Both only gate `trace!`-level events; `debug!` events (initialization, dispatch failures,
/// lineage changes) are always emitted and filtered by the installed logger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log parameter peeks and return register writes.
    ///
    /// One event per register access. High overhead.
    pub trace_registers: bool,

    /// Log every emulated-method invocation with its signature.
    pub trace_dispatch: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 50,
            init_order: InitOrder::default(),
            tracing: TracingConfig::default(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            trace_registers: false,
            trace_dispatch: true,
        }
    }
}

impl TracingConfig {
    /// Enables every trace category.
    #[must_use]
    pub fn all() -> Self {
        Self {
            trace_registers: true,
            trace_dispatch: true,
        }
    }

    /// Disables every trace category.
    #[must_use]
    pub fn off() -> Self {
        Self {
            trace_registers: false,
            trace_dispatch: false,
        }
    }

    /// Returns `true` if any category is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.trace_registers || self.trace_dispatch
    }
}

impl VmConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for deobfuscation and constant propagation.
    ///
    /// Equal to the defaults.
    #[must_use]
    pub fn analysis() -> Self {
        Self::default()
    }

    /// Configuration reproducing JDK reflection ordering.
    ///
    /// # Settings
    ///
    /// - **Init order**: [`InitOrder::AccessCheckFirst`]
    /// - Everything else default
    #[must_use]
    pub fn strict_jdk() -> Self {
        Self {
            init_order: InitOrder::AccessCheckFirst,
            ..Default::default()
        }
    }

    /// Lightweight configuration for evaluating short sequences.
    ///
    /// # Settings
    ///
    /// - **Call depth**: 8 (shallow)
    /// - **Tracing**: off
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            max_call_depth: 8,
            tracing: TracingConfig::off(),
            ..Default::default()
        }
    }

    /// Sets the maximum call lineage depth.
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum nested calls
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_max_call_depth(mut self, max: usize) -> Self {
        self.max_call_depth = max;
        self
    }

    /// Sets the initialization/access-check ordering.
    #[must_use]
    pub fn with_init_order(mut self, order: InitOrder) -> Self {
        self.init_order = order;
        self
    }

    /// Replaces the tracing configuration.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VmConfig::default();
        assert_eq!(config.max_call_depth, 50);
        assert_eq!(config.init_order, InitOrder::InitializeFirst);
        assert!(config.tracing.trace_dispatch);
        assert!(!config.tracing.trace_registers);
    }

    #[test]
    fn test_presets() {
        assert_eq!(VmConfig::analysis(), VmConfig::default());
        assert_eq!(VmConfig::strict_jdk().init_order, InitOrder::AccessCheckFirst);

        let minimal = VmConfig::minimal();
        assert_eq!(minimal.max_call_depth, 8);
        assert!(!minimal.tracing.is_enabled());
    }

    #[test]
    fn test_builder() {
        let config = VmConfig::new()
            .with_max_call_depth(3)
            .with_init_order(InitOrder::AccessCheckFirst)
            .with_tracing(TracingConfig::all());

        assert_eq!(config.max_call_depth, 3);
        assert_eq!(config.init_order, InitOrder::AccessCheckFirst);
        assert!(config.tracing.trace_registers);
    }
}
