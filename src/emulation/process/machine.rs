//! Virtual machine - the handle emulated methods run against.
//!
//! A [`VirtualMachine`] bundles everything that is built once per analyzed artifact and shared
//! read-only afterwards:
//!
//! - The [`ClassRegistry`] of local classes
//! - The [`StaticFieldStore`] (with the optional class initializer)
//! - The [`PlatformReflection`] fallback for non-local classes
//! - The [`EmulatedMethods`] registry
//! - The [`VmConfig`]
//!
//! Everything that changes during execution lives on [`ExecutionContext`]s, one per explored
//! path. A `VirtualMachine` is `Send + Sync`, so independent paths can run concurrently against
//! the same machine.
//!
//! # Creating a Virtual Machine
//!
//! Use [`VmBuilder`](super::VmBuilder), via [`VirtualMachine::builder`]:
//!
//! ```rust
//! use std::sync::Arc;
//! use dexscope::emulation::{reflect, VirtualMachine, VmConfig};
//! use dexscope::metadata::ClassRegistry;
//!
//! let vm = VirtualMachine::builder(Arc::new(ClassRegistry::new()))
//!     .config(VmConfig::minimal())
//!     .build();
//! assert!(vm.emulated_methods().can_emulate(reflect::FIELD_GET));
//! ```

use std::{collections::HashSet, sync::Arc};

use log::debug;
use rayon::prelude::*;

use crate::{
    emulation::{
        process::VmBuilder, EmulatedMethods, ExecutionContext, InvokeOutcome, PlatformReflection,
        RegisterFile, StaticFieldStore, VmConfig,
    },
    metadata::{ClassRegistry, TypeDescriptor},
    Result,
};

/// Shared, read-only state of an analysis.
pub struct VirtualMachine {
    pub(super) config: VmConfig,
    pub(super) registry: Arc<ClassRegistry>,
    pub(super) statics: StaticFieldStore,
    pub(super) reflection: Arc<dyn PlatformReflection>,
    pub(super) methods: EmulatedMethods,
}

impl VirtualMachine {
    /// Starts building a virtual machine over `registry`.
    #[must_use]
    pub fn builder(registry: Arc<ClassRegistry>) -> VmBuilder {
        VmBuilder::new(registry)
    }

    /// Returns the configuration.
    ///
    /// The configuration is immutable after the machine is built.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Returns the registry of local classes.
    #[must_use]
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Returns the static field store.
    #[must_use]
    pub fn statics(&self) -> &StaticFieldStore {
        &self.statics
    }

    /// Returns the fallback for fields of non-local classes.
    #[must_use]
    pub fn reflection(&self) -> &dyn PlatformReflection {
        self.reflection.as_ref()
    }

    /// Returns the emulated-method registry.
    #[must_use]
    pub fn emulated_methods(&self) -> &EmulatedMethods {
        &self.methods
    }

    /// Creates the root context of a new lineage, configured from this machine.
    #[must_use]
    pub fn new_context(&self, registers: RegisterFile) -> ExecutionContext {
        ExecutionContext::with_config(registers, &self.config)
    }

    /// Dispatches a call to the emulated method registered for `signature`.
    ///
    /// See [`EmulatedMethods::invoke`].
    ///
    /// # Errors
    ///
    /// Returns the handler's error if it is not a platform exception condition.
    pub fn invoke(&self, signature: &str, context: &mut ExecutionContext) -> Result<InvokeOutcome> {
        self.methods.invoke(self, signature, context)
    }

    /// Returns `true` if an instance of `class` can be used where `target` is expected.
    ///
    /// Walks one super-class chain across the artifact boundary: local classes through the
    /// registry, non-local ones through the reflection fallback. A chain the fallback cannot
    /// continue ends the walk.
    #[must_use]
    pub fn is_instance_of(&self, class: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        let mut seen = HashSet::new();
        let mut current = class.clone();
        loop {
            if target.is_object() || &current == target {
                return true;
            }
            let parent = match self.registry.class(&current) {
                Some(def) => def.super_class().cloned(),
                None => self.reflection.super_class(&current),
            };
            // A malformed cycle ends the walk.
            if !seen.insert(current) {
                return false;
            }
            match parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Evaluates independent execution paths in parallel.
    ///
    /// Each path owns its context exclusively; nothing done on one path is visible on another.
    /// Results are returned in the order of `contexts`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use dexscope::emulation::{RegisterFile, VirtualMachine};
    /// use dexscope::metadata::ClassRegistry;
    ///
    /// let vm = VirtualMachine::builder(Arc::new(ClassRegistry::new())).build();
    /// let root = vm.new_context(RegisterFile::default());
    ///
    /// let depths = vm.explore_paths(vec![root.fork(), root.fork()], |_, ctx| ctx.call_depth());
    /// assert_eq!(depths, vec![0, 0]);
    /// ```
    pub fn explore_paths<F, T>(&self, contexts: Vec<ExecutionContext>, f: F) -> Vec<T>
    where
        F: Fn(&VirtualMachine, ExecutionContext) -> T + Send + Sync,
        T: Send,
    {
        debug!("exploring {} paths", contexts.len());
        contexts
            .into_par_iter()
            .map(|context| f(self, context))
            .collect()
    }
}

impl std::fmt::Debug for VirtualMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMachine")
            .field("config", &self.config)
            .field("classes", &self.registry.len())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
