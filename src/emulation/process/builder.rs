//! Fluent construction of a [`VirtualMachine`].

use std::sync::Arc;

use crate::{
    emulation::{
        process::VirtualMachine, reflect, ClassInitializer, EmulatedMethod, EmulatedMethods,
        PlatformReflection, StaticFieldStore, UnavailableReflection, VmConfig,
    },
    metadata::ClassRegistry,
};

/// Builder for [`VirtualMachine`].
///
/// # Defaults
///
/// - [`VmConfig::default()`]
/// - No class initializer: static fields hold their declared initial values or defaults
/// - [`UnavailableReflection`]: opaque field handles resolve to nothing
/// - The `java.lang.reflect.Field` handlers are registered
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use dexscope::emulation::{ReflectionTable, VirtualMachine, VmConfig};
/// use dexscope::metadata::ClassRegistry;
///
/// let vm = VirtualMachine::builder(Arc::new(ClassRegistry::new()))
///     .config(VmConfig::strict_jdk())
///     .reflection(Arc::new(ReflectionTable::new()))
///     .build();
/// assert_eq!(vm.emulated_methods().len(), 3);
/// ```
pub struct VmBuilder {
    config: VmConfig,
    registry: Arc<ClassRegistry>,
    initializer: Option<Arc<dyn ClassInitializer>>,
    reflection: Arc<dyn PlatformReflection>,
    methods: Vec<Arc<dyn EmulatedMethod>>,
    default_methods: bool,
}

impl VmBuilder {
    /// Creates a builder over `registry` with default settings.
    #[must_use]
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        VmBuilder {
            config: VmConfig::default(),
            registry,
            initializer: None,
            reflection: Arc::new(UnavailableReflection),
            methods: Vec::new(),
            default_methods: true,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the runner for `<clinit>` bodies.
    #[must_use]
    pub fn initializer(mut self, initializer: Arc<dyn ClassInitializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Sets the fallback for fields of non-local classes.
    #[must_use]
    pub fn reflection(mut self, reflection: Arc<dyn PlatformReflection>) -> Self {
        self.reflection = reflection;
        self
    }

    /// Adds an emulated method. Replaces a built-in handler with the same signature.
    #[must_use]
    pub fn emulated_method(mut self, method: Arc<dyn EmulatedMethod>) -> Self {
        self.methods.push(method);
        self
    }

    /// Skips registration of the built-in `java.lang.reflect.Field` handlers.
    #[must_use]
    pub fn without_default_methods(mut self) -> Self {
        self.default_methods = false;
        self
    }

    /// Builds the virtual machine.
    #[must_use]
    pub fn build(self) -> VirtualMachine {
        let mut methods = EmulatedMethods::new();
        if self.default_methods {
            reflect::register(&mut methods);
        }
        for method in self.methods {
            methods.register(method);
        }

        let mut statics = StaticFieldStore::new(Arc::clone(&self.registry));
        if let Some(initializer) = self.initializer {
            statics = statics.with_initializer(initializer);
        }

        VirtualMachine {
            config: self.config,
            registry: self.registry,
            statics,
            reflection: self.reflection,
            methods,
        }
    }
}
