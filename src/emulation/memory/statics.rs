//! Static field access for local classes.
//!
//! This module provides [`StaticFieldStore`] for the `sget`/`sput` family and for reflective
//! static reads. The store itself is built once per artifact and shared; the per-lineage
//! state (which classes are initialized, what their static fields currently hold) lives on the
//! [`ExecutionContext`].
//!
//! # Static Initialization
//!
//! The first access to a static field of a class within a lineage initializes that class:
//!
//! 1. A local super class is initialized first
//! 2. The class is recorded as initialized (re-entrant accesses from the initializer see it as
//!    initialized, as on the real runtime)
//! 3. Every static field is seeded with its declared initial value, or its type's default
//! 4. The [`ClassInitializer`], if any, runs the class's `<clinit>`
//!
//! Later accesses in the same lineage skip all of this.

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    emulation::{EmulationError, ExecutionContext, Value},
    metadata::{ClassRegistry, FieldDescriptor, FieldId, TypeDescriptor},
    Result,
};

/// Runs the static initializer (`<clinit>`) of a local class.
///
/// Implemented by the opcode loop, which can interpret the initializer body. Field writes the
/// initializer performs go through [`StaticFieldStore::put_field`].
pub trait ClassInitializer: Send + Sync {
    /// Runs the initializer of `class` in `context`'s lineage.
    ///
    /// # Errors
    ///
    /// Any error aborts the access that triggered initialization. The class stays recorded as
    /// initialized.
    fn initialize(
        &self,
        class: &TypeDescriptor,
        statics: &StaticFieldStore,
        context: &mut ExecutionContext,
    ) -> Result<()>;
}

/// Static field access for local classes.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use dexscope::emulation::{ExecutionContext, RegisterFile, StaticFieldStore, Value};
/// use dexscope::metadata::{AccessFlags, ClassDef, ClassRegistry, FieldId, TypeDescriptor};
///
/// let class = TypeDescriptor::class("LC;");
/// let registry = Arc::new(ClassRegistry::from_definitions(vec![
///     ClassDef::new(class.clone())
///         .static_field("F", TypeDescriptor::int(), AccessFlags::PUBLIC, Value::int(1)),
/// ])?);
/// let statics = StaticFieldStore::new(registry);
///
/// let mut context = ExecutionContext::new(RegisterFile::default());
/// let field = FieldId::parse("LC;->F:I")?;
/// assert_eq!(statics.get_field(&mut context, &field)?, Value::int(1));
/// assert!(context.is_class_initialized(&class));
/// # Ok::<(), dexscope::Error>(())
/// ```
pub struct StaticFieldStore {
    registry: Arc<ClassRegistry>,
    initializer: Option<Arc<dyn ClassInitializer>>,
}

impl StaticFieldStore {
    /// Creates a store over the given registry, without a class initializer.
    #[must_use]
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        StaticFieldStore {
            registry,
            initializer: None,
        }
    }

    /// Sets the runner for `<clinit>` bodies.
    #[must_use]
    pub fn with_initializer(mut self, initializer: Arc<dyn ClassInitializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// The class registry this store reads definitions from.
    #[must_use]
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Reads a static field of a local class, initializing the class first if needed.
    ///
    /// # Errors
    ///
    /// - [`EmulationError::FieldNotFound`] if no such static field is declared on a local class
    /// - [`EmulationError::InitializerFailed`] if initialization was triggered and failed
    pub fn get_field(&self, context: &mut ExecutionContext, field: &FieldId) -> Result<Value> {
        let descriptor = self.resolve(field)?;
        self.ensure_initialized(context, descriptor.defining_class())?;

        Ok(context
            .static_value(field)
            .unwrap_or_else(|| Value::default_for(field.declared_type())))
    }

    /// Writes a static field of a local class, initializing the class first if needed.
    ///
    /// # Errors
    ///
    /// - [`EmulationError::FieldNotFound`] if no such static field is declared on a local class
    /// - [`EmulationError::TypeMismatch`] if a known value is not assignable to the field
    /// - [`EmulationError::InitializerFailed`] if initialization was triggered and failed
    pub fn put_field(
        &self,
        context: &mut ExecutionContext,
        field: &FieldId,
        value: Value,
    ) -> Result<()> {
        let descriptor = self.resolve(field)?;
        if let Some(payload) = value.payload() {
            if !payload.is_assignable_to(field.declared_type()) {
                return Err(EmulationError::TypeMismatch {
                    expected: field.declared_type().clone(),
                    found: payload.kind(),
                }
                .into());
            }
        }

        self.ensure_initialized(context, descriptor.defining_class())?;
        context.set_static_value(field.clone(), value);
        Ok(())
    }

    /// Identities of the static fields declared by a local class, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::ClassNotLocal`] if `class` is not local.
    pub fn static_field_ids(&self, class: &TypeDescriptor) -> Result<Vec<FieldId>> {
        Ok(self
            .registry
            .get_fields(class)?
            .into_iter()
            .filter(FieldDescriptor::is_static)
            .map(|f| f.id().clone())
            .collect())
    }

    /// Initializes `class` in `context`'s lineage unless that already happened.
    ///
    /// Returns `true` if initialization ran. Non-local classes are left alone and yield `false`.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::InitializerFailed`] if the class initializer (or that of a
    /// super class) failed.
    pub fn ensure_initialized(
        &self,
        context: &mut ExecutionContext,
        class: &TypeDescriptor,
    ) -> Result<bool> {
        let Some(def) = self.registry.class(class) else {
            return Ok(false);
        };
        if !context.mark_class_initialized(class) {
            return Ok(false);
        }

        if let Some(parent) = def.super_class() {
            self.ensure_initialized(context, parent)?;
        }

        debug!("initializing {class} at depth {}", context.call_depth());
        for field in def.fields().iter().filter(|f| f.is_static()) {
            let value = def
                .static_value(field.id())
                .cloned()
                .unwrap_or_else(|| Value::default_for(field.declared_type()));
            context.set_static_value(field.id().clone(), value);
        }

        if let Some(initializer) = &self.initializer {
            if let Err(err) = initializer.initialize(class, self, context) {
                warn!("initializer of {class} failed: {err}");
                return Err(EmulationError::InitializerFailed {
                    class: class.clone(),
                    reason: err.to_string(),
                }
                .into());
            }
        }

        Ok(true)
    }

    fn resolve(&self, field: &FieldId) -> Result<FieldDescriptor> {
        self.registry
            .find_field(field)
            .filter(FieldDescriptor::is_static)
            .ok_or_else(|| {
                EmulationError::FieldNotFound {
                    field: field.clone(),
                }
                .into()
            })
    }
}

impl std::fmt::Debug for StaticFieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticFieldStore")
            .field("classes", &self.registry.len())
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}
