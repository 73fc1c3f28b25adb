//! Platform-reflection fallback for non-local classes.
//!
//! Fields of classes whose bytecode is not part of the artifact are known only through the
//! platform: a host reflection backend, a pre-extracted framework snapshot, or a hand-written
//! table. [`PlatformReflection`] is the boundary to whichever of those is available; the
//! handlers consume it and never reimplement it.

use std::collections::HashMap;

use crate::{
    emulation::Value,
    metadata::{FieldDescriptor, FieldId, TypeDescriptor},
};

/// Source of metadata and values for fields of non-local classes.
pub trait PlatformReflection: Send + Sync {
    /// Describes the field an opaque handle refers to, or `None` if it is unknown.
    fn describe(&self, field: &FieldId) -> Option<FieldDescriptor>;

    /// Current value of a static field, or `None` if it cannot be determined.
    fn static_value(&self, field: &FieldDescriptor) -> Option<Value>;

    /// Value of an instance field of a concrete instance, or `None` if it cannot be determined.
    fn instance_value(&self, field: &FieldDescriptor, instance: &Value) -> Option<Value>;

    /// Direct super class of a non-local class, or `None` if it is unknown.
    ///
    /// Followed once a type hierarchy walk leaves the local classes.
    fn super_class(&self, _class: &TypeDescriptor) -> Option<TypeDescriptor> {
        None
    }
}

/// Fallback that knows nothing. Every opaque handle fails with `NoSuchField`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableReflection;

impl PlatformReflection for UnavailableReflection {
    fn describe(&self, _field: &FieldId) -> Option<FieldDescriptor> {
        None
    }

    fn static_value(&self, _field: &FieldDescriptor) -> Option<Value> {
        None
    }

    fn instance_value(&self, _field: &FieldDescriptor, _instance: &Value) -> Option<Value> {
        None
    }
}

/// Table-driven fallback, for framework fields with well-known values.
///
/// # Examples
///
/// ```rust
/// use dexscope::emulation::{PlatformReflection, ReflectionTable, Value};
/// use dexscope::metadata::{AccessFlags, FieldDescriptor, FieldId};
///
/// let max = FieldId::parse("Ljava/lang/Integer;->MAX_VALUE:I")?;
/// let table = ReflectionTable::new().with_static_field(
///     FieldDescriptor::new(
///         max.clone(),
///         AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
///     ),
///     Value::int(i32::MAX),
/// );
///
/// let field = table.describe(&max).unwrap();
/// assert_eq!(table.static_value(&field), Some(Value::int(i32::MAX)));
/// # Ok::<(), dexscope::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReflectionTable {
    fields: HashMap<FieldId, FieldDescriptor>,
    values: HashMap<FieldId, Value>,
    supers: HashMap<TypeDescriptor, TypeDescriptor>,
}

impl ReflectionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field whose value is not known.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.id().clone(), field);
        self
    }

    /// Declares a static field with its value.
    #[must_use]
    pub fn with_static_field(mut self, field: FieldDescriptor, value: Value) -> Self {
        self.values.insert(field.id().clone(), value);
        self.with_field(field)
    }

    /// Declares an instance field that holds `value` on every instance.
    #[must_use]
    pub fn with_instance_field(mut self, field: FieldDescriptor, value: Value) -> Self {
        self.values.insert(field.id().clone(), value);
        self.with_field(field)
    }

    /// Records the super class of a non-local class.
    #[must_use]
    pub fn with_super_class(mut self, class: TypeDescriptor, parent: TypeDescriptor) -> Self {
        self.supers.insert(class, parent);
        self
    }
}

impl PlatformReflection for ReflectionTable {
    fn describe(&self, field: &FieldId) -> Option<FieldDescriptor> {
        self.fields.get(field).cloned()
    }

    fn static_value(&self, field: &FieldDescriptor) -> Option<Value> {
        if !field.is_static() {
            return None;
        }
        self.values.get(field.id()).cloned()
    }

    fn instance_value(&self, field: &FieldDescriptor, instance: &Value) -> Option<Value> {
        if field.is_static() || instance.is_unknown() {
            return None;
        }
        self.values.get(field.id()).cloned()
    }

    fn super_class(&self, class: &TypeDescriptor) -> Option<TypeDescriptor> {
        self.supers.get(class).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AccessFlags;

    #[test]
    fn test_table_values_by_storage_class() {
        let s = FieldDescriptor::new(
            FieldId::parse("LX;->s:I").unwrap(),
            AccessFlags::PUBLIC | AccessFlags::STATIC,
        );
        let i = FieldDescriptor::new(FieldId::parse("LX;->i:I").unwrap(), AccessFlags::PUBLIC);
        let table = ReflectionTable::new()
            .with_static_field(s.clone(), Value::int(1))
            .with_instance_field(i.clone(), Value::int(2));

        assert_eq!(table.static_value(&s), Some(Value::int(1)));
        assert_eq!(table.static_value(&i), None);
        assert_eq!(table.instance_value(&i, &Value::string("x")), Some(Value::int(2)));
        assert_eq!(
            table.instance_value(&i, &Value::unknown(TypeDescriptor::class("LX;"))),
            None
        );
    }

    #[test]
    fn test_super_class() {
        let table = ReflectionTable::new()
            .with_super_class(TypeDescriptor::class("LA;"), TypeDescriptor::class("LB;"));

        assert_eq!(
            table.super_class(&TypeDescriptor::class("LA;")),
            Some(TypeDescriptor::class("LB;"))
        );
        assert_eq!(table.super_class(&TypeDescriptor::class("LB;")), None);
        assert_eq!(
            UnavailableReflection.super_class(&TypeDescriptor::class("LA;")),
            None
        );
    }

    #[test]
    fn test_unavailable() {
        assert!(UnavailableReflection
            .describe(&FieldId::parse("LX;->s:I").unwrap())
            .is_none());
    }
}
