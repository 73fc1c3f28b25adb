//! Instance state of emulated objects.

use std::collections::HashMap;

use crate::{
    emulation::Value,
    metadata::{FieldId, TypeDescriptor},
};

/// Field state of one object.
///
/// Only fields the analysis has determined are stored; a missing entry means the field's
/// current value is unknown. A freshly created `Instance` therefore models a symbolic object of
/// a known class whose state is entirely unknown.
#[derive(Clone, Debug)]
pub struct Instance {
    class: TypeDescriptor,
    fields: HashMap<FieldId, Value>,
}

impl Instance {
    /// Creates an object of `class` with unknown field state.
    #[must_use]
    pub fn new(class: TypeDescriptor) -> Self {
        Instance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Records a field value, returning the updated instance.
    #[must_use]
    pub fn with_field(mut self, field: FieldId, value: Value) -> Self {
        self.fields.insert(field, value);
        self
    }

    /// Records a field value.
    pub fn set_field(&mut self, field: FieldId, value: Value) {
        self.fields.insert(field, value);
    }

    /// The runtime class of the object.
    #[must_use]
    pub fn class(&self) -> &TypeDescriptor {
        &self.class
    }

    /// Current value of a field, or `None` if it is not tracked.
    #[must_use]
    pub fn field(&self, field: &FieldId) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Current value of a field, or an unknown value of the field's declared type.
    #[must_use]
    pub fn read_field(&self, field: &FieldId) -> Value {
        self.field(field)
            .cloned()
            .unwrap_or_else(|| Value::unknown(field.declared_type().clone()))
    }
}
