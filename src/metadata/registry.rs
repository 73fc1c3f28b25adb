//! Class registry for the analyzed artifact.
//!
//! The [`ClassRegistry`] holds every class whose bytecode body is part of the analyzed artifact
//! ("local" classes). Anything not in the registry is non-local: known only by name and
//! signature, and approximated through the platform-reflection fallback.
//!
//! # Loading
//!
//! The registry is built once, when the artifact is loaded, from a set of [`ClassDef`]s.
//! Definitions are inserted in parallel; afterwards the registry is read-only and can be shared
//! across concurrently explored execution paths behind an `Arc`.
//!
//! # Examples
//!
//! ```rust
//! use dexscope::metadata::{AccessFlags, ClassDef, ClassRegistry, TypeDescriptor};
//!
//! let class = TypeDescriptor::class("Lcom/example/Keys;");
//! let registry = ClassRegistry::from_definitions(vec![
//!     ClassDef::new(class.clone())
//!         .field("seed", TypeDescriptor::int(), AccessFlags::PRIVATE | AccessFlags::STATIC),
//! ])
//! .unwrap();
//!
//! assert!(registry.is_local_class(&class));
//! assert_eq!(registry.get_fields(&class).unwrap().len(), 1);
//! ```

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use rayon::prelude::*;

use crate::{
    emulation::{EmulationError, Value},
    metadata::{AccessFlags, FieldDescriptor, FieldId, TypeDescriptor},
};

/// Definition of a local class, as produced by the (external) dex loader.
#[derive(Clone, Debug)]
pub struct ClassDef {
    name: TypeDescriptor,
    super_class: Option<TypeDescriptor>,
    fields: Vec<FieldDescriptor>,
    static_values: HashMap<FieldId, Value>,
}

impl ClassDef {
    /// Creates an empty definition extending `Ljava/lang/Object;`.
    #[must_use]
    pub fn new(name: TypeDescriptor) -> Self {
        ClassDef {
            name,
            super_class: Some(TypeDescriptor::object()),
            fields: Vec::new(),
            static_values: HashMap::new(),
        }
    }

    /// Sets the super class. `None` is only meaningful for `Ljava/lang/Object;` itself.
    #[must_use]
    pub fn with_super(mut self, super_class: Option<TypeDescriptor>) -> Self {
        self.super_class = super_class;
        self
    }

    /// Declares a field. Declaration order is preserved.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        declared_type: TypeDescriptor,
        access_flags: AccessFlags,
    ) -> Self {
        let id = FieldId::new(self.name.clone(), name, declared_type);
        self.fields.push(FieldDescriptor::new(id, access_flags));
        self
    }

    /// Declares a static field with a declared initial value (the dex `static_values` entry).
    ///
    /// The `STATIC` bit is added to `access_flags` if missing.
    #[must_use]
    pub fn static_field(
        mut self,
        name: impl Into<String>,
        declared_type: TypeDescriptor,
        access_flags: AccessFlags,
        initial: Value,
    ) -> Self {
        let id = FieldId::new(self.name.clone(), name, declared_type);
        self.static_values.insert(id.clone(), initial);
        self.fields
            .push(FieldDescriptor::new(id, access_flags | AccessFlags::STATIC));
        self
    }

    /// The class descriptor.
    #[must_use]
    pub fn name(&self) -> &TypeDescriptor {
        &self.name
    }

    /// The super class, if any.
    #[must_use]
    pub fn super_class(&self) -> Option<&TypeDescriptor> {
        self.super_class.as_ref()
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Declared initial value of a static field, if the artifact provides one.
    #[must_use]
    pub fn static_value(&self, field: &FieldId) -> Option<&Value> {
        self.static_values.get(field)
    }
}

/// Registry of local classes, immutable after load.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: DashMap<TypeDescriptor, Arc<ClassDef>>,
}

impl ClassRegistry {
    /// Creates a registry with no local classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from the artifact's class definitions.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::DuplicateClass`] if two definitions share a name.
    pub fn from_definitions(definitions: Vec<ClassDef>) -> Result<Self, EmulationError> {
        let classes = DashMap::with_capacity(definitions.len());

        let duplicates: Vec<TypeDescriptor> = definitions
            .into_par_iter()
            .filter_map(|def| {
                let name = def.name.clone();
                classes.insert(name.clone(), Arc::new(def)).map(|_| name)
            })
            .collect();

        if let Some(class) = duplicates.into_iter().min() {
            return Err(EmulationError::DuplicateClass { class });
        }

        log::debug!("loaded {} local classes", classes.len());
        Ok(ClassRegistry { classes })
    }

    /// Returns `true` iff the class body is part of the analyzed artifact.
    #[must_use]
    pub fn is_local_class(&self, class: &TypeDescriptor) -> bool {
        self.classes.contains_key(class)
    }

    /// Returns the definition of a local class.
    #[must_use]
    pub fn class(&self, class: &TypeDescriptor) -> Option<Arc<ClassDef>> {
        self.classes.get(class).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns all declared fields of a local class, of any visibility, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::ClassNotLocal`] if `class` is not a local class.
    pub fn get_fields(&self, class: &TypeDescriptor) -> Result<Vec<FieldDescriptor>, EmulationError> {
        self.class(class)
            .map(|def| def.fields.clone())
            .ok_or_else(|| EmulationError::ClassNotLocal {
                class: class.clone(),
            })
    }

    /// Resolves a field identity against its defining class's declared fields.
    ///
    /// The first declared field matching name and type wins.
    #[must_use]
    pub fn find_field(&self, id: &FieldId) -> Option<FieldDescriptor> {
        let def = self.class(id.defining_class())?;
        def.fields.iter().find(|f| f.id() == id).cloned()
    }

    /// Returns `true` if an instance of `class` can be used where `target` is expected.
    ///
    /// Only local super-class chains are walked. A non-local class is compatible with itself
    /// and `Ljava/lang/Object;`.
    #[must_use]
    pub fn is_instance_of(&self, class: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        if target.is_object() || class == target {
            return true;
        }

        let mut current = class.clone();
        // Bounded by the number of local classes so a malformed cycle cannot loop forever.
        for _ in 0..=self.classes.len() {
            let Some(def) = self.class(&current) else {
                return false;
            };
            match &def.super_class {
                Some(parent) if parent == target => return true,
                Some(parent) => current = parent.clone(),
                None => return false,
            }
        }
        false
    }

    /// Number of local classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no class is local.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> TypeDescriptor {
        TypeDescriptor::class(name)
    }

    fn registry() -> ClassRegistry {
        ClassRegistry::from_definitions(vec![
            ClassDef::new(class("LBase;"))
                .field("a", TypeDescriptor::int(), AccessFlags::PUBLIC)
                .field("b", TypeDescriptor::string(), AccessFlags::PRIVATE)
                .static_field(
                    "c",
                    TypeDescriptor::int(),
                    AccessFlags::PUBLIC,
                    Value::int(7),
                ),
            ClassDef::new(class("LDerived;")).with_super(Some(class("LBase;"))),
        ])
        .unwrap()
    }

    #[test]
    fn test_local_classes() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_local_class(&class("LBase;")));
        assert!(!registry.is_local_class(&class("Ljava/lang/Integer;")));
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let fields = registry().get_fields(&class("LBase;")).unwrap();
        let names: Vec<&str> = fields.iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(fields[2].is_static());
    }

    #[test]
    fn test_fields_of_non_local_class() {
        let err = registry()
            .get_fields(&class("Ljava/lang/Integer;"))
            .unwrap_err();
        assert!(matches!(err, EmulationError::ClassNotLocal { .. }));
    }

    #[test]
    fn test_find_field_matches_type() {
        let registry = registry();
        let hit = FieldId::new(class("LBase;"), "a", TypeDescriptor::int());
        let wrong_type = FieldId::new(class("LBase;"), "a", TypeDescriptor::string());
        assert!(registry.find_field(&hit).is_some());
        assert!(registry.find_field(&wrong_type).is_none());
    }

    #[test]
    fn test_static_initial_value() {
        let registry = registry();
        let def = registry.class(&class("LBase;")).unwrap();
        let id = FieldId::new(class("LBase;"), "c", TypeDescriptor::int());
        assert_eq!(def.static_value(&id), Some(&Value::int(7)));
    }

    #[test]
    fn test_is_instance_of() {
        let registry = registry();
        assert!(registry.is_instance_of(&class("LDerived;"), &class("LBase;")));
        assert!(registry.is_instance_of(&class("LDerived;"), &TypeDescriptor::object()));
        assert!(!registry.is_instance_of(&class("LBase;"), &class("LDerived;")));
        assert!(registry.is_instance_of(&class("LOther;"), &class("LOther;")));
        assert!(!registry.is_instance_of(&class("LOther;"), &class("LBase;")));
    }

    #[test]
    fn test_duplicate_definitions_rejected() {
        let err = ClassRegistry::from_definitions(vec![
            ClassDef::new(class("LDup;")),
            ClassDef::new(class("LDup;")),
        ])
        .unwrap_err();
        assert_eq!(err, EmulationError::DuplicateClass { class: class("LDup;") });
    }
}
