//! Field identities and descriptors.
//!
//! A field is identified by the triple (defining class, name, declared type), written in smali
//! notation as `Lpkg/Owner;->name:Type`. [`FieldId`] is that identity; [`FieldDescriptor`] adds
//! the access flags loaded with the owning class.

use std::{fmt, str::FromStr};

use crate::{
    emulation::EmulationError,
    metadata::{AccessFlags, TypeDescriptor, Visibility},
};

/// Identity of a field: defining class, name and declared type.
///
/// # Examples
///
/// ```rust
/// use dexscope::metadata::FieldId;
///
/// let id: FieldId = "Lside_effects_test;->publicStaticField:I".parse().unwrap();
/// assert_eq!(id.name(), "publicStaticField");
/// assert_eq!(id.to_string(), "Lside_effects_test;->publicStaticField:I");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    defining_class: TypeDescriptor,
    name: String,
    declared_type: TypeDescriptor,
}

impl FieldId {
    /// Creates a field identity from its parts.
    #[must_use]
    pub fn new(
        defining_class: TypeDescriptor,
        name: impl Into<String>,
        declared_type: TypeDescriptor,
    ) -> Self {
        FieldId {
            defining_class,
            name: name.into(),
            declared_type,
        }
    }

    /// Parses `Lpkg/Owner;->name:Type`.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::InvalidDescriptor`] if the separator is missing, the name is
    /// empty, or either descriptor is malformed.
    pub fn parse(reference: &str) -> Result<Self, EmulationError> {
        let invalid = || EmulationError::InvalidDescriptor {
            descriptor: reference.to_string(),
        };

        let (class, member) = reference.split_once("->").ok_or_else(invalid)?;
        let (name, ty) = member.split_once(':').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }

        let defining_class = TypeDescriptor::parse(class).map_err(|_| invalid())?;
        if !defining_class.is_reference() {
            return Err(invalid());
        }
        let declared_type = TypeDescriptor::parse(ty).map_err(|_| invalid())?;

        Ok(FieldId::new(defining_class, name, declared_type))
    }

    /// The class that declares the field.
    #[must_use]
    pub fn defining_class(&self) -> &TypeDescriptor {
        &self.defining_class
    }

    /// The simple field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's declared type.
    #[must_use]
    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }
}

impl FromStr for FieldId {
    type Err = EmulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::parse(s)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}:{}",
            self.defining_class, self.name, self.declared_type
        )
    }
}

/// A declared field: identity plus access flags.
///
/// Immutable once the owning class is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    id: FieldId,
    access_flags: AccessFlags,
}

impl FieldDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: FieldId, access_flags: AccessFlags) -> Self {
        FieldDescriptor { id, access_flags }
    }

    /// The field's identity.
    #[must_use]
    pub fn id(&self) -> &FieldId {
        &self.id
    }

    /// The class that declares the field.
    #[must_use]
    pub fn defining_class(&self) -> &TypeDescriptor {
        self.id.defining_class()
    }

    /// The simple field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// The field's declared type.
    #[must_use]
    pub fn declared_type(&self) -> &TypeDescriptor {
        self.id.declared_type()
    }

    /// The raw access flags.
    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Visibility derived from the access flags.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.access_flags.visibility()
    }

    /// Returns `true` for static fields.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.is_static()
    }

    /// Returns `true` for public fields.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.access_flags.is_public()
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.visibility())
    }
}
