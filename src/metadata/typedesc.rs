//! Dalvik type descriptors.
//!
//! Every tracked value and every declared field carries a [`TypeDescriptor`]. Descriptors use the
//! textual Dalvik form found in smali and in dex type ids:
//!
//! | Descriptor | Meaning |
//! |------------|---------|
//! | `V` | void (return types only) |
//! | `Z` `B` `S` `C` `I` `J` `F` `D` | primitives |
//! | `Lpkg/Name;` | class or interface reference |
//! | `[T` | array of `T` |
//!
//! # Examples
//!
//! ```rust
//! use dexscope::metadata::{Primitive, TypeDescriptor};
//!
//! let int = TypeDescriptor::parse("I").unwrap();
//! assert_eq!(int, TypeDescriptor::Primitive(Primitive::Int));
//!
//! let object = TypeDescriptor::parse("Ljava/lang/Object;").unwrap();
//! assert!(object.is_reference());
//! assert_eq!(object.to_string(), "Ljava/lang/Object;");
//! ```

use std::{fmt, str::FromStr};

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::emulation::EmulationError;

/// Descriptor of `java.lang.Object`, the generic result type of reflective calls.
pub const OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";

/// Descriptor of `java.lang.String`.
pub const STRING_DESCRIPTOR: &str = "Ljava/lang/String;";

/// Descriptor of `java.lang.reflect.Field`.
pub const FIELD_DESCRIPTOR: &str = "Ljava/lang/reflect/Field;";

/// The eight Dalvik primitive types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum Primitive {
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `S`
    Short,
    /// `C`
    Char,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`
    Double,
}

impl Primitive {
    /// Returns the single-character descriptor of this primitive.
    #[must_use]
    pub fn descriptor(self) -> char {
        match self {
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Short => 'S',
            Primitive::Char => 'C',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
        }
    }

    /// Looks up a primitive by its descriptor character.
    #[must_use]
    pub fn from_descriptor(c: char) -> Option<Self> {
        Primitive::iter().find(|p| p.descriptor() == c)
    }

    /// Returns `true` for `long` and `double`, which occupy a register pair.
    #[must_use]
    pub fn is_wide(self) -> bool {
        matches!(self, Primitive::Long | Primitive::Double)
    }
}

/// A parsed Dalvik type descriptor.
///
/// Class descriptors keep their full textual form (`Lpkg/Name;`), which is also the class name
/// used by the [`ClassRegistry`](crate::metadata::ClassRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDescriptor {
    /// `V`
    Void,
    /// A primitive type.
    Primitive(Primitive),
    /// A class or interface, stored as its full descriptor.
    Class(String),
    /// An array with the given component type.
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Parses a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::InvalidDescriptor`] if `descriptor` is empty, has trailing
    /// characters, or names an unterminated class.
    pub fn parse(descriptor: &str) -> Result<Self, EmulationError> {
        let (parsed, rest) = Self::parse_prefix(descriptor)?;
        if !rest.is_empty() {
            return Err(EmulationError::InvalidDescriptor {
                descriptor: descriptor.to_string(),
            });
        }
        Ok(parsed)
    }

    fn parse_prefix(text: &str) -> Result<(Self, &str), EmulationError> {
        let invalid = || EmulationError::InvalidDescriptor {
            descriptor: text.to_string(),
        };

        let mut chars = text.chars();
        let first = chars.next().ok_or_else(invalid)?;
        match first {
            'V' => Ok((TypeDescriptor::Void, &text[1..])),
            'L' => {
                let end = text.find(';').ok_or_else(invalid)?;
                if end < 2 {
                    return Err(invalid());
                }
                Ok((TypeDescriptor::Class(text[..=end].to_string()), &text[end + 1..]))
            }
            '[' => {
                let (component, rest) = Self::parse_prefix(&text[1..])?;
                if component == TypeDescriptor::Void {
                    return Err(invalid());
                }
                Ok((TypeDescriptor::Array(Box::new(component)), rest))
            }
            c => Primitive::from_descriptor(c)
                .map(|p| (TypeDescriptor::Primitive(p), &text[1..]))
                .ok_or_else(invalid),
        }
    }

    /// Creates a class descriptor from a full `Lpkg/Name;` string without validation.
    #[must_use]
    pub fn class(descriptor: impl Into<String>) -> Self {
        TypeDescriptor::Class(descriptor.into())
    }

    /// `Ljava/lang/Object;`
    #[must_use]
    pub fn object() -> Self {
        TypeDescriptor::Class(OBJECT_DESCRIPTOR.to_string())
    }

    /// `Ljava/lang/String;`
    #[must_use]
    pub fn string() -> Self {
        TypeDescriptor::Class(STRING_DESCRIPTOR.to_string())
    }

    /// `Ljava/lang/reflect/Field;`
    #[must_use]
    pub fn field() -> Self {
        TypeDescriptor::Class(FIELD_DESCRIPTOR.to_string())
    }

    /// `I`
    #[must_use]
    pub fn int() -> Self {
        TypeDescriptor::Primitive(Primitive::Int)
    }

    /// Returns the primitive kind, if this is a primitive descriptor.
    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            TypeDescriptor::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns `true` for primitive descriptors.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(_))
    }

    /// Returns `true` for class and array descriptors.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDescriptor::Class(_) | TypeDescriptor::Array(_))
    }

    /// Returns `true` if values of this type occupy two registers.
    #[must_use]
    pub fn is_wide(&self) -> bool {
        self.as_primitive().is_some_and(Primitive::is_wide)
    }

    /// Returns `true` for `Ljava/lang/Object;`.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, TypeDescriptor::Class(name) if name == OBJECT_DESCRIPTOR)
    }

    /// Number of registers a value of this type occupies.
    #[must_use]
    pub fn register_width(&self) -> usize {
        if self.is_wide() {
            2
        } else {
            1
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = EmulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeDescriptor::parse(s)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "V"),
            TypeDescriptor::Primitive(p) => write!(f, "{}", p.descriptor()),
            TypeDescriptor::Class(name) => write!(f, "{name}"),
            TypeDescriptor::Array(component) => write!(f, "[{component}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        for p in Primitive::iter() {
            let text = p.descriptor().to_string();
            assert_eq!(TypeDescriptor::parse(&text).unwrap(), TypeDescriptor::Primitive(p));
        }
        assert_eq!(Primitive::COUNT, 8);
    }

    #[test]
    fn test_parse_class_and_array() {
        let arr = TypeDescriptor::parse("[[Ljava/lang/String;").unwrap();
        match &arr {
            TypeDescriptor::Array(inner) => match inner.as_ref() {
                TypeDescriptor::Array(leaf) => assert_eq!(**leaf, TypeDescriptor::string()),
                other => panic!("unexpected component {other:?}"),
            },
            other => panic!("unexpected descriptor {other:?}"),
        }
        assert_eq!(arr.to_string(), "[[Ljava/lang/String;");
        assert!(arr.is_reference());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "Ljava/lang/Object", "L;", "Q", "II", "[V", "[", "Lfoo;I"] {
            assert!(
                matches!(
                    TypeDescriptor::parse(bad),
                    Err(EmulationError::InvalidDescriptor { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_wide_types() {
        assert!(TypeDescriptor::parse("J").unwrap().is_wide());
        assert!(TypeDescriptor::parse("D").unwrap().is_wide());
        assert!(!TypeDescriptor::int().is_wide());
        assert_eq!(TypeDescriptor::parse("D").unwrap().register_width(), 2);
        assert_eq!(TypeDescriptor::object().register_width(), 1);
    }

    #[test]
    fn test_object_detection() {
        assert!(TypeDescriptor::object().is_object());
        assert!(!TypeDescriptor::string().is_object());
    }
}
