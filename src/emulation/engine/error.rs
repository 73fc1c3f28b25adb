//! Emulation error types.
//!
//! This module defines the conditions raised by the value model, the register file, the static
//! field store and emulated methods.
//!
//! Three of them ([`EmulationError::NoSuchField`], [`EmulationError::AccessDenied`] and
//! [`EmulationError::InvalidInstance`]) model exceptions the real platform call would throw. The
//! opcode loop turns those into an abrupt completion of the emulated call; everything else is an
//! analysis failure.

use std::fmt;

use crate::metadata::{FieldId, TypeDescriptor, Visibility};

/// Platform exception classes thrown by the calls this crate emulates.
///
/// | Descriptor | Raised for |
/// |------------|------------|
/// | `Ljava/lang/NoSuchFieldException;` | [`EmulationError::NoSuchField`] |
/// | `Ljava/lang/IllegalAccessException;` | [`EmulationError::AccessDenied`] |
/// | `Ljava/lang/NullPointerException;` | [`EmulationError::InvalidInstance`] with a null receiver |
/// | `Ljava/lang/IllegalArgumentException;` | [`EmulationError::InvalidInstance`] with an incompatible receiver |
pub mod platform_exception {
    /// `java.lang.NoSuchFieldException`
    pub const NO_SUCH_FIELD: &str = "Ljava/lang/NoSuchFieldException;";
    /// `java.lang.IllegalAccessException`
    pub const ILLEGAL_ACCESS: &str = "Ljava/lang/IllegalAccessException;";
    /// `java.lang.NullPointerException`
    pub const NULL_POINTER: &str = "Ljava/lang/NullPointerException;";
    /// `java.lang.IllegalArgumentException`
    pub const ILLEGAL_ARGUMENT: &str = "Ljava/lang/IllegalArgumentException;";
}

/// Why an instance was rejected for an instance field read.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidInstanceReason {
    /// The instance is `null`.
    Null,
    /// The instance's type is not compatible with the field's defining class.
    Incompatible {
        /// The instance's type.
        found: TypeDescriptor,
    },
}

/// Errors that can occur during emulation.
#[derive(Debug, Clone, PartialEq)]
pub enum EmulationError {
    /// A field handle matches no declared field and no fallback knows it.
    NoSuchField {
        /// The field that could not be resolved.
        field: FieldId,
    },
    /// A non-public field was read without an access override.
    AccessDenied {
        /// The field being read.
        field: FieldId,
        /// Its visibility.
        visibility: Visibility,
    },
    /// An instance field read was given a null or incompatible instance.
    InvalidInstance {
        /// The field being read.
        field: FieldId,
        /// What was wrong with the instance.
        reason: InvalidInstanceReason,
    },
    /// Parameter index outside the parameter window.
    ParameterOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of parameters.
        count: usize,
    },
    /// Register index outside the register file.
    RegisterOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of registers.
        count: usize,
    },
    /// A register was read before anything was written to it.
    UninitializedRegister {
        /// The register index.
        index: usize,
    },
    /// No static field with this identity exists on a local class.
    FieldNotFound {
        /// The missing field.
        field: FieldId,
    },
    /// Field enumeration was requested for a class that is not local.
    ClassNotLocal {
        /// The class.
        class: TypeDescriptor,
    },
    /// Two class definitions share a name.
    DuplicateClass {
        /// The duplicated class.
        class: TypeDescriptor,
    },
    /// A known payload is not assignable to its declared type.
    TypeMismatch {
        /// The declared type.
        expected: TypeDescriptor,
        /// The kind of payload supplied.
        found: &'static str,
    },
    /// Malformed type or field reference text.
    InvalidDescriptor {
        /// The offending text.
        descriptor: String,
    },
    /// An emulated method received a parameter of the wrong shape.
    UnexpectedParameter {
        /// Parameter index.
        index: usize,
        /// What the method expected.
        expected: &'static str,
        /// Declared type of what it got.
        found: TypeDescriptor,
    },
    /// Call lineage exceeded the configured depth.
    CallDepthExceeded {
        /// Depth that was requested.
        depth: usize,
        /// Maximum allowed depth.
        limit: usize,
    },
    /// An external class initializer reported failure.
    InitializerFailed {
        /// The class being initialized.
        class: TypeDescriptor,
        /// Reason reported by the initializer.
        reason: String,
    },
}

impl fmt::Display for EmulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulationError::NoSuchField { field } => write!(f, "no such field: {field}"),
            EmulationError::AccessDenied { field, visibility } => {
                write!(f, "illegal access to {visibility} field {field}")
            }
            EmulationError::InvalidInstance { field, reason } => match reason {
                InvalidInstanceReason::Null => {
                    write!(f, "null instance for instance field {field}")
                }
                InvalidInstanceReason::Incompatible { found } => {
                    write!(f, "instance of {found} is not compatible with field {field}")
                }
            },
            EmulationError::ParameterOutOfRange { index, count } => {
                write!(f, "parameter index {index} out of range (count: {count})")
            }
            EmulationError::RegisterOutOfRange { index, count } => {
                write!(f, "register index {index} out of range (count: {count})")
            }
            EmulationError::UninitializedRegister { index } => {
                write!(f, "register v{index} read before assignment")
            }
            EmulationError::FieldNotFound { field } => {
                write!(f, "static field not found: {field}")
            }
            EmulationError::ClassNotLocal { class } => write!(f, "class is not local: {class}"),
            EmulationError::DuplicateClass { class } => {
                write!(f, "duplicate class definition: {class}")
            }
            EmulationError::TypeMismatch { expected, found } => {
                write!(f, "{found} payload is not assignable to {expected}")
            }
            EmulationError::InvalidDescriptor { descriptor } => {
                write!(f, "invalid descriptor: {descriptor:?}")
            }
            EmulationError::UnexpectedParameter {
                index,
                expected,
                found,
            } => {
                write!(f, "parameter {index}: expected {expected}, found {found}")
            }
            EmulationError::CallDepthExceeded { depth, limit } => {
                write!(f, "call depth exceeded: {depth} (limit: {limit})")
            }
            EmulationError::InitializerFailed { class, reason } => {
                write!(f, "static initialization of {class} failed: {reason}")
            }
        }
    }
}

impl std::error::Error for EmulationError {}

impl EmulationError {
    /// Checks if this error models an exception thrown by the real platform call.
    ///
    /// Such errors describe the emulated program's behavior, not a limitation of the analysis.
    #[must_use]
    pub fn is_platform_exception(&self) -> bool {
        matches!(
            self,
            EmulationError::NoSuchField { .. }
                | EmulationError::AccessDenied { .. }
                | EmulationError::InvalidInstance { .. }
        )
    }

    /// Maps this error to the descriptor of the platform exception class it models.
    ///
    /// Returns `None` for errors that are not platform exceptions.
    #[must_use]
    pub fn exception_class(&self) -> Option<&'static str> {
        match self {
            EmulationError::NoSuchField { .. } => Some(platform_exception::NO_SUCH_FIELD),
            EmulationError::AccessDenied { .. } => Some(platform_exception::ILLEGAL_ACCESS),
            EmulationError::InvalidInstance {
                reason: InvalidInstanceReason::Null,
                ..
            } => Some(platform_exception::NULL_POINTER),
            EmulationError::InvalidInstance { .. } => Some(platform_exception::ILLEGAL_ARGUMENT),
            _ => None,
        }
    }
}
