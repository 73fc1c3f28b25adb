//! Known/unknown value representation for register tracking.

use std::{fmt, sync::Arc};

use crate::{
    emulation::{runtime::FieldHandle, value::Instance, EmulationError},
    metadata::{Primitive, TypeDescriptor},
};

/// Concrete content of a [`Value`] the analysis was able to determine.
///
/// # Dalvik Type Mapping
///
/// | Dalvik type | Payload variant |
/// |-------------|-----------------|
/// | `Z` | [`Payload::Boolean`] |
/// | `B` | [`Payload::Byte`] |
/// | `S` | [`Payload::Short`] |
/// | `C` | [`Payload::Char`] (UTF-16 code unit) |
/// | `I` | [`Payload::Int`] |
/// | `J` | [`Payload::Long`] |
/// | `F` | [`Payload::Float`] |
/// | `D` | [`Payload::Double`] |
/// | any reference | [`Payload::Null`] |
/// | `Ljava/lang/String;` | [`Payload::String`] |
/// | class instance | [`Payload::Object`] |
/// | boxed result of a reflective call | [`Payload::Boxed`] |
/// | `Ljava/lang/reflect/Field;` | [`Payload::FieldHandle`] |
#[derive(Clone, Debug)]
pub enum Payload {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `char`
    Char(u16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// The `null` reference.
    ///
    /// Distinct from an unknown value: `null` is a determined value.
    Null,
    /// A string constant.
    String(Arc<str>),
    /// An object whose state is tracked by the instance-state model.
    Object(Arc<Instance>),
    /// A value wrapped as the generic `Ljava/lang/Object;` result of a reflective call.
    ///
    /// The inner value keeps the field's own declared type.
    Boxed(Box<Value>),
    /// A reflective field handle (`java.lang.reflect.Field`).
    FieldHandle(Arc<dyn FieldHandle>),
}

impl Payload {
    /// Short name of the payload kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Boolean(_) => "boolean",
            Payload::Byte(_) => "byte",
            Payload::Short(_) => "short",
            Payload::Char(_) => "char",
            Payload::Int(_) => "int",
            Payload::Long(_) => "long",
            Payload::Float(_) => "float",
            Payload::Double(_) => "double",
            Payload::Null => "null",
            Payload::String(_) => "string",
            Payload::Object(_) => "object",
            Payload::Boxed(_) => "boxed",
            Payload::FieldHandle(_) => "field handle",
        }
    }

    /// Returns `true` if this payload can be stored in a slot declared as `ty`.
    ///
    /// Primitives must match exactly. Reference payloads are checked against the kind of
    /// reference only; class hierarchy checks need the
    /// [`ClassRegistry`](crate::metadata::ClassRegistry) and are done by the consumer.
    #[must_use]
    pub fn is_assignable_to(&self, ty: &TypeDescriptor) -> bool {
        let primitive = |p: Primitive| ty.as_primitive() == Some(p);
        match self {
            Payload::Boolean(_) => primitive(Primitive::Boolean),
            Payload::Byte(_) => primitive(Primitive::Byte),
            Payload::Short(_) => primitive(Primitive::Short),
            Payload::Char(_) => primitive(Primitive::Char),
            Payload::Int(_) => primitive(Primitive::Int),
            Payload::Long(_) => primitive(Primitive::Long),
            Payload::Float(_) => primitive(Primitive::Float),
            Payload::Double(_) => primitive(Primitive::Double),
            Payload::Null => ty.is_reference(),
            Payload::String(_) => ty.is_object() || *ty == TypeDescriptor::string(),
            Payload::Object(_) | Payload::Boxed(_) => matches!(ty, TypeDescriptor::Class(_)),
            Payload::FieldHandle(_) => ty.is_object() || *ty == TypeDescriptor::field(),
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Boolean(a), Payload::Boolean(b)) => a == b,
            (Payload::Byte(a), Payload::Byte(b)) => a == b,
            (Payload::Short(a), Payload::Short(b)) => a == b,
            (Payload::Char(a), Payload::Char(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Long(a), Payload::Long(b)) => a == b,
            (Payload::Float(a), Payload::Float(b)) => a.to_bits() == b.to_bits(),
            (Payload::Double(a), Payload::Double(b)) => a.to_bits() == b.to_bits(),
            (Payload::Null, Payload::Null) => true,
            (Payload::String(a), Payload::String(b)) => a == b,
            // Objects and handles compare by identity, like references on the real heap.
            (Payload::Object(a), Payload::Object(b)) => Arc::ptr_eq(a, b),
            (Payload::FieldHandle(a), Payload::FieldHandle(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Payload::Boxed(a), Payload::Boxed(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Boolean(v) => write!(f, "{v}"),
            Payload::Byte(v) => write!(f, "{v}"),
            Payload::Short(v) => write!(f, "{v}"),
            Payload::Char(v) => write!(f, "'\\u{v:04x}'"),
            Payload::Int(v) => write!(f, "{v}"),
            Payload::Long(v) => write!(f, "{v}L"),
            Payload::Float(v) => write!(f, "{v}f"),
            Payload::Double(v) => write!(f, "{v}d"),
            Payload::Null => write!(f, "null"),
            Payload::String(v) => write!(f, "{v:?}"),
            Payload::Object(instance) => write!(f, "{}@instance", instance.class()),
            Payload::Boxed(inner) => write!(f, "box({inner})"),
            Payload::FieldHandle(handle) => write!(f, "field({})", handle.id()),
        }
    }
}

/// A tracked register value.
///
/// A value is either **known** (it carries a [`Payload`]) or **unknown** (the analysis could
/// not determine it). Both states always carry a declared type, so consumers keep static type
/// information even when the concrete value is lost. Unknown never means `null`: a determined
/// `null` is `Known(Null)`.
///
/// # Examples
///
/// ```rust
/// use dexscope::emulation::{Payload, Value};
/// use dexscope::metadata::TypeDescriptor;
///
/// let one = Value::int(1);
/// assert!(one.is_known());
/// assert_eq!(one.as_int(), Some(1));
///
/// let unknown = Value::unknown(TypeDescriptor::object());
/// assert!(unknown.is_unknown());
/// assert!(unknown.payload().is_none());
///
/// // Payloads must fit their declared type.
/// assert!(Value::known(Payload::Int(1), TypeDescriptor::string()).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    declared_type: TypeDescriptor,
    payload: Option<Payload>,
}

impl Value {
    /// Creates a known value.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::TypeMismatch`] if `payload` is not assignable to
    /// `declared_type`.
    pub fn known(payload: Payload, declared_type: TypeDescriptor) -> Result<Self, EmulationError> {
        if !payload.is_assignable_to(&declared_type) {
            return Err(EmulationError::TypeMismatch {
                expected: declared_type,
                found: payload.kind(),
            });
        }
        Ok(Value {
            declared_type,
            payload: Some(payload),
        })
    }

    /// Creates an unknown value of the given type.
    #[must_use]
    pub fn unknown(declared_type: TypeDescriptor) -> Self {
        Value {
            declared_type,
            payload: None,
        }
    }

    /// Known `int`.
    #[must_use]
    pub fn int(v: i32) -> Self {
        Self::primitive(Payload::Int(v), Primitive::Int)
    }

    /// Known `long`.
    #[must_use]
    pub fn long(v: i64) -> Self {
        Self::primitive(Payload::Long(v), Primitive::Long)
    }

    /// Known `boolean`.
    #[must_use]
    pub fn boolean(v: bool) -> Self {
        Self::primitive(Payload::Boolean(v), Primitive::Boolean)
    }

    /// Known `double`.
    #[must_use]
    pub fn double(v: f64) -> Self {
        Self::primitive(Payload::Double(v), Primitive::Double)
    }

    fn primitive(payload: Payload, primitive: Primitive) -> Self {
        Value {
            declared_type: TypeDescriptor::Primitive(primitive),
            payload: Some(payload),
        }
    }

    /// Known `null` of a reference type.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::TypeMismatch`] if `declared_type` is not a reference type.
    pub fn null(declared_type: TypeDescriptor) -> Result<Self, EmulationError> {
        Self::known(Payload::Null, declared_type)
    }

    /// Known string constant.
    #[must_use]
    pub fn string(v: &str) -> Self {
        Value {
            declared_type: TypeDescriptor::string(),
            payload: Some(Payload::String(Arc::from(v))),
        }
    }

    /// Known object reference, declared with the instance's own class.
    #[must_use]
    pub fn object(instance: Instance) -> Self {
        Value {
            declared_type: instance.class().clone(),
            payload: Some(Payload::Object(Arc::new(instance))),
        }
    }

    /// Known reflective field handle.
    #[must_use]
    pub fn field_handle(handle: Arc<dyn FieldHandle>) -> Self {
        Value {
            declared_type: TypeDescriptor::field(),
            payload: Some(Payload::FieldHandle(handle)),
        }
    }

    /// Wraps `inner` as the result of a reflective call whose signature returns
    /// `Ljava/lang/Object;`.
    ///
    /// A known inner value is boxed so its own declared type survives inside the payload. An
    /// unknown inner value becomes an unknown `Ljava/lang/Object;`.
    #[must_use]
    pub fn boxed(inner: Value) -> Self {
        if inner.is_unknown() {
            return Value::unknown(TypeDescriptor::object());
        }
        Value {
            declared_type: TypeDescriptor::object(),
            payload: Some(Payload::Boxed(Box::new(inner))),
        }
    }

    /// The zero value of a type: `0`, `false` or `null`.
    ///
    /// `V` has no value and yields an unknown `V`.
    #[must_use]
    pub fn default_for(declared_type: &TypeDescriptor) -> Self {
        let payload = match declared_type {
            TypeDescriptor::Void => return Value::unknown(TypeDescriptor::Void),
            TypeDescriptor::Class(_) | TypeDescriptor::Array(_) => Payload::Null,
            TypeDescriptor::Primitive(p) => match p {
                Primitive::Boolean => Payload::Boolean(false),
                Primitive::Byte => Payload::Byte(0),
                Primitive::Short => Payload::Short(0),
                Primitive::Char => Payload::Char(0),
                Primitive::Int => Payload::Int(0),
                Primitive::Long => Payload::Long(0),
                Primitive::Float => Payload::Float(0.0),
                Primitive::Double => Payload::Double(0.0),
            },
        };
        Value {
            declared_type: declared_type.clone(),
            payload: Some(payload),
        }
    }

    /// The declared type. Always set, known or not.
    #[must_use]
    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }

    /// The payload, present iff the value is known.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Returns `true` if the analysis determined this value.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.payload.is_some()
    }

    /// Returns `true` if the analysis could not determine this value.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.payload.is_none()
    }

    /// Returns `true` for a known `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.payload, Some(Payload::Null))
    }

    /// Extracts a known `int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self.payload {
            Some(Payload::Int(v)) => Some(v),
            _ => None,
        }
    }

    /// Extracts a known string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::String(v)) => Some(v),
            _ => None,
        }
    }

    /// Extracts a known object.
    #[must_use]
    pub fn as_instance(&self) -> Option<&Arc<Instance>> {
        match &self.payload {
            Some(Payload::Object(instance)) => Some(instance),
            _ => None,
        }
    }

    /// Extracts a known field handle.
    #[must_use]
    pub fn as_field_handle(&self) -> Option<&Arc<dyn FieldHandle>> {
        match &self.payload {
            Some(Payload::FieldHandle(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Returns the value inside a [`Payload::Boxed`], or `self` for any other value.
    #[must_use]
    pub fn unboxed(&self) -> &Value {
        match &self.payload {
            Some(Payload::Boxed(inner)) => inner,
            _ => self,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "Known({payload}, {})", self.declared_type),
            None => write!(f, "Unknown({})", self.declared_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_checks_assignability() {
        assert!(Value::known(Payload::Int(1), TypeDescriptor::int()).is_ok());
        assert!(Value::known(Payload::Null, TypeDescriptor::string()).is_ok());

        let err = Value::known(Payload::Long(1), TypeDescriptor::int()).unwrap_err();
        assert_eq!(
            err,
            EmulationError::TypeMismatch {
                expected: TypeDescriptor::int(),
                found: "long",
            }
        );
        assert!(Value::null(TypeDescriptor::int()).is_err());
    }

    #[test]
    fn test_unknown_has_no_payload() {
        let v = Value::unknown(TypeDescriptor::int());
        assert!(v.is_unknown());
        assert!(!v.is_null());
        assert_eq!(v.payload(), None);
        assert_eq!(v.declared_type(), &TypeDescriptor::int());
    }

    #[test]
    fn test_boxed_keeps_inner_type() {
        let boxed = Value::boxed(Value::int(1));
        assert_eq!(boxed.declared_type(), &TypeDescriptor::object());
        assert_eq!(boxed.unboxed(), &Value::int(1));
        assert_eq!(boxed.unboxed().declared_type(), &TypeDescriptor::int());
    }

    #[test]
    fn test_boxed_unknown_is_unknown_object() {
        let boxed = Value::boxed(Value::unknown(TypeDescriptor::int()));
        assert!(boxed.is_unknown());
        assert_eq!(boxed.declared_type(), &TypeDescriptor::object());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(Value::default_for(&TypeDescriptor::int()), Value::int(0));
        assert_eq!(
            Value::default_for(&TypeDescriptor::parse("Z").unwrap()),
            Value::boolean(false)
        );
        assert!(Value::default_for(&TypeDescriptor::string()).is_null());
        assert!(Value::default_for(&TypeDescriptor::Void).is_unknown());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::int(1).to_string(), "Known(1, I)");
        assert_eq!(
            Value::unknown(TypeDescriptor::object()).to_string(),
            "Unknown(Ljava/lang/Object;)"
        );
    }

    #[test]
    fn test_object_identity() {
        let class = TypeDescriptor::class("LC;");
        let a = Value::object(Instance::new(class.clone()));
        let b = Value::object(Instance::new(class));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
