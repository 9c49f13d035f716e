//! Runtime values passed through get/set/invoke/construct

use prism_types::TypeHandle;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A reference to a host object, tagged with its runtime class
#[derive(Clone)]
pub struct ObjectRef {
    /// Runtime class of the object
    pub class: TypeHandle,
    /// Host-defined payload
    pub data: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    /// Create an object reference over a host payload
    pub fn new(class: TypeHandle, data: Arc<dyn Any + Send + Sync>) -> Self {
        ObjectRef { class, data }
    }

    /// Downcast the payload to a concrete host type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Identity comparison of the underlying payload
    pub fn same_object(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.class)
    }
}

/// A dynamically typed value crossing the reflection boundary
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value / null reference
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Unicode scalar
    Char(char),
    /// Immutable string
    Str(Arc<str>),
    /// Host object reference
    Object(ObjectRef),
}

impl Value {
    /// Build a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The 32-bit integer payload, if any
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The 64-bit integer payload, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// The 64-bit float payload, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// The string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The object payload, if any
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Object(a), Object(b)) => a.class == b.class && a.same_object(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Int(5).as_i32(), Some(5));
        assert_eq!(Value::Int(5).as_i64(), None);
        assert_eq!(Value::string("hi").as_str(), Some("hi"));
    }

    #[test]
    fn test_object_identity_equality() {
        let data: Arc<dyn Any + Send + Sync> = Arc::new(42u8);
        let class = TypeHandle::new(1);
        let a = Value::Object(ObjectRef::new(class, data.clone()));
        let b = Value::Object(ObjectRef::new(class, data));
        let c = Value::Object(ObjectRef::new(class, Arc::new(42u8)));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
