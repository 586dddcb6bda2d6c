//! Dynamic value model walked by the encoder and produced by the decoder.
//!
//! Values mirror the shapes a schema can describe. Objects are keyed maps,
//! tuples and arrays share [`Value::Array`], and opaque host values travel
//! as [`Blob`] handles that are never byte-encoded.
//!
//! # Example
//!
//! ```
//! use packwire::Value;
//!
//! let player = Value::object([("id", Value::from(7)), ("name", Value::from("ada"))]);
//! assert_eq!(player.get("id"), Some(&Value::Int(7)));
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Field map of an object value.
pub type Object = BTreeMap<String, Value>;

/// A structured value that can be encoded against a schema.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value (an empty optional, an omitted literal).
    #[default]
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Arrays and tuples.
    Array(Vec<Value>),
    /// Map entries in iteration order.
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Object(Object),
    Blob(Blob),
}

impl Value {
    /// Build an object from `(name, value)` pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, used in type mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Object(_) => "object",
            Value::Blob(_) => "blob",
        }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Look up an object field. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }
}

fn defined_fields(fields: &Object) -> impl Iterator<Item = (&String, &Value)> {
    fields.iter().filter(|(_, v)| !v.is_undefined())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            // A missing key reads as undefined.
            (Value::Object(a), Value::Object(b)) => defined_fields(a).eq(defined_fields(b)),
            (Value::Blob(a), Value::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Blob> for Value {
    fn from(v: Blob) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Undefined, Into::into)
    }
}

/// Constant that can appear in a schema: a literal table entry or a union tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Int(n) => Value::Int(n),
            Scalar::Float(f) => Value::Float(f),
            Scalar::String(s) => Value::String(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

/// Opaque host value carried through the blob side channel.
///
/// The codec never inspects a blob; it only preserves its position relative
/// to other blobs. Equality is reference identity.
#[derive(Clone)]
pub struct Blob(Arc<dyn Any + Send + Sync>);

impl Blob {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wrap an already shared value without reallocating.
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True if both handles point at the same host value.
    #[inline]
    pub fn ptr_eq(&self, other: &Blob) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({:p})", Arc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_missing_key_equals_undefined() {
        let a = Value::object([("x", Value::Int(1)), ("y", Value::Undefined)]);
        let b = Value::object([("x", Value::Int(1))]);
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn test_object_inequality() {
        let a = Value::object([("x", Value::Int(1))]);
        let b = Value::object([("x", Value::Int(2))]);
        let c = Value::object([("x", Value::Int(1)), ("z", Value::Bool(false))]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_blob_identity() {
        let blob = Blob::new(String::from("part"));
        let same = blob.clone();
        let other = Blob::new(String::from("part"));

        assert_eq!(blob, same);
        assert_ne!(blob, other);
        assert_eq!(blob.downcast_ref::<String>().unwrap(), "part");
    }

    #[test]
    fn test_scalar_untagged_json() {
        let scalars: Vec<Scalar> = serde_json::from_str(r#"[true, 3, 1.5, "idle"]"#).unwrap();
        assert_eq!(
            scalars,
            vec![
                Scalar::Bool(true),
                Scalar::Int(3),
                Scalar::Float(1.5),
                Scalar::String("idle".into())
            ]
        );
        assert_eq!(Value::from(scalars[3].clone()), Value::from("idle"));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Undefined);
        assert_eq!(Value::from(Some(4)), Value::Int(4));
    }
}
