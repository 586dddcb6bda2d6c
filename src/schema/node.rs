//! Raw schema tree.
//!
//! A [`SchemaNode`] describes the encoding of one value. Trees are produced
//! upstream (by hand with the builder functions, by a code generator, or
//! loaded from JSON / MessagePack) and handed to the compiler.
//!
//! # Example
//!
//! ```
//! use packwire::schema::SchemaNode;
//!
//! let schema = SchemaNode::object([
//!     ("id", SchemaNode::u16()),
//!     ("alive", SchemaNode::bool()),
//!     ("tags", SchemaNode::array(SchemaNode::string())),
//! ]);
//!
//! let json = schema.to_json().unwrap();
//! assert_eq!(SchemaNode::from_json(&json).unwrap(), schema);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::value::Scalar;

/// Integer width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IntWidth {
    W8,
    W16,
    W32,
}

impl IntWidth {
    /// Encoded size in bytes.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
        }
    }
}

impl TryFrom<u8> for IntWidth {
    type Error = String;

    fn try_from(bits: u8) -> std::result::Result<Self, Self::Error> {
        match bits {
            8 => Ok(IntWidth::W8),
            16 => Ok(IntWidth::W16),
            32 => Ok(IntWidth::W32),
            other => Err(format!("unsupported integer width {other}")),
        }
    }
}

impl From<IntWidth> for u8 {
    fn from(width: IntWidth) -> u8 {
        match width {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
        }
    }
}

/// Float width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FloatWidth {
    W32,
    W64,
}

impl TryFrom<u8> for FloatWidth {
    type Error = String;

    fn try_from(bits: u8) -> std::result::Result<Self, Self::Error> {
        match bits {
            32 => Ok(FloatWidth::W32),
            64 => Ok(FloatWidth::W64),
            other => Err(format!("unsupported float width {other}")),
        }
    }
}

impl From<FloatWidth> for u8 {
    fn from(width: FloatWidth) -> u8 {
        match width {
            FloatWidth::W32 => 32,
            FloatWidth::W64 => 64,
        }
    }
}

/// One node of a schema tree.
///
/// Serialized with an internal `kind` tag, e.g. `{"kind":"int","width":8,"signed":false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    Int {
        width: IntWidth,
        signed: bool,
    },
    Float {
        width: FloatWidth,
    },
    Bool,
    String,
    Array {
        element: Box<SchemaNode>,
    },
    /// Fixed positional elements, optionally followed by a homogeneous rest.
    Tuple {
        fixed: Vec<SchemaNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rest: Option<Box<SchemaNode>>,
    },
    Map {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    Set {
        element: Box<SchemaNode>,
    },
    /// Named fields in declaration order.
    Object {
        fields: Vec<(String, SchemaNode)>,
    },
    Optional {
        inner: Box<SchemaNode>,
    },
    /// Tagged union selected by the `discriminator` field of an object value.
    Union {
        discriminator: String,
        variants: Vec<(Scalar, SchemaNode)>,
    },
    /// Untagged union of a primitive branch and an object branch.
    MixedUnion {
        primitive: Box<SchemaNode>,
        object: Box<SchemaNode>,
    },
    /// Closed set of constants, optionally including `undefined`.
    Literal {
        values: Vec<Scalar>,
        #[serde(default)]
        includes_undefined: bool,
    },
    /// Subtree eligible for bit-level packing.
    Packed {
        inner: Box<SchemaNode>,
    },
    /// Opaque value passed through the blob side channel.
    Blob,
    /// Pluggable domain codec, looked up by name at compile time.
    Leaf {
        name: String,
    },
}

impl SchemaNode {
    pub fn int(width: IntWidth, signed: bool) -> Self {
        SchemaNode::Int { width, signed }
    }

    pub fn u8() -> Self {
        Self::int(IntWidth::W8, false)
    }

    pub fn u16() -> Self {
        Self::int(IntWidth::W16, false)
    }

    pub fn u32() -> Self {
        Self::int(IntWidth::W32, false)
    }

    pub fn i8() -> Self {
        Self::int(IntWidth::W8, true)
    }

    pub fn i16() -> Self {
        Self::int(IntWidth::W16, true)
    }

    pub fn i32() -> Self {
        Self::int(IntWidth::W32, true)
    }

    pub fn f32() -> Self {
        SchemaNode::Float {
            width: FloatWidth::W32,
        }
    }

    pub fn f64() -> Self {
        SchemaNode::Float {
            width: FloatWidth::W64,
        }
    }

    pub fn bool() -> Self {
        SchemaNode::Bool
    }

    pub fn string() -> Self {
        SchemaNode::String
    }

    pub fn blob() -> Self {
        SchemaNode::Blob
    }

    pub fn array(element: SchemaNode) -> Self {
        SchemaNode::Array {
            element: Box::new(element),
        }
    }

    pub fn set(element: SchemaNode) -> Self {
        SchemaNode::Set {
            element: Box::new(element),
        }
    }

    pub fn map(key: SchemaNode, value: SchemaNode) -> Self {
        SchemaNode::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn tuple(fixed: Vec<SchemaNode>, rest: Option<SchemaNode>) -> Self {
        SchemaNode::Tuple {
            fixed,
            rest: rest.map(Box::new),
        }
    }

    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaNode)>,
    {
        SchemaNode::Object {
            fields: fields.into_iter().map(|(k, n)| (k.into(), n)).collect(),
        }
    }

    pub fn optional(inner: SchemaNode) -> Self {
        SchemaNode::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn union<D, T, I>(discriminator: D, variants: I) -> Self
    where
        D: Into<String>,
        T: Into<Scalar>,
        I: IntoIterator<Item = (T, SchemaNode)>,
    {
        SchemaNode::Union {
            discriminator: discriminator.into(),
            variants: variants.into_iter().map(|(t, n)| (t.into(), n)).collect(),
        }
    }

    pub fn mixed_union(primitive: SchemaNode, object: SchemaNode) -> Self {
        SchemaNode::MixedUnion {
            primitive: Box::new(primitive),
            object: Box::new(object),
        }
    }

    pub fn literal<T, I>(values: I, includes_undefined: bool) -> Self
    where
        T: Into<Scalar>,
        I: IntoIterator<Item = T>,
    {
        SchemaNode::Literal {
            values: values.into_iter().map(Into::into).collect(),
            includes_undefined,
        }
    }

    pub fn packed(inner: SchemaNode) -> Self {
        SchemaNode::Packed {
            inner: Box::new(inner),
        }
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        SchemaNode::Leaf { name: name.into() }
    }

    /// Kind tag as used in the serialized form.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Int { .. } => "int",
            SchemaNode::Float { .. } => "float",
            SchemaNode::Bool => "bool",
            SchemaNode::String => "string",
            SchemaNode::Array { .. } => "array",
            SchemaNode::Tuple { .. } => "tuple",
            SchemaNode::Map { .. } => "map",
            SchemaNode::Set { .. } => "set",
            SchemaNode::Object { .. } => "object",
            SchemaNode::Optional { .. } => "optional",
            SchemaNode::Union { .. } => "union",
            SchemaNode::MixedUnion { .. } => "mixed_union",
            SchemaNode::Literal { .. } => "literal",
            SchemaNode::Packed { .. } => "packed",
            SchemaNode::Blob => "blob",
            SchemaNode::Leaf { .. } => "leaf",
        }
    }

    /// Parse a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode the schema as MessagePack (struct-as-map form).
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(CodecError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let json = SchemaNode::u8().to_json().unwrap();
        assert_eq!(json, r#"{"kind":"int","width":8,"signed":false}"#);

        assert_eq!(SchemaNode::bool().to_json().unwrap(), r#"{"kind":"bool"}"#);
    }

    #[test]
    fn test_parse_handwritten_json() {
        let json = r#"{
            "kind": "object",
            "fields": [
                ["x", {"kind": "float", "width": 32}],
                ["state", {"kind": "literal", "values": ["idle", "run"]}],
                ["hit", {"kind": "union", "discriminator": "type", "variants": [
                    ["miss", {"kind": "object", "fields": []}],
                    ["hit", {"kind": "object", "fields": [["damage", {"kind": "int", "width": 16, "signed": true}]]}]
                ]}]
            ]
        }"#;

        let expected = SchemaNode::object([
            ("x", SchemaNode::f32()),
            ("state", SchemaNode::literal(["idle", "run"], false)),
            (
                "hit",
                SchemaNode::union(
                    "type",
                    [
                        ("miss", SchemaNode::object(Vec::<(String, SchemaNode)>::new())),
                        ("hit", SchemaNode::object([("damage", SchemaNode::i16())])),
                    ],
                ),
            ),
        ]);

        assert_eq!(SchemaNode::from_json(json).unwrap(), expected);
    }

    #[test]
    fn test_invalid_width_rejected() {
        let err = SchemaNode::from_json(r#"{"kind":"int","width":12,"signed":false}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported integer width 12"));
    }

    #[test]
    fn test_msgpack_round_trip() {
        let schema = SchemaNode::packed(SchemaNode::tuple(
            vec![SchemaNode::bool(), SchemaNode::leaf("vector")],
            Some(SchemaNode::optional(SchemaNode::f64())),
        ));

        let bytes = schema.to_msgpack().unwrap();
        assert_eq!(SchemaNode::from_msgpack(&bytes).unwrap(), schema);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SchemaNode::blob().kind_name(), "blob");
        assert_eq!(SchemaNode::set(SchemaNode::u8()).kind_name(), "set");
        assert_eq!(SchemaNode::leaf("color").kind_name(), "leaf");
    }
}
