//! Serializer façade and builder.
//!
//! The [`SerializerBuilder`] collects leaf codecs and codec settings, then
//! compiles a schema once. The resulting [`BinarySerializer`] is cheap to clone
//! and can be shared across threads; every call gets fresh encoder state.
//!
//! # Example
//!
//! ```
//! use packwire::{BinarySerializer, SchemaNode, Value};
//!
//! let serializer = BinarySerializer::builder()
//!     .initial_capacity(64)
//!     .build(&SchemaNode::optional(SchemaNode::u8()))
//!     .unwrap();
//!
//! let encoded = serializer.serialize(&Value::Int(7)).unwrap();
//! assert_eq!(&encoded.bytes[..], &[1, 7]);
//! assert_eq!(serializer.deserialize(&encoded.bytes, &[]).unwrap(), Value::Int(7));
//! ```

use std::sync::Arc;

use crate::codec::{decode_with, encode_with, CodecConfig, Encoded};
use crate::error::Result;
use crate::leaf::{LeafCodec, LeafRegistry};
use crate::schema::{CompiledSchema, SchemaNode};
use crate::value::{Blob, Value};

/// Builder for configuring and creating a [`BinarySerializer`].
pub struct SerializerBuilder {
    registry: LeafRegistry,
    config: CodecConfig,
}

impl SerializerBuilder {
    /// Create a new builder with default settings and no leaf codecs.
    pub fn new() -> Self {
        Self {
            registry: LeafRegistry::new(),
            config: CodecConfig::default(),
        }
    }

    /// Register a leaf codec under its own name.
    pub fn leaf<C: LeafCodec>(mut self, codec: C) -> Self {
        self.registry.register(codec);
        self
    }

    /// Register an already shared leaf codec.
    pub fn shared_leaf(mut self, codec: Arc<dyn LeafCodec>) -> Self {
        self.registry.register_shared(codec);
        self
    }

    /// Replace the whole codec configuration.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial arena size.
    pub fn initial_capacity(mut self, bytes: usize) -> Self {
        self.config.initial_capacity = bytes;
        self
    }

    /// Set the decode-side length ceiling.
    pub fn max_length(mut self, max: u32) -> Self {
        self.config.max_length = max;
        self
    }

    /// Fail on unmatched union discriminators.
    pub fn strict_discriminators(mut self, strict: bool) -> Self {
        self.config.strict_discriminators = strict;
        self
    }

    /// Compile `schema` and build the serializer.
    pub fn build(self, schema: &SchemaNode) -> Result<BinarySerializer> {
        let compiled = CompiledSchema::compile_with(schema, &self.registry)?;
        Ok(BinarySerializer {
            schema: Arc::new(compiled),
            config: self.config,
        })
    }
}

impl Default for SerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled schema bundled with its codec settings.
#[derive(Debug, Clone)]
pub struct BinarySerializer {
    schema: Arc<CompiledSchema>,
    config: CodecConfig,
}

impl BinarySerializer {
    /// Create a new serializer builder.
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::new()
    }

    /// Wrap an already compiled schema.
    pub fn from_compiled(schema: Arc<CompiledSchema>, config: CodecConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode one value.
    pub fn serialize(&self, value: &Value) -> Result<Encoded> {
        encode_with(value, &self.schema, &self.config)
    }

    /// Decode one value from `bytes`, taking blob entries from `blobs` in order.
    pub fn deserialize(&self, bytes: &[u8], blobs: &[Blob]) -> Result<Value> {
        decode_with(bytes, blobs, &self.schema, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::leaf::EnumLeaf;

    #[test]
    fn test_builder_defaults() {
        let serializer = BinarySerializer::builder()
            .build(&SchemaNode::u8())
            .unwrap();
        assert_eq!(serializer.config(), &CodecConfig::default());
        assert!(!serializer.schema().packing().has_packing);
    }

    #[test]
    fn test_builder_setters() {
        let serializer = SerializerBuilder::new()
            .initial_capacity(8)
            .max_length(10)
            .strict_discriminators(true)
            .build(&SchemaNode::bool())
            .unwrap();
        let config = serializer.config();
        assert_eq!(config.initial_capacity, 8);
        assert_eq!(config.max_length, 10);
        assert!(config.strict_discriminators);
    }

    #[test]
    fn test_unknown_leaf_fails_build() {
        let err = BinarySerializer::builder()
            .build(&SchemaNode::leaf("color"))
            .unwrap_err();
        assert!(matches!(err, CodecError::Schema(_)));
    }

    #[test]
    fn test_registered_leaf_round_trip() {
        let serializer = BinarySerializer::builder()
            .leaf(EnumLeaf::new("color", ["red", "green"]).unwrap())
            .build(&SchemaNode::array(SchemaNode::leaf("color")))
            .unwrap();

        let value = Value::Array(vec![Value::from("green"), Value::from("red")]);
        let encoded = serializer.serialize(&value).unwrap();
        assert_eq!(&encoded.bytes[..], &[2, 0, 0, 0, 1, 0]);
        assert_eq!(serializer.deserialize(&encoded.bytes, &[]).unwrap(), value);
    }

    #[test]
    fn test_max_length_applies_on_deserialize() {
        let serializer = BinarySerializer::builder()
            .max_length(1)
            .build(&SchemaNode::string())
            .unwrap();
        let encoded = serializer.serialize(&Value::from("ab")).unwrap();
        let err = serializer.deserialize(&encoded.bytes, &[]).unwrap_err();
        assert!(matches!(err, CodecError::LengthLimitExceeded { .. }));
    }

    #[test]
    fn test_clone_shares_schema() {
        let serializer = BinarySerializer::builder()
            .build(&SchemaNode::u8())
            .unwrap();
        let clone = serializer.clone();
        assert!(std::ptr::eq(serializer.schema(), clone.schema()));
    }
}
