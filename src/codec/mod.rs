//! Codec module - schema-driven encoding and decoding of values.
//!
//! - [`Encoder`] - walks a value against a [`CompiledSchema`] and produces bytes
//! - [`Decoder`] - the inverse walk over bytes and a blob list
//! - [`encode`] / [`decode`] - one-shot helpers with default [`CodecConfig`]
//!
//! # Output layout
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────────┐
//! │ packing prefix           │ body                         │
//! │ (only if schema packs)   │ (fields in declaration order)│
//! └──────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Blob values never appear in the bytes; they travel in [`Encoded::blobs`]
//! and are consumed positionally on decode.
//!
//! # Example
//!
//! ```
//! use packwire::codec::{decode, encode};
//! use packwire::schema::{CompiledSchema, SchemaNode};
//! use packwire::Value;
//!
//! let schema = CompiledSchema::compile(&SchemaNode::object([
//!     ("x", SchemaNode::u8()),
//!     ("y", SchemaNode::bool()),
//! ]))
//! .unwrap();
//!
//! let value = Value::object([("x", Value::Int(5)), ("y", Value::Bool(true))]);
//! let encoded = encode(&value, &schema).unwrap();
//! assert_eq!(&encoded.bytes[..], &[5, 1]);
//!
//! let decoded = decode(&encoded.bytes, &encoded.blobs, &schema).unwrap();
//! assert_eq!(decoded, value);
//! ```

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::{DEFAULT_ARENA_CAPACITY, DEFAULT_MAX_LENGTH};
use crate::schema::CompiledSchema;
use crate::value::{Blob, Value};

/// Per-call codec settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Initial arena size in bytes (rounded up to a power of two, capped at
    /// `MAX_INITIAL_ARENA_CAPACITY`).
    pub initial_capacity: usize,
    /// Decode-side ceiling on string lengths and container counts.
    pub max_length: u32,
    /// Fail on an unmatched union discriminator instead of falling back to
    /// the first variant.
    pub strict_discriminators: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_ARENA_CAPACITY,
            max_length: DEFAULT_MAX_LENGTH,
            strict_discriminators: false,
        }
    }
}

/// Result of one encode call.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    /// Packing prefix followed by the body.
    pub bytes: Bytes,
    /// Blob values in encounter order.
    pub blobs: Vec<Blob>,
}

impl Encoded {
    /// Encoded size in bytes (blobs excluded).
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode `value` with the default configuration.
pub fn encode(value: &Value, schema: &CompiledSchema) -> Result<Encoded> {
    encode_with(value, schema, &CodecConfig::default())
}

/// Encode `value` with an explicit configuration.
pub fn encode_with(value: &Value, schema: &CompiledSchema, config: &CodecConfig) -> Result<Encoded> {
    Encoder::new(schema, config).encode(value)
}

/// Decode one value with the default configuration.
pub fn decode(bytes: &[u8], blobs: &[Blob], schema: &CompiledSchema) -> Result<Value> {
    decode_with(bytes, blobs, schema, &CodecConfig::default())
}

/// Decode one value with an explicit configuration.
pub fn decode_with(
    bytes: &[u8],
    blobs: &[Blob],
    schema: &CompiledSchema,
    config: &CodecConfig,
) -> Result<Value> {
    Decoder::new(schema, config, bytes, blobs).decode()
}
