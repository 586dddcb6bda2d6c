//! # packwire
//!
//! Schema-driven binary serialization for state replication.
//!
//! A [`SchemaNode`] tree describes the shape of a value. It is compiled once
//! into a [`CompiledSchema`], which is then shared read-only by any number of
//! encode/decode calls.
//!
//! ## Architecture
//!
//! - **Schema** (`schema`): node tree, builders, JSON/MessagePack interchange, compiler
//! - **Protocol** (`protocol`): arena buffer, little-endian reads, bit prefix, blob channel
//! - **Codec** (`codec`): the encoder/decoder walkers
//! - **Leaf** (`leaf`): pluggable codecs for domain-specific kinds
//!
//! ## Example
//!
//! ```
//! use packwire::{BinarySerializer, SchemaNode, Value};
//!
//! let serializer = BinarySerializer::builder()
//!     .build(&SchemaNode::packed(SchemaNode::object([
//!         ("alive", SchemaNode::bool()),
//!         ("hp", SchemaNode::u16()),
//!     ])))
//!     .unwrap();
//!
//! let player = Value::object([("alive", Value::Bool(true)), ("hp", Value::Int(300))]);
//! let encoded = serializer.serialize(&player).unwrap();
//! assert_eq!(&encoded.bytes[..], &[0b1, 0x2C, 0x01]);
//! assert_eq!(serializer.deserialize(&encoded.bytes, &encoded.blobs).unwrap(), player);
//! ```

pub mod codec;
pub mod error;
pub mod leaf;
pub mod protocol;
pub mod schema;
pub mod value;

mod serializer;

pub use codec::{decode, encode, CodecConfig, Encoded};
pub use error::{CodecError, Result};
pub use schema::{CompiledSchema, SchemaNode};
pub use serializer::{BinarySerializer, SerializerBuilder};
pub use value::{Blob, Scalar, Value};
