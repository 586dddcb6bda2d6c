//! Schema module - raw schema trees and their compiled form.
//!
//! - [`SchemaNode`] - immutable tree describing a value's encoding
//! - [`CompiledSchema`] - flattened, packing-annotated form produced once and
//!   shared read-only by every encode/decode call
//!
//! # Example
//!
//! ```
//! use packwire::schema::{CompiledSchema, SchemaNode};
//!
//! let schema = SchemaNode::packed(SchemaNode::object([
//!     ("a", SchemaNode::bool()),
//!     ("b", SchemaNode::bool()),
//! ]));
//!
//! let compiled = CompiledSchema::compile(&schema).unwrap();
//! assert_eq!(compiled.packing().minimum_guaranteed_bits, 2);
//! assert_eq!(compiled.packing().minimum_guaranteed_bytes(), 1);
//! ```

mod compiler;
mod node;

pub use compiler::{
    CompiledNode, CompiledSchema, LiteralTable, ObjectLayout, PackingInfo, TagWidth, UnionLayout,
    MAX_SCHEMA_DEPTH, MAX_U16_TAG_STATES, MAX_U8_TAG_STATES,
};
pub use node::{FloatWidth, IntWidth, SchemaNode};
