//! Leaf module - pluggable codecs for domain-specific value kinds.
//!
//! Provides:
//! - [`LeafCodec`] - the plugin trait
//! - [`LeafRegistry`] - maps leaf kind names to codecs
//! - [`LeafWriter`] / [`LeafReader`] - the encoder/decoder contexts a codec sees
//! - [`EnumLeaf`] - reusable codec for closed item tables
//!
//! # Example
//!
//! ```
//! use packwire::leaf::{LeafCodec, LeafReader, LeafRegistry, LeafWriter};
//! use packwire::{Result, Value};
//!
//! struct Rgb;
//!
//! impl LeafCodec for Rgb {
//!     fn name(&self) -> &str {
//!         "rgb"
//!     }
//!
//!     fn encode(&self, value: &Value, out: &mut LeafWriter<'_>) -> Result<()> {
//!         let rgb = value.as_int().unwrap_or(0) as u32;
//!         out.write_bytes(&rgb.to_le_bytes()[..3]);
//!         Ok(())
//!     }
//!
//!     fn decode(&self, input: &mut LeafReader<'_, '_>) -> Result<Value> {
//!         let b = input.read_bytes(3)?;
//!         Ok(Value::Int(i64::from(u32::from_le_bytes([b[0], b[1], b[2], 0]))))
//!     }
//! }
//!
//! let mut registry = LeafRegistry::new();
//! registry.register(Rgb);
//! ```

mod context;
mod enumeration;
mod registry;

pub use context::{LeafReader, LeafWriter};
pub use enumeration::{EnumLeaf, MAX_ENUM_ITEMS};
pub use registry::{LeafCodec, LeafRegistry};
