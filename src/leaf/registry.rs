//! Leaf codec registry.
//!
//! Maps leaf kind names to codecs. The compiler resolves every
//! `SchemaNode::Leaf` against a registry once, so the encoder and decoder
//! dispatch straight to the codec without name lookups.
//!
//! # Example
//!
//! ```
//! use packwire::leaf::{EnumLeaf, LeafRegistry};
//!
//! let mut registry = LeafRegistry::new();
//! registry.register(EnumLeaf::new("material", ["wood", "stone", "metal"]).unwrap());
//!
//! assert!(registry.contains("material"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{LeafReader, LeafWriter};
use crate::error::Result;
use crate::value::Value;

/// A pluggable codec for a domain-specific value kind.
///
/// Implementations must read back exactly what they wrote: the same number of
/// bytes, and the same number of packed bits.
pub trait LeafCodec: Send + Sync + 'static {
    /// Kind name used in `SchemaNode::Leaf`.
    fn name(&self) -> &str;

    /// Whether the codec emits exactly one packed bit when encoded inside a
    /// Packed scope. The compiler counts that bit.
    fn packs_bit(&self) -> bool {
        false
    }

    /// Encode `value` through the writer context.
    fn encode(&self, value: &Value, out: &mut LeafWriter<'_>) -> Result<()>;

    /// Decode one value through the reader context.
    fn decode(&self, input: &mut LeafReader<'_, '_>) -> Result<Value>;
}

impl fmt::Debug for dyn LeafCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafCodec({})", self.name())
    }
}

/// Registry mapping leaf kind names to codecs.
#[derive(Clone, Default)]
pub struct LeafRegistry {
    codecs: HashMap<String, Arc<dyn LeafCodec>>,
}

impl LeafRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec under its own name, replacing any previous codec.
    pub fn register<C: LeafCodec>(&mut self, codec: C) {
        self.register_shared(Arc::new(codec));
    }

    /// Register an already shared codec.
    pub fn register_shared(&mut self, codec: Arc<dyn LeafCodec>) {
        let name = codec.name().to_string();
        if self.codecs.insert(name.clone(), codec).is_some() {
            tracing::debug!(leaf = %name, "leaf codec replaced");
        }
    }

    /// Get a codec by kind name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn LeafCodec>> {
        self.codecs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Registered kind names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for LeafRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafRegistry")
            .field("codecs", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl LeafCodec for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn encode(&self, _value: &Value, out: &mut LeafWriter<'_>) -> Result<()> {
            out.write_u8(0);
            Ok(())
        }

        fn decode(&self, input: &mut LeafReader<'_, '_>) -> Result<Value> {
            input.read_u8()?;
            Ok(Value::Undefined)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = LeafRegistry::new();
        assert!(registry.is_empty());

        registry.register(Fixed("b"));
        registry.register(Fixed("a"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.get("a").unwrap().name(), "a");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = LeafRegistry::new();
        registry.register(Fixed("a"));
        registry.register(Fixed("a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = LeafRegistry::new();
        registry.register(Fixed("vector"));
        assert_eq!(
            format!("{registry:?}"),
            r#"LeafRegistry { codecs: ["vector"] }"#
        );
    }
}
