//! Enumeration leaf: a value encoded as its 1-byte position in a fixed table.

use super::{LeafCodec, LeafReader, LeafWriter};
use crate::error::{CodecError, Result};
use crate::value::{Scalar, Value};

/// Maximum items addressable by a 1-byte index.
pub const MAX_ENUM_ITEMS: usize = 256;

/// Leaf codec for a closed, ordered item table.
///
/// Both ends must register the table in the same order.
#[derive(Debug, Clone)]
pub struct EnumLeaf {
    name: String,
    items: Vec<Value>,
}

impl EnumLeaf {
    /// Create an enumeration leaf. Fails if the table is empty or exceeds 256 items.
    pub fn new<T, I>(name: impl Into<String>, items: I) -> Result<Self>
    where
        T: Into<Scalar>,
        I: IntoIterator<Item = T>,
    {
        let name = name.into();
        let items: Vec<Value> = items.into_iter().map(|i| Value::from(i.into())).collect();

        if items.is_empty() || items.len() > MAX_ENUM_ITEMS {
            return Err(CodecError::Schema(format!(
                "enum leaf '{}' needs 1-{} items, got {}",
                name,
                MAX_ENUM_ITEMS,
                items.len()
            )));
        }

        Ok(Self { name, items })
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

impl LeafCodec for EnumLeaf {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, value: &Value, out: &mut LeafWriter<'_>) -> Result<()> {
        let index = self
            .items
            .iter()
            .position(|item| item == value)
            .ok_or_else(|| CodecError::Leaf(format!("{:?} is not a member of '{}'", value, self.name)))?;
        // Table size is capped at 256.
        out.write_u8(index as u8);
        Ok(())
    }

    fn decode(&self, input: &mut LeafReader<'_, '_>) -> Result<Value> {
        let index = input.read_u8()? as usize;
        self.items
            .get(index)
            .cloned()
            .ok_or(CodecError::InvalidTag {
                index,
                count: self.items.len(),
            })
    }
}
