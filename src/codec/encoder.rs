//! Value → bytes + bits + blobs walker.
//!
//! The encoder walks a [`CompiledSchema`] in declaration order. Bytes go to a
//! private [`BufferArena`], packed decisions to a [`BitWriter`], opaque values
//! to a [`BlobChannel`]. On completion the bits are flushed into the packing
//! prefix and the arena is trimmed behind it.

use super::{CodecConfig, Encoded};
use crate::error::{CodecError, Result};
use crate::leaf::LeafWriter;
use crate::protocol::{length_prefix, BitWriter, BlobChannel, BufferArena, LENGTH_PREFIX_SIZE};
use crate::schema::{
    CompiledNode, CompiledSchema, FloatWidth, IntWidth, LiteralTable, ObjectLayout, TagWidth,
    UnionLayout,
};
use crate::value::{Object, Value};

/// Stand-in for absent object fields and tuple slots.
static UNDEFINED: Value = Value::Undefined;

#[inline]
fn mismatch(expected: &'static str, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

#[inline]
fn checked<T: TryFrom<i64>>(value: i64, target: &'static str) -> Result<T> {
    T::try_from(value).map_err(|_| CodecError::IntegerOutOfRange { value, target })
}

/// Single-use encoder bound to a compiled schema.
pub struct Encoder<'s> {
    schema: &'s CompiledSchema,
    config: &'s CodecConfig,
    arena: BufferArena,
    bits: BitWriter,
    blobs: BlobChannel,
    packing: bool,
}

impl<'s> Encoder<'s> {
    pub fn new(schema: &'s CompiledSchema, config: &'s CodecConfig) -> Self {
        Self {
            schema,
            config,
            arena: BufferArena::with_capacity(config.initial_capacity),
            bits: BitWriter::with_capacity(schema.packing().minimum_guaranteed_bits),
            blobs: BlobChannel::new(),
            packing: false,
        }
    }

    /// Encode `value` and consume the encoder.
    pub fn encode(mut self, value: &Value) -> Result<Encoded> {
        let schema = self.schema;
        self.node(value, schema.root())?;
        self.finish()
    }

    fn finish(self) -> Result<Encoded> {
        let packing = self.schema.packing();

        let prefix = if packing.has_packing {
            self.bits.to_prefix(
                packing.minimum_guaranteed_bytes(),
                packing.has_variable_arity_packing,
            )?
        } else {
            Vec::new()
        };

        tracing::trace!(
            prefix = prefix.len(),
            body = self.arena.len(),
            bits = self.bits.len(),
            blobs = self.blobs.len(),
            "value encoded"
        );

        Ok(Encoded {
            bytes: self.arena.finish(&prefix),
            blobs: self.blobs.into_vec(),
        })
    }

    fn node(&mut self, value: &Value, node: &CompiledNode) -> Result<()> {
        match node {
            CompiledNode::Int { width, signed } => self.int(value, *width, *signed),
            CompiledNode::Float { width } => {
                let float = value.as_float().ok_or_else(|| mismatch("float", value))?;
                match width {
                    FloatWidth::W32 => self.arena.put(&(float as f32).to_le_bytes()),
                    FloatWidth::W64 => self.arena.put(&float.to_le_bytes()),
                }
                Ok(())
            }
            CompiledNode::Bool => {
                let flag = value.as_bool().ok_or_else(|| mismatch("bool", value))?;
                self.flag(flag);
                Ok(())
            }
            CompiledNode::String => {
                let text = value.as_str().ok_or_else(|| mismatch("string", value))?;
                let len = length_prefix(text.len())?;
                self.arena.put(&len.to_le_bytes());
                self.arena.put(text.as_bytes());
                Ok(())
            }
            CompiledNode::Array(element) => match value {
                Value::Array(items) => self.sequence(items, element),
                _ => Err(mismatch("array", value)),
            },
            CompiledNode::Set(element) => match value {
                Value::Set(items) => self.sequence(items, element),
                _ => Err(mismatch("set", value)),
            },
            CompiledNode::Map(key_node, value_node) => {
                let Value::Map(entries) = value else {
                    return Err(mismatch("map", value));
                };
                let at = self.arena.allocate(LENGTH_PREFIX_SIZE);
                let mut count = 0usize;
                for (key, entry) in entries {
                    self.node(key, key_node)?;
                    self.node(entry, value_node)?;
                    count += 1;
                }
                self.patch_length(at, count)
            }
            CompiledNode::Tuple { fixed, rest } => self.tuple(value, fixed, rest.as_deref()),
            CompiledNode::Object(layout) => match value {
                Value::Object(fields) => self.object(fields, layout),
                _ => Err(mismatch("object", value)),
            },
            CompiledNode::Optional(inner) => {
                let present = !value.is_undefined();
                self.flag(present);
                if present {
                    self.node(value, inner)?;
                }
                Ok(())
            }
            CompiledNode::Union(layout) => self.union(value, layout),
            CompiledNode::MixedUnion { primitive, object } => {
                if matches!(value, Value::Object(_)) {
                    self.arena.put(&[1]);
                    self.node(value, object)
                } else {
                    self.arena.put(&[0]);
                    self.node(value, primitive)
                }
            }
            CompiledNode::Literal(table) => self.literal(value, table),
            CompiledNode::Packed(inner) => {
                let was_packing = self.packing;
                self.packing = true;
                let result = self.node(value, inner);
                self.packing = was_packing;
                result
            }
            CompiledNode::Blob => {
                let blob = value.as_blob().ok_or_else(|| mismatch("blob", value))?;
                self.blobs.push(blob.clone());
                Ok(())
            }
            CompiledNode::Leaf(codec) => {
                let mut out = LeafWriter::new(&mut self.arena, &mut self.bits, self.packing);
                codec.encode(value, &mut out)
            }
        }
    }

    /// Boolean-valued field: a packed bit or a 0/1 byte.
    #[inline]
    fn flag(&mut self, flag: bool) {
        if self.packing {
            self.bits.push(flag);
        } else {
            self.arena.put(&[u8::from(flag)]);
        }
    }

    fn int(&mut self, value: &Value, width: IntWidth, signed: bool) -> Result<()> {
        let int = value.as_int().ok_or_else(|| mismatch("int", value))?;
        match (width, signed) {
            (IntWidth::W8, false) => self.arena.put(&checked::<u8>(int, "u8")?.to_le_bytes()),
            (IntWidth::W8, true) => self.arena.put(&checked::<i8>(int, "i8")?.to_le_bytes()),
            (IntWidth::W16, false) => self.arena.put(&checked::<u16>(int, "u16")?.to_le_bytes()),
            (IntWidth::W16, true) => self.arena.put(&checked::<i16>(int, "i16")?.to_le_bytes()),
            (IntWidth::W32, false) => self.arena.put(&checked::<u32>(int, "u32")?.to_le_bytes()),
            (IntWidth::W32, true) => self.arena.put(&checked::<i32>(int, "i32")?.to_le_bytes()),
        }
        Ok(())
    }

    /// Length placeholder, elements, then the patched count.
    fn sequence(&mut self, items: &[Value], element: &CompiledNode) -> Result<()> {
        let at = self.arena.allocate(LENGTH_PREFIX_SIZE);
        let mut count = 0usize;
        for item in items {
            self.node(item, element)?;
            count += 1;
        }
        self.patch_length(at, count)
    }

    fn patch_length(&mut self, at: usize, count: usize) -> Result<()> {
        let len = length_prefix(count)?;
        self.arena.write_at(at, &len.to_le_bytes());
        Ok(())
    }

    fn tuple(
        &mut self,
        value: &Value,
        fixed: &[CompiledNode],
        rest: Option<&CompiledNode>,
    ) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(mismatch("tuple", value));
        };

        if let Some(rest) = rest {
            let rest_count = items.len().saturating_sub(fixed.len());
            self.arena.put(&length_prefix(rest_count)?.to_le_bytes());
            self.fixed_elements(items, fixed)?;
            for item in items.iter().skip(fixed.len()) {
                self.node(item, rest)?;
            }
            Ok(())
        } else if items.len() > fixed.len() {
            Err(CodecError::TypeMismatch {
                expected: "tuple of declared length",
                found: "longer array",
            })
        } else {
            self.fixed_elements(items, fixed)
        }
    }

    fn fixed_elements(&mut self, items: &[Value], fixed: &[CompiledNode]) -> Result<()> {
        for (index, node) in fixed.iter().enumerate() {
            self.node(items.get(index).unwrap_or(&UNDEFINED), node)?;
        }
        Ok(())
    }

    fn object(&mut self, fields: &Object, layout: &ObjectLayout) -> Result<()> {
        for (name, node) in layout.fields() {
            self.node(fields.get(name).unwrap_or(&UNDEFINED), node)?;
        }
        Ok(())
    }

    fn union(&mut self, value: &Value, layout: &UnionLayout) -> Result<()> {
        let Value::Object(fields) = value else {
            return Err(mismatch("object", value));
        };
        let tag_value = fields.get(&layout.discriminator).unwrap_or(&UNDEFINED);

        let index = match layout.variants.iter().position(|(tag, _)| tag == tag_value) {
            Some(index) => index,
            None if self.config.strict_discriminators => {
                return Err(CodecError::UnmatchedDiscriminator {
                    discriminator: layout.discriminator.clone(),
                });
            }
            None => {
                tracing::warn!(
                    discriminator = %layout.discriminator,
                    value = ?tag_value,
                    "no union variant matches, encoding first variant"
                );
                0
            }
        };

        self.write_tag(index, layout.tag);
        // The discriminator is implied by the tag and not re-encoded.
        self.object(fields, &layout.variants[index].1)
    }

    fn literal(&mut self, value: &Value, table: &LiteralTable) -> Result<()> {
        let index = match table.values.iter().position(|v| v == value) {
            Some(index) => index,
            None if value.is_undefined() && table.includes_undefined => table.values.len(),
            None => return Err(mismatch("literal member", value)),
        };
        self.write_tag(index, table.tag);
        Ok(())
    }

    /// Write a tag index. The compiler sized `tag` for every reachable index.
    fn write_tag(&mut self, index: usize, tag: TagWidth) {
        match tag {
            TagWidth::None => {}
            TagWidth::U8 => self.arena.put(&[index as u8]),
            TagWidth::U16 => self.arena.put(&(index as u16).to_le_bytes()),
            TagWidth::PackedBit => self.bits.push(index == 0),
        }
    }
}
