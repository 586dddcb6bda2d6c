//! Bytes + bits + blobs → value walker.
//!
//! Mirrors the encoder: the packing prefix is parsed first, then the schema is
//! walked in the same order, consuming bits and bytes exactly where the
//! encoder produced them.

use super::CodecConfig;
use crate::error::{CodecError, Result};
use crate::leaf::LeafReader;
use crate::protocol::{BitReader, BlobReader, ByteReader};
use crate::schema::{
    CompiledNode, CompiledSchema, FloatWidth, IntWidth, LiteralTable, ObjectLayout, TagWidth,
    UnionLayout,
};
use crate::value::{Blob, Object, Value};

/// Single-use decoder bound to a compiled schema and one input.
pub struct Decoder<'s, 'de> {
    schema: &'s CompiledSchema,
    config: &'s CodecConfig,
    input: ByteReader<'de>,
    bits: BitReader,
    blobs: BlobReader<'de>,
    packing: bool,
}

impl<'s, 'de> Decoder<'s, 'de> {
    pub fn new(
        schema: &'s CompiledSchema,
        config: &'s CodecConfig,
        bytes: &'de [u8],
        blobs: &'de [Blob],
    ) -> Self {
        Self {
            schema,
            config,
            input: ByteReader::new(bytes),
            bits: BitReader::empty(),
            blobs: BlobReader::new(blobs),
            packing: false,
        }
    }

    /// Decode one value and consume the decoder.
    pub fn decode(mut self) -> Result<Value> {
        let schema = self.schema;
        let packing = schema.packing();

        if packing.has_packing {
            self.bits = BitReader::read_prefix(
                &mut self.input,
                packing.minimum_guaranteed_bytes(),
                packing.has_variable_arity_packing,
            )?;
        }

        let value = self.node(schema.root())?;

        if self.input.remaining() > 0 {
            tracing::trace!(
                trailing = self.input.remaining(),
                "decode finished before end of input"
            );
        }

        Ok(value)
    }

    fn node(&mut self, node: &CompiledNode) -> Result<Value> {
        match node {
            CompiledNode::Int { width, signed } => self.int(*width, *signed).map(Value::Int),
            CompiledNode::Float { width } => {
                let float = match width {
                    FloatWidth::W32 => f64::from(self.input.read_f32()?),
                    FloatWidth::W64 => self.input.read_f64()?,
                };
                Ok(Value::Float(float))
            }
            CompiledNode::Bool => self.flag().map(Value::Bool),
            CompiledNode::String => {
                let len = self.input.read_length(self.config.max_length)?;
                let bytes = self.input.take(len)?;
                Ok(Value::String(String::from_utf8(bytes.to_vec())?))
            }
            CompiledNode::Array(element) => self.sequence(element).map(Value::Array),
            CompiledNode::Set(element) => self.sequence(element).map(Value::Set),
            CompiledNode::Map(key_node, value_node) => {
                let len = self.input.read_length(self.config.max_length)?;
                let mut entries = Vec::with_capacity(self.capacity_hint(len));
                for _ in 0..len {
                    let key = self.node(key_node)?;
                    let entry = self.node(value_node)?;
                    entries.push((key, entry));
                }
                Ok(Value::Map(entries))
            }
            CompiledNode::Tuple { fixed, rest } => self.tuple(fixed, rest.as_deref()),
            CompiledNode::Object(layout) => self.object(layout).map(Value::Object),
            CompiledNode::Optional(inner) => {
                if self.flag()? {
                    self.node(inner)
                } else {
                    Ok(Value::Undefined)
                }
            }
            CompiledNode::Union(layout) => self.union(layout),
            CompiledNode::MixedUnion { primitive, object } => match self.input.read_u8()? {
                0 => self.node(primitive),
                1 => self.node(object),
                other => Err(CodecError::InvalidTag {
                    index: usize::from(other),
                    count: 2,
                }),
            },
            CompiledNode::Literal(table) => self.literal(table),
            CompiledNode::Packed(inner) => {
                let was_packing = self.packing;
                self.packing = true;
                let result = self.node(inner);
                self.packing = was_packing;
                result
            }
            CompiledNode::Blob => self.blobs.next_blob().map(Value::Blob),
            CompiledNode::Leaf(codec) => {
                let mut input = LeafReader::new(&mut self.input, &mut self.bits, self.packing);
                codec.decode(&mut input)
            }
        }
    }

    /// Boolean-valued field: a packed bit or a 0/1 byte.
    #[inline]
    fn flag(&mut self) -> Result<bool> {
        if self.packing {
            self.bits.next_bit()
        } else {
            Ok(self.input.read_u8()? == 1)
        }
    }

    fn int(&mut self, width: IntWidth, signed: bool) -> Result<i64> {
        let int = match (width, signed) {
            (IntWidth::W8, false) => i64::from(self.input.read_u8()?),
            (IntWidth::W8, true) => i64::from(self.input.read_i8()?),
            (IntWidth::W16, false) => i64::from(self.input.read_u16()?),
            (IntWidth::W16, true) => i64::from(self.input.read_i16()?),
            (IntWidth::W32, false) => i64::from(self.input.read_u32()?),
            (IntWidth::W32, true) => i64::from(self.input.read_i32()?),
        };
        Ok(int)
    }

    /// Bound preallocation by what the remaining input could hold.
    #[inline]
    fn capacity_hint(&self, len: usize) -> usize {
        len.min(self.input.remaining())
    }

    fn sequence(&mut self, element: &CompiledNode) -> Result<Vec<Value>> {
        let len = self.input.read_length(self.config.max_length)?;
        let mut items = Vec::with_capacity(self.capacity_hint(len));
        for _ in 0..len {
            items.push(self.node(element)?);
        }
        Ok(items)
    }

    fn tuple(&mut self, fixed: &[CompiledNode], rest: Option<&CompiledNode>) -> Result<Value> {
        let rest_len = match rest {
            Some(_) => self.input.read_length(self.config.max_length)?,
            None => 0,
        };

        let mut items = Vec::with_capacity(fixed.len() + self.capacity_hint(rest_len));
        for node in fixed {
            items.push(self.node(node)?);
        }
        if let Some(rest) = rest {
            for _ in 0..rest_len {
                items.push(self.node(rest)?);
            }
        }

        Ok(Value::Array(items))
    }

    fn object(&mut self, layout: &ObjectLayout) -> Result<Object> {
        let mut object = layout.instantiate();
        for (name, node) in layout.fields() {
            let value = self.node(node)?;
            if let Some(slot) = object.get_mut(name) {
                *slot = value;
            }
        }
        Ok(object)
    }

    fn union(&mut self, layout: &UnionLayout) -> Result<Value> {
        let index = self.read_tag(layout.tag)?;
        let (tag, variant) = layout.variants.get(index).ok_or(CodecError::InvalidTag {
            index,
            count: layout.variants.len(),
        })?;

        let mut object = self.object(variant)?;
        object.insert(layout.discriminator.clone(), tag.clone());
        Ok(Value::Object(object))
    }

    fn literal(&mut self, table: &LiteralTable) -> Result<Value> {
        let index = self.read_tag(table.tag)?;
        match table.values.get(index) {
            Some(value) => Ok(value.clone()),
            None if table.includes_undefined => Ok(Value::Undefined),
            None => Err(CodecError::InvalidTag {
                index,
                count: table.values.len(),
            }),
        }
    }

    fn read_tag(&mut self, tag: TagWidth) -> Result<usize> {
        let index = match tag {
            TagWidth::None => 0,
            TagWidth::U8 => usize::from(self.input.read_u8()?),
            TagWidth::U16 => usize::from(self.input.read_u16()?),
            TagWidth::PackedBit => usize::from(!self.bits.next_bit()?),
        };
        Ok(index)
    }
}
