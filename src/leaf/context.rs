//! Contexts handed to leaf codecs.
//!
//! [`LeafWriter`] and [`LeafReader`] expose the encoder's arena and the
//! decoder's cursor without giving codecs access to the rest of the state.
//! Numeric writes are little-endian, matching the built-in kinds.

use crate::error::{CodecError, Result};
use crate::protocol::{BitReader, BitWriter, BufferArena, ByteReader};

fn outside_packed_scope() -> CodecError {
    CodecError::Leaf("packed bit used outside a packed scope".to_string())
}

/// Write side of a leaf codec call.
pub struct LeafWriter<'a> {
    arena: &'a mut BufferArena,
    bits: &'a mut BitWriter,
    packing: bool,
}

impl<'a> LeafWriter<'a> {
    pub(crate) fn new(arena: &'a mut BufferArena, bits: &'a mut BitWriter, packing: bool) -> Self {
        Self {
            arena,
            bits,
            packing,
        }
    }

    /// True inside a Packed scope.
    #[inline]
    pub fn is_packing(&self) -> bool {
        self.packing
    }

    /// Push one packed bit. Fails outside a Packed scope.
    #[inline]
    pub fn push_bit(&mut self, bit: bool) -> Result<()> {
        if !self.packing {
            return Err(outside_packed_scope());
        }
        self.bits.push(bit);
        Ok(())
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.arena.put(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.arena.put(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.arena.put(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.arena.put(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.arena.put(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.arena.put(&value.to_le_bytes());
    }
}

/// Read side of a leaf codec call.
pub struct LeafReader<'a, 'de> {
    input: &'a mut ByteReader<'de>,
    bits: &'a mut BitReader,
    packing: bool,
}

impl<'a, 'de> LeafReader<'a, 'de> {
    pub(crate) fn new(input: &'a mut ByteReader<'de>, bits: &'a mut BitReader, packing: bool) -> Self {
        Self {
            input,
            bits,
            packing,
        }
    }

    #[inline]
    pub fn is_packing(&self) -> bool {
        self.packing
    }

    /// Consume the next packed bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if !self.packing {
            return Err(outside_packed_scope());
        }
        self.bits.next_bit()
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'de [u8]> {
        self.input.take(len)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.input.read_u8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.input.read_u16()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.input.read_u32()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.input.read_f32()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.input.read_f64()
    }
}
