//! Packed bit channel and the packing prefix layout.
//!
//! Bits pushed inside a Packed scope are collected in traversal order and
//! flushed into a prefix that precedes the main buffer:
//! ```text
//! ┌─────────────────────────────┬─────────────────────────────────┐
//! │ Guaranteed region           │ Variable region (optional)      │
//! │ N bytes, 8 bits/byte, LSB=0 │ 7 bits/byte in bits 1-7,        │
//! │                             │ bit 0 = 1 if another byte follows│
//! └─────────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! The guaranteed region size comes from the compiled schema. The variable
//! region is present only when the schema has packing below a runtime-sized
//! construct, and always holds at least one byte so it stays self-delimiting.

use crate::error::{CodecError, Result};

use super::wire_format::ByteReader;

/// Payload bits per guaranteed byte.
pub const GUARANTEED_BITS_PER_BYTE: usize = 8;

/// Payload bits per variable byte.
pub const VARIABLE_BITS_PER_BYTE: usize = 7;

/// Continuation flag of a variable byte.
pub const CONTINUATION_BIT: u8 = 0b0000_0001;

/// Ordered packed bits accumulated by the encoder.
#[derive(Debug, Default)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate for the statically known bit count.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Flush the bits into the prefix layout.
    ///
    /// Bits past the guaranteed region go to the variable region when
    /// `variable` is set. Without a variable region they have nowhere to go
    /// and the flush fails.
    pub fn to_prefix(&self, guaranteed_bytes: usize, variable: bool) -> Result<Vec<u8>> {
        let guaranteed_bits = guaranteed_bytes * GUARANTEED_BITS_PER_BYTE;
        if !variable && self.bits.len() > guaranteed_bits {
            return Err(CodecError::Leaf(format!(
                "{} packed bits pushed but the prefix holds {}",
                self.bits.len(),
                guaranteed_bits
            )));
        }

        let mut prefix = Vec::with_capacity(guaranteed_bytes + 1);

        for chunk_start in (0..guaranteed_bits).step_by(GUARANTEED_BITS_PER_BYTE) {
            prefix.push(pack_byte(&self.bits, chunk_start, 0, GUARANTEED_BITS_PER_BYTE));
        }

        if variable {
            let overflow = self.bits.get(guaranteed_bits..).unwrap_or(&[]);
            prefix.extend(encode_variable(overflow));
        }

        Ok(prefix)
    }
}

/// Pack `count` bits starting at `start` into one byte, from bit `shift` upward.
fn pack_byte(bits: &[bool], start: usize, shift: usize, count: usize) -> u8 {
    let mut byte = 0u8;
    for i in 0..count {
        if bits.get(start + i).copied().unwrap_or(false) {
            byte |= 1 << (i + shift);
        }
    }
    byte
}

/// Continuation-code a bit sequence. Always yields at least one byte.
pub fn encode_variable(bits: &[bool]) -> Vec<u8> {
    let count = bits.len().div_ceil(VARIABLE_BITS_PER_BYTE).max(1);
    let mut out = Vec::with_capacity(count);

    for index in 0..count {
        let mut byte = pack_byte(bits, index * VARIABLE_BITS_PER_BYTE, 1, VARIABLE_BITS_PER_BYTE);
        if index != count - 1 {
            byte |= CONTINUATION_BIT;
        }
        out.push(byte);
    }

    out
}

/// Read a continuation-coded region, appending its payload bits to `bits`.
///
/// Stops after the first byte whose continuation bit is clear.
pub fn decode_variable(reader: &mut ByteReader<'_>, bits: &mut Vec<bool>) -> Result<()> {
    loop {
        let byte = reader.read_u8()?;
        for bit in 1..=VARIABLE_BITS_PER_BYTE {
            bits.push((byte >> bit) & 1 == 1);
        }
        if byte & CONTINUATION_BIT == 0 {
            return Ok(());
        }
    }
}

/// Packed bits parsed from the prefix, consumed in order by the decoder.
#[derive(Debug, Default)]
pub struct BitReader {
    bits: Vec<bool>,
    cursor: usize,
}

impl BitReader {
    /// An empty reader for schemas without packing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits, cursor: 0 }
    }

    /// Parse the packing prefix from the front of the input.
    pub fn read_prefix(
        reader: &mut ByteReader<'_>,
        guaranteed_bytes: usize,
        variable: bool,
    ) -> Result<Self> {
        let mut bits = Vec::with_capacity(guaranteed_bytes * GUARANTEED_BITS_PER_BYTE);

        for _ in 0..guaranteed_bytes {
            let byte = reader.read_u8()?;
            for bit in 0..GUARANTEED_BITS_PER_BYTE {
                bits.push((byte >> bit) & 1 == 1);
            }
        }

        if variable {
            decode_variable(reader, &mut bits)?;
        }

        tracing::trace!(
            bits = bits.len(),
            prefix_bytes = reader.offset(),
            "packing prefix parsed"
        );

        Ok(Self::from_bits(bits))
    }

    /// Consume the next packed bit.
    pub fn next_bit(&mut self) -> Result<bool> {
        let bit = self
            .bits
            .get(self.cursor)
            .copied()
            .ok_or(CodecError::BitUnderrun { index: self.cursor })?;
        self.cursor += 1;
        Ok(bit)
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Total bits available, padding included.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer_with(bits: &[bool]) -> BitWriter {
        let mut writer = BitWriter::new();
        for &bit in bits {
            writer.push(bit);
        }
        writer
    }

    #[test]
    fn test_guaranteed_byte_lsb_first() {
        let writer = writer_with(&[true, false]);
        assert_eq!(writer.to_prefix(1, false).unwrap(), vec![0b0000_0001]);

        let writer = writer_with(&[false, true, true, false, false, false, false, true, true]);
        assert_eq!(writer.to_prefix(2, false).unwrap(), vec![0b1000_0110, 0b0000_0001]);
    }

    #[test]
    fn test_excess_bits_without_variable_region() {
        let writer = writer_with(&[true; 9]);
        let err = writer.to_prefix(1, false).unwrap_err();
        assert!(matches!(err, CodecError::Leaf(_)));

        // the same bits fit once a variable region exists
        assert_eq!(writer.to_prefix(1, true).unwrap(), vec![0xFF, 0b0000_0010]);
    }

    #[test]
    fn test_variable_region_always_present() {
        assert_eq!(encode_variable(&[]), vec![0]);

        let writer = writer_with(&[true; 8]);
        // 8 guaranteed bits, empty overflow still emits a terminator byte
        assert_eq!(writer.to_prefix(1, true).unwrap(), vec![0xFF, 0x00]);
    }

    #[test]
    fn test_variable_continuation_bits() {
        let bits = [true; 9];
        let encoded = encode_variable(&bits);
        assert_eq!(encoded.len(), 2);
        // first byte: 7 payload bits + continuation
        assert_eq!(encoded[0], 0xFF);
        // second byte: 2 payload bits in bits 1-2, no continuation
        assert_eq!(encoded[1], 0b0000_0110);
    }

    #[test]
    fn test_variable_region_self_delimiting() {
        for len in (1..60).filter(|l| l % 7 != 0) {
            let bits: Vec<bool> = (0..len).map(|i| (i * 5 + 1) % 3 == 0).collect();
            let mut encoded = encode_variable(&bits);
            let region_len = encoded.len();
            // trailing content must not be consumed
            encoded.extend_from_slice(&[0xAA, 0xBB]);

            let mut reader = ByteReader::new(&encoded);
            let mut decoded = Vec::new();
            decode_variable(&mut reader, &mut decoded).unwrap();

            assert_eq!(reader.offset(), region_len);
            assert_eq!(decoded.len(), region_len * VARIABLE_BITS_PER_BYTE);
            assert_eq!(&decoded[..len], &bits[..]);
            assert!(decoded[len..].iter().all(|b| !b));
        }
    }

    #[test]
    fn test_prefix_round_trip_with_overflow() {
        let bits: Vec<bool> = (0..20).map(|i| i % 3 == 0).collect();
        let prefix = writer_with(&bits).to_prefix(1, true).unwrap();
        // 1 guaranteed + ceil(12 / 7) variable
        assert_eq!(prefix.len(), 3);

        let mut reader = ByteReader::new(&prefix);
        let mut bit_reader = BitReader::read_prefix(&mut reader, 1, true).unwrap();
        for &expected in &bits {
            assert_eq!(bit_reader.next_bit().unwrap(), expected);
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_bit_underrun() {
        let mut reader = BitReader::from_bits(vec![true]);
        assert!(reader.next_bit().unwrap());
        let err = reader.next_bit().unwrap_err();
        assert!(matches!(err, CodecError::BitUnderrun { index: 1 }));
    }

    #[test]
    fn test_truncated_variable_region() {
        // continuation set but no following byte
        let bytes = [0x01];
        let mut reader = ByteReader::new(&bytes);
        let mut bits = Vec::new();
        assert!(decode_variable(&mut reader, &mut bits).is_err());
    }
}
