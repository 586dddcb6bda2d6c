//! Wire format reading.
//!
//! All multi-byte numeric fields are little-endian with no alignment padding:
//! ```text
//! ┌──────────────┬────────────────────────┐
//! │ Length prefix│ Payload                │
//! │ u32 LE       │ raw bytes / elements   │
//! └──────────────┴────────────────────────┘
//! ```
//!
//! [`ByteReader`] is a bounds-checked cursor over the decoder input. Every read
//! fails with [`CodecError::BufferUnderrun`] instead of panicking.

use bytes::Buf;

use crate::error::{CodecError, Result};

/// Size of a container or string length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default ceiling for decoded lengths (16 Mi entries).
pub const DEFAULT_MAX_LENGTH: u32 = 16 * 1024 * 1024;

/// Bounds-checked little-endian cursor over an input slice.
pub struct ByteReader<'de> {
    input: &'de [u8],
    total: usize,
}

impl<'de> ByteReader<'de> {
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            total: input.len(),
        }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.total - self.input.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        if self.input.len() < needed {
            return Err(CodecError::BufferUnderrun {
                offset: self.offset(),
                needed,
                remaining: self.input.len(),
            });
        }
        Ok(())
    }

    /// Consume `len` raw bytes.
    pub fn take(&mut self, len: usize) -> Result<&'de [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.input.split_at(len);
        self.input = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.input.get_u8())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.input.get_i8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.input.get_u16_le())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.input.get_i16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.input.get_u32_le())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.input.get_i32_le())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.input.get_f32_le())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.input.get_f64_le())
    }

    /// Read a u32 length prefix and check it against `max`.
    pub fn read_length(&mut self, max: u32) -> Result<usize> {
        let length = self.read_u32()?;
        if length > max {
            return Err(CodecError::LengthLimitExceeded { length, max });
        }
        Ok(length as usize)
    }
}

/// Convert a runtime length to a u32 prefix.
#[inline]
pub fn length_prefix(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0302);
        assert_eq!(reader.read_u32().unwrap(), 0x0706_0504);
        assert_eq!(reader.offset(), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_signed_and_float_reads() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-2i8).to_le_bytes());
        bytes.extend_from_slice(&(-300i16).to_le_bytes());
        bytes.extend_from_slice(&(-70000i32).to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-0.25f64).to_le_bytes());

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_i8().unwrap(), -2);
        assert_eq!(reader.read_i16().unwrap(), -300);
        assert_eq!(reader.read_i32().unwrap(), -70000);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_f64().unwrap(), -0.25);
    }

    #[test]
    fn test_underrun_reports_position() {
        let bytes = [1, 2, 3];
        let mut reader = ByteReader::new(&bytes);
        reader.read_u8().unwrap();

        let err = reader.read_u32().unwrap_err();
        match err {
            CodecError::BufferUnderrun {
                offset,
                needed,
                remaining,
            } => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Failed read consumes nothing
        assert_eq!(reader.offset(), 1);
    }

    #[test]
    fn test_take() {
        let bytes = b"hello world";
        let mut reader = ByteReader::new(bytes);
        assert_eq!(reader.take(5).unwrap(), b"hello");
        assert!(reader.take(10).is_err());
        assert_eq!(reader.take(6).unwrap(), b" world");
    }

    #[test]
    fn test_length_limit() {
        let bytes = 1000u32.to_le_bytes();
        let mut reader = ByteReader::new(&bytes);
        let err = reader.read_length(100).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_length_prefix_overflow() {
        assert_eq!(length_prefix(3).unwrap(), 3);
        #[cfg(target_pointer_width = "64")]
        assert!(length_prefix(u32::MAX as usize + 1).is_err());
    }
}
