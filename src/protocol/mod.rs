//! Protocol module - byte-level primitives shared by encoder and decoder.
//!
//! This module implements the layers below the schema walk:
//! - Growable arena the encoder writes into
//! - Bounds-checked little-endian reader for the decoder
//! - Packed bit channel with the guaranteed/variable prefix layout
//! - Blob side channel

mod arena;
mod bitstream;
mod blob;
mod wire_format;

pub use arena::{BufferArena, DEFAULT_ARENA_CAPACITY, MAX_INITIAL_ARENA_CAPACITY};
pub use bitstream::{
    decode_variable, encode_variable, BitReader, BitWriter, CONTINUATION_BIT,
    GUARANTEED_BITS_PER_BYTE, VARIABLE_BITS_PER_BYTE,
};
pub use blob::{BlobChannel, BlobReader};
pub use wire_format::{length_prefix, ByteReader, DEFAULT_MAX_LENGTH, LENGTH_PREFIX_SIZE};
