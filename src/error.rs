//! Error types for packwire.

use thiserror::Error;

/// Main error type for schema compilation, encoding and decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed or unsupported schema reached the compiler or the engine.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Decode tried to read past the end of the input.
    #[error("Buffer underrun: need {needed} bytes at offset {offset}, {remaining} remaining")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Decode consumed more packed bits than the prefix carried.
    #[error("Bit stream exhausted at bit {index}")]
    BitUnderrun { index: usize },

    /// Decode reached a blob node with no blob left in the side channel.
    #[error("Missing blob at index {index}")]
    MissingBlob { index: usize },

    /// Union discriminator matched no declared variant (strict mode only).
    #[error("No union variant matches discriminator '{discriminator}'")]
    UnmatchedDiscriminator { discriminator: String },

    /// Value does not have the shape the schema expects.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Integer does not fit the declared width.
    #[error("Integer {value} out of range for {target}")]
    IntegerOutOfRange { value: i64, target: &'static str },

    /// Decoded tag index has no matching variant or literal.
    #[error("Invalid tag {index} for {count} entries")]
    InvalidTag { index: usize, count: usize },

    /// Decoded length prefix exceeds the configured ceiling.
    #[error("Length {length} exceeds maximum {max}")]
    LengthLimitExceeded { length: u32, max: u32 },

    /// Container or string too long for a u32 length prefix.
    #[error("Length {0} does not fit in a u32 prefix")]
    LengthOverflow(usize),

    /// Decoded string bytes are not UTF-8.
    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Error raised by a pluggable leaf codec.
    #[error("Leaf codec error: {0}")]
    Leaf(String),

    /// JSON schema interchange error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack schema encode error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack schema decode error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}

/// Result type alias using CodecError.
pub type Result<T> = std::result::Result<T, CodecError>;
