//! Blob side channel.
//!
//! Blob values are never byte-encoded. The encoder appends them to a list in
//! traversal order and the decoder pops them back by position.

use crate::error::{CodecError, Result};
use crate::value::Blob;

/// Ordered blob accumulator for one encode call.
#[derive(Debug, Default)]
pub struct BlobChannel {
    blobs: Vec<Blob>,
}

impl BlobChannel {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, blob: Blob) {
        self.blobs.push(blob);
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn into_vec(self) -> Vec<Blob> {
        self.blobs
    }
}

/// Positional cursor over the blobs supplied to a decode call.
pub struct BlobReader<'a> {
    blobs: &'a [Blob],
    index: usize,
}

impl<'a> BlobReader<'a> {
    pub fn new(blobs: &'a [Blob]) -> Self {
        Self { blobs, index: 0 }
    }

    /// Take the next blob, failing with `MissingBlob` once the list is exhausted.
    pub fn next_blob(&mut self) -> Result<Blob> {
        let blob = self
            .blobs
            .get(self.index)
            .cloned()
            .ok_or(CodecError::MissingBlob { index: self.index })?;
        self.index += 1;
        Ok(blob)
    }

    pub fn consumed(&self) -> usize {
        self.index
    }
}
