//! Growable byte arena for the encoder.
//!
//! Uses `bytes::BytesMut` as the backing region. Space is reserved with a
//! bump cursor; writes land at offsets handed out by [`BufferArena::allocate`].
//! When the cursor passes the end of the region, the region is replaced by one
//! sized to the next power of two and the old bytes are copied over. Offsets
//! already handed out stay valid, which is what lets containers patch their
//! length placeholder after walking their elements.
//!
//! # Example
//!
//! ```
//! use packwire::protocol::BufferArena;
//!
//! let mut arena = BufferArena::with_capacity(4);
//! let len_at = arena.allocate(4);
//! let body_at = arena.allocate(3);
//! arena.write_at(body_at, b"abc");
//! arena.write_at(len_at, &3u32.to_le_bytes());
//!
//! assert_eq!(&arena.finish(&[])[..], &[3, 0, 0, 0, b'a', b'b', b'c']);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Default initial arena size.
pub const DEFAULT_ARENA_CAPACITY: usize = 256;

/// Ceiling on the initial arena size. Larger buffers come from growth.
pub const MAX_INITIAL_ARENA_CAPACITY: usize = 1024 * 1024;

/// Bump-allocated byte region with power-of-two growth.
pub struct BufferArena {
    /// Backing region, always fully initialized (`len == capacity`).
    region: BytesMut,
    /// Bytes reserved so far.
    offset: usize,
    /// Number of times the region was replaced.
    reallocations: usize,
}

impl BufferArena {
    /// Create an arena with the default capacity (256 bytes).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }

    /// Create an arena whose capacity is `capacity` rounded up to a power of two,
    /// clamped to `1..=MAX_INITIAL_ARENA_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_INITIAL_ARENA_CAPACITY).next_power_of_two();
        Self {
            region: BytesMut::zeroed(capacity),
            offset: 0,
            reallocations: 0,
        }
    }

    /// Reserve `size` bytes and return the offset where they start.
    ///
    /// The caller writes into `[offset, offset + size)` afterwards.
    pub fn allocate(&mut self, size: usize) -> usize {
        let current = self.offset;
        self.offset += size;

        if self.offset > self.region.len() {
            self.grow();
        }

        current
    }

    fn grow(&mut self) {
        let new_size = self.offset.next_power_of_two();
        let mut region = BytesMut::zeroed(new_size);
        region[..self.region.len()].copy_from_slice(&self.region);

        tracing::trace!(
            from = self.region.len(),
            to = new_size,
            "arena reallocated"
        );

        self.region = region;
        self.reallocations += 1;
    }

    /// Write `bytes` at a previously allocated offset.
    ///
    /// # Panics
    ///
    /// Panics if the range was never allocated.
    #[inline]
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        debug_assert!(offset + bytes.len() <= self.offset);
        self.region[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Allocate and write in one step.
    #[inline]
    pub fn put(&mut self, bytes: &[u8]) {
        let at = self.allocate(bytes.len());
        self.write_at(at, bytes);
    }

    /// Bytes reserved so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Current region size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Written content so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.region[..self.offset]
    }

    /// Produce the final buffer: `prefix` followed by the content, trimmed to length.
    pub fn finish(self, prefix: &[u8]) -> Bytes {
        let mut out = BytesMut::with_capacity(prefix.len() + self.offset);
        out.put_slice(prefix);
        out.put_slice(&self.region[..self.offset]);
        out.freeze()
    }
}

impl Default for BufferArena {
    fn default() -> Self {
        Self::new()
    }
}
