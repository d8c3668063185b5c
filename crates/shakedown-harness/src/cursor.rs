//! Fuzz input consumption.
//!
//! An input is a native-endian `i32` selector followed by payload bytes that
//! are handed out left to right as the scheduler injects them.

/// Width of the leading selector in bytes.
pub const SELECTOR_WIDTH: usize = std::mem::size_of::<i32>();

/// Read position over one fuzz input.
#[derive(Debug, Clone)]
pub struct InputCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> InputCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decodes the next [`SELECTOR_WIDTH`] bytes as a native-endian `i32`
    /// and moves past them. Returns `None` if fewer bytes remain.
    pub fn read_selector(&mut self) -> Option<i32> {
        let bytes: [u8; SELECTOR_WIDTH] = self
            .remaining()
            .get(..SELECTOR_WIDTH)?
            .try_into()
            .ok()?;
        self.pos += SELECTOR_WIDTH;
        Some(i32::from_ne_bytes(bytes))
    }

    /// Unconsumed payload.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Marks `n` bytes as consumed, clamped to what is left.
    pub fn advance(&mut self, n: usize) {
        self.pos += n.min(self.remaining_len());
    }

    /// Bytes consumed so far, selector included.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}
