//! Owned text backlog with a consumed-offset cursor.

/// Below this many consumed bytes the buffer is never compacted.
const COMPACT_THRESHOLD: usize = 4 * 1024;

/// Decoded text received from the source but not yet emitted as lines.
///
/// Consuming a line only advances the cursor; the consumed prefix is dropped
/// once it is both large and at least half of the buffer.
#[derive(Debug, Default)]
pub struct Backlog {
    buf: String,
    start: usize,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconsumed text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf[self.start..]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.buf.len()
    }

    /// Length of the unconsumed text in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Buffer to append decoded text to. Only appending is allowed.
    #[inline]
    pub fn tail_mut(&mut self) -> &mut String {
        &mut self.buf
    }

    /// Drop `len` bytes from the front of the unconsumed text.
    ///
    /// `len` must fall on a character boundary of [`as_str`](Self::as_str).
    pub fn consume(&mut self, len: usize) {
        debug_assert!(self.as_str().is_char_boundary(len));
        self.start = (self.start + len).min(self.buf.len());
        if self.start == self.buf.len() {
            self.clear();
        } else if self.start >= COMPACT_THRESHOLD && self.start * 2 >= self.buf.len() {
            self.buf.drain(..self.start);
            self.start = 0;
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
    }
}
