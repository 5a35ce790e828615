/// Growable read buffer for the request decoder.
///
/// `inner[..len]` holds bytes that were read but not consumed yet, the rest of
/// `inner` is scratch space for the next read.
#[derive(Debug)]
pub struct DecodeBuffer {
    inner: Vec<u8>,
    len: usize,
}

impl DecodeBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: vec![0; capacity.max(1)],
            len: 0,
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.inner[..self.len]
    }

    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.inner[self.len..]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.inner.len()
    }

    /// Marks `n` more bytes of the spare region as filled.
    pub fn fill(&mut self, n: usize) {
        debug_assert!(n <= self.inner.len() - self.len, "fill past capacity");
        self.len = (self.len + n).min(self.inner.len());
    }

    /// Drops the first `n` bytes and moves the unconsumed tail to the front.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len, "ask to consume more than have");
        let n = n.min(self.len);
        if n == 0 {
            return;
        }
        self.inner.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// Doubles the capacity without going past `limit`.
    ///
    /// Returns `false` when the buffer is already at `limit`.
    pub fn grow(&mut self, limit: usize) -> bool {
        let capacity = self.inner.len();
        if capacity >= limit {
            return false;
        }
        let new_capacity = capacity.saturating_mul(2).min(limit);
        self.inner.resize(new_capacity, 0);
        true
    }
}
