use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use crate::error::BufferError;

/// Appends are merged into the tail segment while the result stays this small.
const COALESCE_LIMIT: usize = 64;

/// Ordered byte container with cheap pushes at both ends and atomic
/// removal from the front.
///
/// Bytes are held as a deque of [`Bytes`] segments, so appending a received
/// chunk or restoring a rolled-back prefix copies at most a few dozen bytes,
/// and cloning only bumps segment reference counts.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    segments: VecDeque<Bytes>,
    len: usize,
}

impl ByteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add bytes at the back.
    ///
    /// Tiny chunks, as a slow source delivers them, are copied into the tail
    /// segment instead of each becoming a segment of their own.
    pub fn append(&mut self, bytes: impl Into<Bytes>) {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return;
        }
        self.len += bytes.len();

        if let Some(tail) = self.segments.back_mut() {
            if tail.len() + bytes.len() <= COALESCE_LIMIT {
                let mut merged = BytesMut::with_capacity(tail.len() + bytes.len());
                merged.extend_from_slice(tail);
                merged.extend_from_slice(&bytes);
                *tail = merged.freeze();
                return;
            }
        }
        self.segments.push_back(bytes);
    }

    /// Add bytes at the front, keeping their order.
    pub fn prepend(&mut self, bytes: impl Into<Bytes>) {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return;
        }
        self.len += bytes.len();
        self.segments.push_front(bytes);
    }

    /// Put back bytes reported by a failed decode attempt.
    pub fn restore(&mut self, popped: Bytes) {
        self.prepend(popped);
    }

    /// Remove and return exactly the first `n` bytes.
    ///
    /// Fails without touching the buffer if fewer than `n` bytes are present.
    pub fn take_front(&mut self, n: usize) -> Result<Bytes, BufferError> {
        if n > self.len {
            return Err(BufferError::InsufficientData {
                requested: n,
                available: self.len,
            });
        }
        if n == 0 {
            return Ok(Bytes::new());
        }

        self.len -= n;

        if let Some(front) = self.segments.front_mut() {
            if front.len() > n {
                return Ok(front.split_to(n));
            }
            if front.len() == n {
                return Ok(self.segments.pop_front().unwrap_or_default());
            }
        }

        // The range spans segments.
        let mut out = BytesMut::with_capacity(n);
        while out.len() < n {
            let want = n - out.len();
            let Some(front) = self.segments.front_mut() else {
                break;
            };
            if front.len() <= want {
                out.extend_from_slice(front);
                self.segments.pop_front();
            } else {
                out.extend_from_slice(&front.split_to(want));
            }
        }
        Ok(out.freeze())
    }

    /// Remove and return the first byte.
    pub fn take_one(&mut self) -> Result<u8, BufferError> {
        let byte = self.take_front(1)?;
        Ok(byte[0])
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.len = 0;
    }

    /// Copy of the buffered bytes, front to back.
    pub fn to_bytes(&self) -> Bytes {
        if self.segments.len() == 1 {
            if let Some(only) = self.segments.front() {
                return only.clone();
            }
        }
        let mut out = BytesMut::with_capacity(self.len);
        for segment in &self.segments {
            out.extend_from_slice(segment);
        }
        out.freeze()
    }
}

impl PartialEq for ByteBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_bytes() == other.to_bytes()
    }
}

impl Eq for ByteBuffer {}

impl From<Bytes> for ByteBuffer {
    fn from(bytes: Bytes) -> Self {
        let mut buf = Self::new();
        buf.append(bytes);
        buf
    }
}

impl From<BytesMut> for ByteBuffer {
    fn from(bytes: BytesMut) -> Self {
        Self::from(bytes.freeze())
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for ByteBuffer {
    fn from(bytes: &[u8; N]) -> Self {
        Self::from(&bytes[..])
    }
}
