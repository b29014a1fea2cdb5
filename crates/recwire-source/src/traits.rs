use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, SourceError};

/// Largest single read issued by [`ReadSource`], whatever `max_bytes` asks for.
pub const MAX_READ_SIZE: usize = 64 * 1024;

/// A byte provider that delivers data in arbitrary-sized pieces.
///
/// `receive` blocks until at least one byte is available and returns at most
/// `max_bytes` of it. Once no further data will ever arrive it returns an
/// empty chunk, and keeps doing so on every later call. An empty chunk always
/// means end-of-source, so a request for zero bytes is treated as a request
/// for one.
pub trait ChunkSource {
    /// Receive up to `max_bytes` bytes.
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        (**self).receive(max_bytes)
    }
}

impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        (**self).receive(max_bytes)
    }
}

/// Adapts any blocking [`Read`] into a [`ChunkSource`].
///
/// A read of zero bytes is end-of-source. `Interrupted` reads are retried;
/// every other I/O error is surfaced unchanged.
///
/// Reads land in a scratch buffer that is reused across calls and never
/// grows past [`MAX_READ_SIZE`]. Each returned chunk is an exact-size copy,
/// so a buffered chunk never pins more memory than the bytes it holds.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
    scratch: Vec<u8>,
}

impl<R: Read> ReadSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
        }
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the source and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChunkSource for ReadSource<R> {
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        let want = max_bytes.clamp(1, MAX_READ_SIZE);
        if self.scratch.len() < want {
            self.scratch.resize(want, 0);
        }

        loop {
            match self.inner.read(&mut self.scratch[..want]) {
                Ok(n) => {
                    trace!(received = n, "read chunk");
                    return Ok(Bytes::copy_from_slice(&self.scratch[..n]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
    }
}

/// In-memory source that replays a fixed sequence of chunks.
///
/// A queued chunk larger than the requested size is split: the caller gets
/// the first `max_bytes` and the rest stays at the head of the queue. Once
/// drained it reports end-of-source.
#[derive(Debug, Clone, Default)]
pub struct ChunkQueue {
    chunks: VecDeque<Bytes>,
}

impl ChunkQueue {
    /// An empty queue, which is immediately at end-of-source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the given chunks in order. Empty chunks are skipped, since an
    /// empty receive means end-of-source.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let mut queue = Self::new();
        for chunk in chunks {
            queue.push(chunk);
        }
        queue
    }

    /// Split `data` into chunks of `chunk_size` bytes (the last may be shorter).
    pub fn split(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        let mut data = data.into();
        let chunk_size = chunk_size.max(1);
        let mut queue = Self::new();
        while !data.is_empty() {
            let at = chunk_size.min(data.len());
            queue.push(data.split_to(at));
        }
        queue
    }

    /// Append one chunk to the back of the queue.
    pub fn push(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        if !chunk.is_empty() {
            self.chunks.push_back(chunk);
        }
    }

    /// Number of chunks still queued.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes still queued.
    pub fn remaining(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    /// Returns true once every chunk has been handed out.
    pub fn is_drained(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkSource for ChunkQueue {
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        let max_bytes = max_bytes.max(1);
        let Some(head) = self.chunks.front_mut() else {
            return Ok(Bytes::new());
        };

        if head.len() > max_bytes {
            return Ok(head.split_to(max_bytes));
        }

        Ok(self.chunks.pop_front().unwrap_or_default())
    }
}
