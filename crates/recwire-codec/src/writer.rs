use std::io::{self, ErrorKind, Write};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tracing::trace;

use crate::error::{CodecError, Result};
use crate::record::{encode_record, Record};
use crate::registry::CodecRegistry;
use crate::schema::Schema;
use crate::value::Value;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
/// Pause before retrying a non-blocking stream that is not ready.
const WOULD_BLOCK_BACKOFF: Duration = Duration::from_millis(1);

/// Writes complete records to any `Write` stream.
///
/// Each record is encoded in full before any byte reaches the stream, so an
/// encode failure never leaves a partial record behind.
pub struct RecordWriter<W> {
    inner: W,
    registry: Arc<CodecRegistry>,
    buf: BytesMut,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, registry: Arc<CodecRegistry>) -> Self {
        Self {
            inner,
            registry,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode `values` laid out as `schema` and write them (blocking).
    pub fn write_values(&mut self, schema: &Schema, values: &[Value]) -> Result<()> {
        self.buf.clear();
        encode_record(&self.registry, schema, values, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => {
                    return Err(CodecError::Io(io::Error::new(
                        ErrorKind::WriteZero,
                        "stream accepted no bytes",
                    )))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(WOULD_BLOCK_BACKOFF);
                }
                Err(err) => return Err(CodecError::Io(err)),
            }
        }
        trace!(schema = schema.name(), bytes = offset, "wrote record");

        self.flush()
    }

    /// Encode and write a typed record (blocking).
    pub fn write<R: Record>(&mut self, record: &R) -> Result<()> {
        self.write_values(R::schema(), &record.to_values())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(WOULD_BLOCK_BACKOFF);
                }
                Err(err) => return Err(CodecError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }
}
