use std::sync::Arc;

use recwire_source::ChunkSource;
use tracing::{debug, trace, warn};

use crate::buffer::ByteBuffer;
use crate::config::DecoderConfig;
use crate::error::{CodecError, DecodeError, Result};
use crate::record::Record;
use crate::registry::CodecRegistry;
use crate::schema::Schema;
use crate::value::Value;

/// Reads complete records from a [`ChunkSource`].
///
/// Handles fields split across chunks internally: a field that cannot be
/// decoded yet is rolled back and retried once more bytes arrive. Bytes
/// received past the end of a record stay buffered for the next one.
pub struct RecordReader<S> {
    inner: S,
    registry: Arc<CodecRegistry>,
    buf: ByteBuffer,
    config: DecoderConfig,
}

impl<S: ChunkSource> RecordReader<S> {
    /// Create a new record reader with default configuration.
    pub fn new(inner: S, registry: Arc<CodecRegistry>) -> Self {
        Self::with_config(inner, registry, DecoderConfig::default())
    }

    /// Create a new record reader with explicit configuration.
    pub fn with_config(inner: S, registry: Arc<CodecRegistry>, config: DecoderConfig) -> Self {
        Self {
            inner,
            registry,
            buf: ByteBuffer::new(),
            config,
        }
    }

    /// Read the next record laid out as `schema` (blocking).
    ///
    /// Returns `Ok(None)` if the source ended cleanly before the record
    /// started, and [`CodecError::TruncatedRecord`] if it ended part way.
    pub fn read_values(&mut self, schema: &Schema) -> Result<Option<Vec<Value>>> {
        read_from_source(
            &mut self.inner,
            &self.registry,
            &mut self.buf,
            schema,
            self.config.chunk_size,
        )
    }

    /// Read the next typed record (blocking).
    pub fn read<R: Record>(&mut self) -> Result<Option<R>> {
        match self.read_values(R::schema())? {
            Some(values) => Ok(Some(R::from_values(values)?)),
            None => Ok(None),
        }
    }

    /// Number of received bytes not yet decoded.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the reader and return the inner source. Buffered bytes are
    /// dropped.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Registry used for field lookups.
    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

/// Decode a single record from `source` with default settings.
///
/// Same outcomes as [`RecordReader::read_values`]; bytes the source delivers
/// beyond the record are discarded.
pub fn decode_from_source<S: ChunkSource>(
    mut source: S,
    registry: &CodecRegistry,
    schema: &Schema,
) -> Result<Option<Vec<Value>>> {
    let mut buf = ByteBuffer::new();
    read_from_source(
        &mut source,
        registry,
        &mut buf,
        schema,
        DecoderConfig::default().chunk_size,
    )
}

fn read_from_source<S: ChunkSource>(
    source: &mut S,
    registry: &CodecRegistry,
    buf: &mut ByteBuffer,
    schema: &Schema,
    chunk_size: usize,
) -> Result<Option<Vec<Value>>> {
    let chunk_size = chunk_size.max(1);
    let mut values = Vec::with_capacity(schema.len());

    for field in schema.fields() {
        let serializer = registry.lookup(&field.tag)?;

        loop {
            match serializer.decode(buf) {
                Ok(value) => {
                    values.push(value);
                    break;
                }
                Err(DecodeError::Incomplete { popped }) => {
                    trace!(
                        field = %field.name,
                        restored = popped.len(),
                        buffered = buf.len(),
                        "field incomplete, waiting for more data"
                    );
                    buf.restore(popped);
                }
                Err(source) => {
                    warn!(field = %field.name, error = %source, "malformed field in stream");
                    return Err(CodecError::Malformed {
                        field: field.name.to_string(),
                        source,
                    });
                }
            }

            let chunk = source.receive(chunk_size)?;
            if chunk.is_empty() {
                if values.is_empty() && buf.is_empty() {
                    debug!(schema = schema.name(), "source ended before record");
                    return Ok(None);
                }
                debug!(
                    schema = schema.name(),
                    decoded = values.len(),
                    buffered = buf.len(),
                    "source ended mid-record"
                );
                return Err(CodecError::TruncatedRecord {
                    decoded: values.len(),
                    expected: schema.len(),
                });
            }

            trace!(received = chunk.len(), "received chunk");
            buf.append(chunk);
        }
    }

    Ok(Some(values))
}
