use bytes::Bytes;

use crate::schema::TypeTag;

/// Failure of a [`ByteBuffer`](crate::ByteBuffer) removal. The buffer is
/// never mutated when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// Fewer bytes are buffered than were requested.
    #[error("insufficient data (requested {requested} bytes, {available} available)")]
    InsufficientData { requested: usize, available: usize },
}

/// Outcome of a failed serializer decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// More bytes are needed. `popped` holds every byte the attempt already
    /// removed from the buffer, in original order, for the caller to restore.
    #[error("incomplete input ({} bytes taken before running out)", .popped.len())]
    Incomplete { popped: Bytes },

    /// The bytes are present but do not form a valid value. Never retried.
    #[error("malformed {context}: {message}")]
    Malformed {
        context: &'static str,
        message: String,
    },
}

impl DecodeError {
    /// Insufficient data with nothing to restore.
    pub fn incomplete() -> Self {
        Self::Incomplete {
            popped: Bytes::new(),
        }
    }

    /// Returns true if more data could let the decode succeed.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }
}

impl From<BufferError> for DecodeError {
    fn from(_: BufferError) -> Self {
        // A failed removal takes nothing, so there is nothing to hand back.
        Self::incomplete()
    }
}

/// A [`Value`](crate::Value) did not have the shape a serializer or a
/// typed record expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    #[error("value length {len} exceeds maximum {max}")]
    LengthExceeded { len: usize, max: usize },

    #[error("field count mismatch (expected {expected}, found {found})")]
    FieldCount { expected: usize, found: usize },
}

/// Errors surfaced by record encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The schema references a type with no registered serializer.
    #[error("no serializer registered for type {0}")]
    SerializerNotFound(TypeTag),

    /// A field value could not be encoded by its serializer.
    #[error("cannot encode field {field}: {source}")]
    Encode {
        field: String,
        #[source]
        source: ValueError,
    },

    /// The number of values does not match the schema.
    #[error("field count mismatch (schema has {expected}, got {found})")]
    FieldCount { expected: usize, found: usize },

    /// In-memory input ended inside `field`.
    #[error("truncated input while decoding field {field}")]
    Truncated { field: String },

    /// The bytes for `field` are not a valid value.
    #[error("malformed field {field}: {source}")]
    Malformed {
        field: String,
        #[source]
        source: DecodeError,
    },

    /// The chunk source ended after `decoded` of `expected` fields.
    #[error("source ended mid-record ({decoded} of {expected} fields decoded)")]
    TruncatedRecord { decoded: usize, expected: usize },

    /// Decoded values could not be turned into the typed record.
    #[error("record construction failed: {0}")]
    Value(#[from] ValueError),

    /// The chunk source failed.
    #[error("source error: {0}")]
    Source(#[from] recwire_source::SourceError),

    /// Writing encoded records failed.
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns true for errors caused by the input data rather than by
    /// configuration or I/O.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::Malformed { .. } | Self::TruncatedRecord { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
