use std::sync::Arc;

use bytes::BytesMut;

use crate::buffer::ByteBuffer;
use crate::error::{DecodeError, Result as CodecResult, ValueError};
use crate::registry::CodecRegistry;
use crate::schema::Schema;
use crate::value::Value;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Encode/decode pair for one type.
///
/// `decode` must either consume exactly the bytes of one value, or fail.
/// On [`DecodeError::Incomplete`] every byte it removed is handed back in
/// `popped`, which is what lets a streaming caller retry once more data has
/// arrived. Implementations are stateless and shared across threads.
pub trait Serializer: Send + Sync {
    /// Append the wire form of `value` to `dst`.
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> std::result::Result<(), ValueError>;

    /// Remove one value from the front of `buf`.
    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value>;
}

/// Composite serializer for a nested record: its parts are encoded back to
/// back and decode to [`Value::Record`].
///
/// An incomplete part reports every byte taken by the earlier parts as well,
/// so rolling back a nested value is as exact as rolling back a primitive.
#[derive(Clone)]
pub struct TupleSerializer {
    parts: Vec<Arc<dyn Serializer>>,
}

impl TupleSerializer {
    pub fn new(parts: Vec<Arc<dyn Serializer>>) -> Self {
        Self { parts }
    }

    /// Resolve each field of `schema` against `registry` now.
    ///
    /// Nested types must already be registered; the composite does not see
    /// later registrations.
    pub fn from_schema(registry: &CodecRegistry, schema: &Schema) -> CodecResult<Self> {
        let parts = schema
            .tags()
            .map(|tag| registry.lookup(tag))
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self::new(parts))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Serializer for TupleSerializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> std::result::Result<(), ValueError> {
        let values = value.as_record()?;
        if values.len() != self.parts.len() {
            return Err(ValueError::FieldCount {
                expected: self.parts.len(),
                found: values.len(),
            });
        }
        for (part, value) in self.parts.iter().zip(values) {
            part.encode(value, dst)?;
        }
        Ok(())
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        let mut checkpoint = buf.clone();
        let mut values = Vec::with_capacity(self.parts.len());

        for part in &self.parts {
            match part.decode(buf) {
                Ok(value) => values.push(value),
                Err(DecodeError::Incomplete { .. }) => {
                    let taken = checkpoint.len() - buf.len();
                    let popped = checkpoint.take_front(taken).unwrap_or_default();
                    return Err(DecodeError::Incomplete { popped });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Value::Record(values))
    }
}
