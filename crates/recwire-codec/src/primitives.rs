//! Built-in serializers for the primitive wire formats.
//!
//! ```text
//! u64 / i64   8 bytes, little-endian
//! f64         8 bytes, IEEE-754 double, native byte order
//! f32         4 bytes, IEEE-754 single, native byte order
//! bool        1 byte, 0 = false, anything else = true
//! bytes       u64 LE length prefix, then that many bytes
//! text        bytes format over the UTF-8 encoding
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::buffer::ByteBuffer;
use crate::error::{DecodeError, ValueError};
use crate::serializer::{DecodeResult, Serializer};
use crate::value::Value;

/// Width of the length prefix in front of bytes and text values.
pub const LENGTH_PREFIX_SIZE: usize = 8;

/// Default upper bound for a length prefix: none. Set a lower bound through
/// [`RegistryConfig`](crate::RegistryConfig) when reading untrusted input.
pub const DEFAULT_MAX_BYTES_LEN: usize = usize::MAX;

fn take_array<const N: usize>(buf: &mut ByteBuffer) -> DecodeResult<[u8; N]> {
    let bytes = buf.take_front(N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UIntSerializer;

impl Serializer for UIntSerializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        dst.put_u64_le(value.as_u64()?);
        Ok(())
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        Ok(Value::UInt(u64::from_le_bytes(take_array(buf)?)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntSerializer;

impl Serializer for IntSerializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        dst.put_i64_le(value.as_i64()?);
        Ok(())
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        Ok(Value::Int(i64::from_le_bytes(take_array(buf)?)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct F64Serializer;

impl Serializer for F64Serializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        dst.put_slice(&value.as_f64()?.to_ne_bytes());
        Ok(())
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        Ok(Value::F64(f64::from_ne_bytes(take_array(buf)?)))
    }
}

/// Single precision float. Encoding a [`Value::F64`] narrows it.
#[derive(Debug, Clone, Copy, Default)]
pub struct F32Serializer;

impl Serializer for F32Serializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        dst.put_slice(&value.as_f32()?.to_ne_bytes());
        Ok(())
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        Ok(Value::F32(f32::from_ne_bytes(take_array(buf)?)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSerializer;

impl Serializer for BoolSerializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        dst.put_u8(u8::from(value.as_bool()?));
        Ok(())
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        Ok(Value::Bool(buf.take_one()? != 0))
    }
}

/// Length-prefixed raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct BytesSerializer {
    max_len: usize,
}

impl BytesSerializer {
    /// Reject length prefixes above `max_len`.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub(crate) fn encode_raw(&self, data: &[u8], dst: &mut BytesMut) -> Result<(), ValueError> {
        if data.len() > self.max_len {
            return Err(ValueError::LengthExceeded {
                len: data.len(),
                max: self.max_len,
            });
        }
        dst.reserve(LENGTH_PREFIX_SIZE + data.len());
        dst.put_u64_le(data.len() as u64);
        dst.put_slice(data);
        Ok(())
    }

    pub(crate) fn decode_raw(&self, buf: &mut ByteBuffer) -> DecodeResult<Bytes> {
        let prefix = buf.take_front(LENGTH_PREFIX_SIZE)?;
        let len = prefix.clone().get_u64_le();

        let len = match usize::try_from(len) {
            Ok(len) if len <= self.max_len => len,
            _ => {
                return Err(DecodeError::Malformed {
                    context: "length prefix",
                    message: format!("length {len} exceeds maximum {}", self.max_len),
                })
            }
        };

        match buf.take_front(len) {
            Ok(body) => Ok(body),
            Err(_) => Err(DecodeError::Incomplete { popped: prefix }),
        }
    }
}

impl Default for BytesSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES_LEN)
    }
}

impl Serializer for BytesSerializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        self.encode_raw(value.as_bytes()?, dst)
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        self.decode_raw(buf).map(Value::Bytes)
    }
}

/// UTF-8 text carried in the bytes format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSerializer {
    bytes: BytesSerializer,
}

impl TextSerializer {
    pub fn new(max_len: usize) -> Self {
        Self {
            bytes: BytesSerializer::new(max_len),
        }
    }
}

impl Serializer for TextSerializer {
    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), ValueError> {
        self.bytes.encode_raw(value.as_str()?.as_bytes(), dst)
    }

    fn decode(&self, buf: &mut ByteBuffer) -> DecodeResult<Value> {
        let body = self.bytes.decode_raw(buf)?;
        String::from_utf8(body.to_vec())
            .map(Value::Text)
            .map_err(|err| DecodeError::Malformed {
                context: "text",
                message: err.utf8_error().to_string(),
            })
    }
}
