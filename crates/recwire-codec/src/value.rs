use bytes::Bytes;

use crate::error::ValueError;

/// A single field value as exchanged with serializers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Bytes),
    UInt(u64),
    Int(i64),
    F64(f64),
    F32(f32),
    Bool(bool),
    Text(String),
    /// Ordered values of a nested record, produced by composite serializers.
    Record(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::UInt(_) => "u64",
            Value::Int(_) => "i64",
            Value::F64(_) => "f64",
            Value::F32(_) => "f32",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
        }
    }

    /// Unsigned view. Non-negative signed values are accepted.
    pub fn as_u64(&self) -> Result<u64, ValueError> {
        match *self {
            Value::UInt(v) => Ok(v),
            Value::Int(v) => u64::try_from(v).map_err(|_| ValueError::OutOfRange {
                target: "u64",
                value: v.to_string(),
            }),
            _ => Err(self.mismatch("u64")),
        }
    }

    /// Signed view. Unsigned values up to `i64::MAX` are accepted.
    pub fn as_i64(&self) -> Result<i64, ValueError> {
        match *self {
            Value::Int(v) => Ok(v),
            Value::UInt(v) => i64::try_from(v).map_err(|_| ValueError::OutOfRange {
                target: "i64",
                value: v.to_string(),
            }),
            _ => Err(self.mismatch("i64")),
        }
    }

    /// Double precision view. Single precision values widen losslessly.
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match *self {
            Value::F64(v) => Ok(v),
            Value::F32(v) => Ok(f64::from(v)),
            _ => Err(self.mismatch("f64")),
        }
    }

    /// Single precision view. Double precision values are narrowed.
    pub fn as_f32(&self) -> Result<f32, ValueError> {
        match *self {
            Value::F32(v) => Ok(v),
            Value::F64(v) => Ok(v as f32),
            _ => Err(self.mismatch("f32")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match *self {
            Value::Bool(v) => Ok(v),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], ValueError> {
        match self {
            Value::Bytes(v) => Ok(&v[..]),
            _ => Err(self.mismatch("bytes")),
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::Text(v) => Ok(v.as_str()),
            _ => Err(self.mismatch("text")),
        }
    }

    pub fn as_record(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::Record(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch("record")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Record(v)
    }
}

impl TryFrom<Value> for Bytes {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(other.mismatch("bytes")),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Bytes::try_from(value).map(|v| v.to_vec())
    }
}

impl TryFrom<Value> for String {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(other.mismatch("text")),
        }
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Record(v) => Ok(v),
            other => Err(other.mismatch("record")),
        }
    }
}

impl TryFrom<Value> for u64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_u64()
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_i64()
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_f64()
    }
}

impl TryFrom<Value> for f32 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_f32()
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_bool()
    }
}
