//! Schema-driven binary record codec.
//!
//! A record is the concatenation of its fields in declaration order, with
//! no header, field tags or padding. Each field is written by the serializer
//! registered for its type tag:
//! - Integers and floats as 8 (or 4) raw bytes
//! - Booleans as a single byte
//! - Byte strings and text as an 8-byte little-endian length, then the body
//!
//! Decoding works over a [`ByteBuffer`] whose `take_front` either succeeds in
//! full or leaves the buffer untouched, which lets a field split across
//! chunks be rolled back and retried by [`RecordReader`].

pub mod buffer;
pub mod config;
pub mod error;
pub mod primitives;
pub mod reader;
pub mod record;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod value;
pub mod writer;

pub use buffer::ByteBuffer;
pub use config::{DecoderConfig, RegistryConfig, DEFAULT_CHUNK_SIZE};
pub use error::{BufferError, CodecError, DecodeError, Result, ValueError};
pub use primitives::{
    BoolSerializer, BytesSerializer, F32Serializer, F64Serializer, IntSerializer,
    TextSerializer, UIntSerializer, DEFAULT_MAX_BYTES_LEN, LENGTH_PREFIX_SIZE,
};
pub use reader::{decode_from_source, RecordReader};
pub use record::{
    decode, decode_bytes, decode_record, encode, encode_record, encode_to_bytes, Fields, Record,
};
pub use registry::CodecRegistry;
pub use schema::{Field, Schema, SchemaBuilder, TypeTag};
pub use serializer::{DecodeResult, Serializer, TupleSerializer};
pub use value::Value;
pub use writer::RecordWriter;
