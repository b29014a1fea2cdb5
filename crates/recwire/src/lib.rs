//! Schema-driven binary records over byte streams.
//!
//! recwire encodes a record as the plain concatenation of its fields and
//! decodes it back, either from memory or incrementally from a source that
//! delivers bytes in arbitrary chunks.
//!
//! # Crate Structure
//!
//! - [`source`] - Chunk sources (any `Read`, in-memory queues, Unix sockets)
//! - [`codec`] - Byte buffer, serializer registry, record encode/decode and streaming reader

/// Re-export chunk source types.
pub mod source {
    pub use recwire_source::*;
}

/// Re-export codec types.
pub mod codec {
    pub use recwire_codec::*;
}
