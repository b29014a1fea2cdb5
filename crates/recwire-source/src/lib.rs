//! Chunked byte sources for streaming record decode.
//!
//! A [`ChunkSource`] hands out bytes in whatever pieces the underlying
//! transport produces them:
//! - any [`std::io::Read`] through [`ReadSource`]
//! - Unix domain sockets (Linux/macOS) through [`UnixDomainSocket`]
//! - pre-split in-memory chunks through [`ChunkQueue`]
//!
//! This is the lowest layer of recwire. The streaming decoder in
//! `recwire-codec` pulls from here and never touches the transport directly.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, SourceError};
pub use traits::{ChunkQueue, ChunkSource, ReadSource, MAX_READ_SIZE};

#[cfg(unix)]
pub use uds::UnixDomainSocket;
