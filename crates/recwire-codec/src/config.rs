use crate::primitives::DEFAULT_MAX_BYTES_LEN;

/// Default number of bytes requested from a chunk source per receive.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Controls how a [`CodecRegistry`](crate::CodecRegistry) is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Register the primitive serializers for every built-in tag.
    pub register_builtins: bool,
    /// Largest length prefix the built-in bytes and text serializers accept.
    /// Unbounded by default; a larger prefix is rejected as malformed.
    pub max_bytes_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            register_builtins: true,
            max_bytes_len: DEFAULT_MAX_BYTES_LEN,
        }
    }
}

/// Streaming decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Upper bound passed to each `receive` call. Zero is treated as one.
    pub chunk_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
