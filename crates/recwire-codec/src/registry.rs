use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{CodecError, Result};
use crate::primitives::{
    BoolSerializer, BytesSerializer, F32Serializer, F64Serializer, IntSerializer,
    TextSerializer, UIntSerializer,
};
use crate::schema::TypeTag;
use crate::serializer::Serializer;

/// Type-tag keyed registry of serializers.
///
/// Build it once, register every type a schema references, then share it
/// (usually behind an [`Arc`]) with encoders and decoders. Registration
/// needs `&mut self`, so a registry that is being read cannot change.
pub struct CodecRegistry {
    serializers: HashMap<TypeTag, Arc<dyn Serializer>>,
    config: RegistryConfig,
}

impl CodecRegistry {
    /// Registry with the built-in primitive serializers.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self::with_config(RegistryConfig {
            register_builtins: false,
            ..RegistryConfig::default()
        })
    }

    /// Registry built from explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self {
            serializers: HashMap::new(),
            config,
        };
        if config.register_builtins {
            registry.register_builtins();
        }
        registry
    }

    fn register_builtins(&mut self) {
        let max_len = self.config.max_bytes_len;
        self.register(TypeTag::Bytes, BytesSerializer::new(max_len));
        self.register(TypeTag::UInt, UIntSerializer);
        self.register(TypeTag::Int, IntSerializer);
        self.register(TypeTag::F64, F64Serializer);
        self.register(TypeTag::F32, F32Serializer);
        self.register(TypeTag::Bool, BoolSerializer);
        self.register(TypeTag::Text, TextSerializer::new(max_len));
    }

    /// Register `serializer` for `tag`, replacing any previous entry.
    pub fn register<S: Serializer + 'static>(&mut self, tag: TypeTag, serializer: S) {
        self.register_shared(tag, Arc::new(serializer));
    }

    /// Register an already shared serializer for `tag`.
    pub fn register_shared(&mut self, tag: TypeTag, serializer: Arc<dyn Serializer>) {
        let replaced = self.serializers.insert(tag.clone(), serializer).is_some();
        debug!(%tag, replaced, "registered serializer");
    }

    /// Serializer registered for `tag`.
    pub fn lookup(&self, tag: &TypeTag) -> Result<Arc<dyn Serializer>> {
        self.serializers
            .get(tag)
            .cloned()
            .ok_or_else(|| CodecError::SerializerNotFound(tag.clone()))
    }

    /// Check if `tag` has a registered serializer.
    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.serializers.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self.serializers.keys().cloned().collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("tags", &self.tags())
            .field("config", &self.config)
            .finish()
    }
}
