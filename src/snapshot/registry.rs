//! Payload Type Registry
//!
//! Tracks which record types a snapshot codec is allowed to encode and decode.

use std::collections::HashSet;

use crate::cache::Payload;

// == Type Registry ==
/// Set of registered [`Payload::TYPE_NAME`]s.
///
/// Built-in value variants need no registration; only `Value::Record`
/// payloads are checked against the registry.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    names: HashSet<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload type. Returns false if it was already registered.
    pub fn register<T: Payload>(&mut self) -> bool {
        self.names.insert(T::TYPE_NAME.to_string())
    }

    /// Builder-style variant of [`TypeRegistry::register`].
    pub fn with<T: Payload>(mut self) -> Self {
        self.register::<T>();
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.names.contains(type_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
