//! Snapshot Module
//!
//! Serializes the whole entry map to a single bincode blob and back.
//!
//! The blob is the bincode encoding of `HashMap<String, CacheEntry>`. It is a
//! raw dump: entries that are expired but not yet purged are included.

mod file;
mod registry;

use std::collections::HashMap;

use crate::cache::{CacheEntry, Value};
use crate::error::{CacheError, Result};

pub use file::{read_snapshot, snapshot_path, write_snapshot, SNAPSHOT_EXTENSION};
pub use registry::TypeRegistry;

// == Snapshot Codec ==
/// Encodes and decodes entry maps, rejecting unregistered record types.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCodec {
    registry: TypeRegistry,
}

impl SnapshotCodec {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    // == Encode ==
    /// Serializes an entry map.
    ///
    /// Fails with `UnregisteredType` before writing anything if a record type
    /// is unknown to the registry.
    pub fn encode(&self, entries: &HashMap<String, CacheEntry>) -> Result<Vec<u8>> {
        self.check_registered(entries)?;
        Ok(bincode::serialize(entries)?)
    }

    // == Decode ==
    /// Deserializes an entry map produced by [`SnapshotCodec::encode`].
    pub fn decode(&self, bytes: &[u8]) -> Result<HashMap<String, CacheEntry>> {
        let entries: HashMap<String, CacheEntry> = bincode::deserialize(bytes)?;
        self.check_registered(&entries)?;
        Ok(entries)
    }

    fn check_registered(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        for entry in entries.values() {
            if let Value::Record { type_name, .. } = &entry.value {
                if !self.registry.contains(type_name) {
                    return Err(CacheError::UnregisteredType(type_name.clone()));
                }
            }
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Payload;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: u8,
    }

    impl Payload for Profile {
        const TYPE_NAME: &'static str = "profile";
    }

    fn sample_entries() -> HashMap<String, CacheEntry> {
        let mut entries = HashMap::new();
        entries.insert("int".to_string(), CacheEntry::new(Value::from(42), 300));
        entries.insert("str".to_string(), CacheEntry::new(Value::from("hi"), 300));
        entries.insert("expired".to_string(), CacheEntry::new(Value::from(false), 0));
        entries
    }

    #[test]
    fn test_roundtrip_builtin_values() {
        let codec = SnapshotCodec::default();
        let entries = sample_entries();

        let bytes = codec.encode(&entries).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_roundtrip_registered_record() {
        let codec = SnapshotCodec::new(TypeRegistry::new().with::<Profile>());
        let profile = Profile {
            name: "ana".to_string(),
            age: 30,
        };
        let mut entries = sample_entries();
        entries.insert(
            "profile".to_string(),
            CacheEntry::new(Value::record(&profile).unwrap(), 300),
        );

        let decoded = codec.decode(&codec.encode(&entries).unwrap()).unwrap();

        assert_eq!(decoded["profile"].value.decode::<Profile>().unwrap(), profile);
    }

    #[test]
    fn test_encode_unregistered_record() {
        let codec = SnapshotCodec::default();
        let mut entries = HashMap::new();
        let value = Value::record(&Profile {
            name: "bo".to_string(),
            age: 1,
        })
        .unwrap();
        entries.insert("p".to_string(), CacheEntry::new(value, 300));

        let result = codec.encode(&entries);
        assert!(matches!(result, Err(CacheError::UnregisteredType(name)) if name == "profile"));
    }

    #[test]
    fn test_decode_unregistered_record() {
        let writer = SnapshotCodec::new(TypeRegistry::new().with::<Profile>());
        let reader = SnapshotCodec::default();
        let mut entries = HashMap::new();
        let value = Value::record(&Profile {
            name: "bo".to_string(),
            age: 1,
        })
        .unwrap();
        entries.insert("p".to_string(), CacheEntry::new(value, 300));

        let bytes = writer.encode(&entries).unwrap();
        let result = reader.decode(&bytes);
        assert!(matches!(result, Err(CacheError::UnregisteredType(_))));
    }

    #[test]
    fn test_decode_garbage() {
        let codec = SnapshotCodec::default();
        let result = codec.decode(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_empty_map() {
        let codec = SnapshotCodec::default();
        let bytes = codec.encode(&HashMap::new()).unwrap();
        assert!(codec.decode(&bytes).unwrap().is_empty());
    }
}
