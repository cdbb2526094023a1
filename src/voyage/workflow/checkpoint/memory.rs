// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Checkpoint, CheckpointKey, CheckpointStore};
use crate::adk::error::StoreError;

/// Process-local store
///
/// Checkpoints are kept serialized so that what a test loads back has gone
/// through the same encoding a durable store would apply.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CheckpointKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn load(&self, key: &CheckpointKey) -> Result<Option<Checkpoint>, StoreError> {
        let entries = self.entries.read().await;
        let Some(raw) = entries.get(key) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    async fn save(&self, key: &CheckpointKey, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let raw = serde_json::to_string(checkpoint).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.entries.write().await.insert(key.clone(), raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voyage::workflow::checkpoint::Cursor;
    use serde_json::Map;

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = MemoryStore::new();
        let parent = CheckpointKey::new("travel_system", "t1");
        let child = CheckpointKey::new("travel_system.requirements", "t1-requirements");

        store
            .save(&parent, &Checkpoint::new(Map::new(), Cursor::Finished, 1))
            .await
            .unwrap();

        assert!(store.load(&parent).await.unwrap().is_some());
        assert!(store.load(&child).await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryStore::new();
        let key = CheckpointKey::new("g", "t");
        store
            .save(
                &key,
                &Checkpoint::new(
                    Map::new(),
                    Cursor::InFlight {
                        next: "a".to_string(),
                        origin: None,
                    },
                    0,
                ),
            )
            .await
            .unwrap();
        store
            .save(&key, &Checkpoint::new(Map::new(), Cursor::Finished, 1))
            .await
            .unwrap();

        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded.cursor, Cursor::Finished);
        assert_eq!(loaded.steps_executed, 1);
    }
}
