// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Checkpoint, CheckpointKey, CheckpointStore};
use crate::adk::error::StoreError;

/// One JSON file per checkpoint under `<dir>/<graph>/<thread>.json`
///
/// Saves write a sibling temp file, sync it and rename it over the target,
/// so readers see either the previous checkpoint or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &CheckpointKey) -> PathBuf {
        self.dir
            .join(encode_component(&key.graph))
            .join(format!("{}.json", encode_component(&key.thread)))
    }
}

/// Percent-encode anything that could escape the store directory or
/// collide after encoding.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, byte) in raw.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || (byte == b'.' && i > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn io_error(key: &CheckpointKey, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl CheckpointStore for FileStore {
    async fn load(&self, key: &CheckpointKey) -> Result<Option<Checkpoint>, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: format!("{}: {}", path.display(), e),
            })
    }

    async fn save(&self, key: &CheckpointKey, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let raw = serde_json::to_vec_pretty(checkpoint).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| io_error(key, e))?;
        }

        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| io_error(key, e))?;
        file.write_all(&raw).await.map_err(|e| io_error(key, e))?;
        file.sync_all().await.map_err(|e| io_error(key, e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_error(key, e));
        }

        log::debug!("Saved checkpoint {} to {}", key, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voyage::workflow::checkpoint::Cursor;
    use crate::voyage::workflow::interrupt::Interrupt;
    use chrono::Utc;
    use serde_json::{json, Map};

    fn suspended() -> Checkpoint {
        let mut values = Map::new();
        values.insert("messages".to_string(), json!([{"role": "human", "content": "hi"}]));
        Checkpoint::new(
            values,
            Cursor::Suspended {
                step: "ask_user".to_string(),
                interrupt: Interrupt::new("Which city would you like to visit?"),
                raised_at: Utc::now(),
            },
            2,
        )
    }

    #[tokio::test]
    async fn test_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let key = CheckpointKey::new("requirements", "thread-1");
        let cp = suspended();

        FileStore::new(dir.path()).save(&key, &cp).await.unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.load(&key).await.unwrap(), Some(cp));
    }

    #[tokio::test]
    async fn test_missing_checkpoint_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store
            .load(&CheckpointKey::new("g", "nobody"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let key = CheckpointKey::new("g", "t");
        let path = store.path_for(&key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{\"values\": ").unwrap();

        let err = store.load(&key).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let key = CheckpointKey::new("g", "t");
        store.save(&key, &suspended()).await.unwrap();
        store.save(&key, &suspended()).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join("g"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["t.json".to_string()]);
    }

    #[test]
    fn test_encoded_components_stay_inside_dir() {
        assert_eq!(encode_component("t-1_a"), "t-1_a");
        assert_eq!(encode_component("travel_system.requirements"), "travel_system.requirements");
        assert_eq!(encode_component("../etc"), "%2E.%2Fetc");
        assert_eq!(encode_component("a/b"), "a%2Fb");
        assert_ne!(encode_component("a/b"), encode_component("a_b"));
    }
}
