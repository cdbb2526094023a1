// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::CheckpointKey;

/// One async mutex per graph thread
///
/// Held for a whole invocation so two requests on the same thread run one
/// after the other. Entries nobody holds or waits on are dropped on the
/// next acquire.
#[derive(Debug, Default)]
pub struct ThreadLocks {
    locks: Mutex<HashMap<CheckpointKey, Arc<AsyncMutex<()>>>>,
}

impl ThreadLocks {
    pub async fn acquire(&self, key: &CheckpointKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of tracked threads
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
