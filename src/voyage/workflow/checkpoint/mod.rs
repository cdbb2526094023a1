// SPDX-License-Identifier: MIT

//! Durable checkpoints for graph threads
//!
//! A checkpoint is keyed by (graph id, thread id) and records the state
//! accumulated so far plus where execution stands: about to run a step,
//! suspended at a step, or finished. Stores only move bytes; the engine
//! owns every decision about what a checkpoint means.

mod file;
mod lock;
mod memory;

pub use file::FileStore;
pub use lock::ThreadLocks;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

use crate::adk::error::StoreError;
use crate::voyage::workflow::interrupt::Interrupt;
use crate::voyage::workflow::state::StateUpdate;

/// Identity of one checkpoint lineage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointKey {
    pub graph: String,
    pub thread: String,
}

impl CheckpointKey {
    pub fn new(graph: impl Into<String>, thread: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            thread: thread.into(),
        }
    }
}

impl fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.graph, self.thread)
    }
}

/// Execution position recorded in a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Cursor {
    /// `next` is about to run; left behind when an invocation fails mid-way
    InFlight {
        next: String,
        /// Input of the run that got this far; only the same input may
        /// continue it
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<RunOrigin>,
    },
    /// `step` raised `interrupt` and awaits exactly one resume value
    Suspended {
        step: String,
        interrupt: Interrupt,
        raised_at: DateTime<Utc>,
    },
    /// The graph reached END
    Finished,
}

/// The caller input that started a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", content = "value", rename_all = "snake_case")]
pub enum RunOrigin {
    Seed(StateUpdate),
    Resume(String),
}

/// Persisted (state, position) snapshot for one graph thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub values: Map<String, Value>,
    pub cursor: Cursor,
    /// Step executions over the lifetime of the thread
    #[serde(default)]
    pub steps_executed: u64,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(values: Map<String, Value>, cursor: Cursor, steps_executed: u64) -> Self {
        Self {
            values,
            cursor,
            steps_executed,
            updated_at: Utc::now(),
        }
    }
}

/// Durable mapping from (graph, thread) to the latest checkpoint
///
/// Implementations must make `save` atomic per key: a concurrent or
/// crashed writer never leaves a torn checkpoint behind.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, key: &CheckpointKey) -> Result<Option<Checkpoint>, StoreError>;

    async fn save(&self, key: &CheckpointKey, checkpoint: &Checkpoint) -> Result<(), StoreError>;
}

/// A store shared by every engine of a process, plus per-thread locks
#[derive(Clone)]
pub struct Checkpointer {
    store: Arc<dyn CheckpointStore>,
    locks: Arc<ThreadLocks>,
}

impl Checkpointer {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            store,
            locks: Arc::new(ThreadLocks::default()),
        }
    }

    /// In-memory checkpointer, mainly for tests and the CLI
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Wait for exclusive use of one graph thread
    pub async fn lock(&self, key: &CheckpointKey) -> OwnedMutexGuard<()> {
        self.locks.acquire(key).await
    }

    pub async fn load(&self, key: &CheckpointKey) -> Result<Option<Checkpoint>, StoreError> {
        self.store.load(key).await
    }

    pub async fn save(&self, key: &CheckpointKey, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        self.store.save(key, checkpoint).await
    }
}

impl fmt::Debug for Checkpointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpointer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_serializes_with_status_tag() {
        let cursor = Cursor::InFlight {
            next: "planner".to_string(),
            origin: None,
        };
        assert_eq!(
            serde_json::to_value(&cursor).unwrap(),
            json!({"status": "in_flight", "next": "planner"})
        );
        assert_eq!(
            serde_json::to_value(Cursor::Finished).unwrap(),
            json!({"status": "finished"})
        );
    }

    #[test]
    fn test_in_flight_cursor_keeps_its_origin() {
        let cursor = Cursor::InFlight {
            next: "planner".to_string(),
            origin: Some(RunOrigin::Resume("Seoul".to_string())),
        };
        let value = serde_json::to_value(&cursor).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "in_flight",
                "next": "planner",
                "origin": {"input": "resume", "value": "Seoul"}
            })
        );
        assert_eq!(serde_json::from_value::<Cursor>(value).unwrap(), cursor);

        let seeded = Cursor::InFlight {
            next: "a".to_string(),
            origin: Some(RunOrigin::Seed(StateUpdate::new().set("plan", "p"))),
        };
        let back: Cursor = serde_json::from_value(serde_json::to_value(&seeded).unwrap()).unwrap();
        assert_eq!(back, seeded);
    }

    #[test]
    fn test_key_display() {
        let key = CheckpointKey::new("travel_system", "t-1");
        assert_eq!(key.to_string(), "travel_system/t-1");
    }

    #[tokio::test]
    async fn test_checkpointer_round_trip() {
        let checkpointer = Checkpointer::in_memory();
        let key = CheckpointKey::new("g", "t");
        assert!(checkpointer.load(&key).await.unwrap().is_none());

        let mut values = Map::new();
        values.insert("plan".to_string(), json!("visit Seoul"));
        let cp = Checkpoint::new(values, Cursor::Finished, 4);
        checkpointer.save(&key, &cp).await.unwrap();

        assert_eq!(checkpointer.load(&key).await.unwrap(), Some(cp));
    }
}
