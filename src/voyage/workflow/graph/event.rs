// SPDX-License-Identifier: MIT

//! Progress events emitted while a graph runs

use serde::Serialize;
use tokio::sync::mpsc;

pub type EventSender = mpsc::Sender<GraphEvent>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    StepStarted {
        graph: String,
        thread: String,
        step: String,
    },
    StepCompleted {
        graph: String,
        thread: String,
        step: String,
    },
    Interrupted {
        graph: String,
        thread: String,
        step: String,
        message: String,
    },
    Completed {
        graph: String,
        thread: String,
    },
}

impl GraphEvent {
    pub fn graph(&self) -> &str {
        match self {
            Self::StepStarted { graph, .. }
            | Self::StepCompleted { graph, .. }
            | Self::Interrupted { graph, .. }
            | Self::Completed { graph, .. } => graph,
        }
    }
}

/// Send an event if anyone listens; a closed channel is not an error
pub(crate) async fn emit(events: Option<&EventSender>, event: GraphEvent) {
    if let Some(tx) = events {
        if tx.send(event).await.is_err() {
            log::debug!("Event receiver dropped");
        }
    }
}
