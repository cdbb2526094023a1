// SPDX-License-Identifier: MIT

//! Embedding a whole graph as one step of another
//!
//! The child graph keeps its own checkpoint under a thread id derived from
//! the parent's. Its interrupts are relayed to the parent unchanged, and
//! the parent does not move past the adapter until the child reaches END.

use async_trait::async_trait;
use std::sync::Arc;

use crate::adk::error::{ProtocolError, Result};
use crate::voyage::workflow::graph::{
    GraphEngine, Input, ResumeMode, RunOutcome, Step, StepContext, StepOutcome, ThreadStatus,
};
use crate::voyage::workflow::state::{GraphState, StateUpdate};

type Mapping = Arc<dyn Fn(&GraphState) -> StateUpdate + Send + Sync>;

/// A step that runs a child [`GraphEngine`]
pub struct SubgraphStep {
    child: Arc<GraphEngine>,
    suffix: String,
    project: Mapping,
    extract: Mapping,
}

impl SubgraphStep {
    /// Wrap `child`; its threads are named `<parent thread>-<suffix>`
    pub fn new(child: Arc<GraphEngine>, suffix: &str) -> Self {
        Self {
            child,
            suffix: suffix.to_string(),
            project: Arc::new(|_| StateUpdate::new()),
            extract: Arc::new(|_| StateUpdate::new()),
        }
    }

    /// Seed the child with these parent fields
    pub fn project_fields(self, fields: &[&str]) -> Self {
        let fields = owned(fields);
        self.project_with(move |state| copy_fields(state, &fields))
    }

    /// Hand these child fields back to the parent on completion
    pub fn extract_fields(self, fields: &[&str]) -> Self {
        let fields = owned(fields);
        self.extract_with(move |state| copy_fields(state, &fields))
    }

    pub fn project_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&GraphState) -> StateUpdate + Send + Sync + 'static,
    {
        self.project = Arc::new(f);
        self
    }

    pub fn extract_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&GraphState) -> StateUpdate + Send + Sync + 'static,
    {
        self.extract = Arc::new(f);
        self
    }

    /// Child thread for a parent thread
    ///
    /// The suffix is fixed per adapter, so distinct parent threads always
    /// map to distinct child threads.
    pub fn child_thread(&self, parent_thread: &str) -> String {
        format!("{}-{}", parent_thread, self.suffix)
    }

    fn completed(&self, child_state: &GraphState) -> StepOutcome {
        StepOutcome::Advance((self.extract)(child_state))
    }
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn copy_fields(state: &GraphState, fields: &[String]) -> StateUpdate {
    fields
        .iter()
        .filter_map(|f| state.present(f).map(|v| (f, v.clone())))
        .fold(StateUpdate::new(), |update, (f, v)| update.set(f, v))
}

#[async_trait]
impl Step for SubgraphStep {
    async fn execute(&self, state: &GraphState, ctx: &StepContext) -> Result<StepOutcome> {
        let thread = self.child_thread(&ctx.thread_id);
        let (status, child_state) = self.child.snapshot(&thread).await?;

        let input = match (&ctx.resume, status) {
            (Some(value), ThreadStatus::Suspended { step, .. }) => {
                log::debug!(
                    "Resuming child graph '{}' thread '{}' at '{}'",
                    self.child.id(),
                    thread,
                    step
                );
                Input::resume(value.clone())
            }
            (_, ThreadStatus::InFlight { next }) => {
                log::warn!(
                    "Child graph '{}' thread '{}' stopped before '{}' completed; retrying",
                    self.child.id(),
                    thread,
                    next
                );
                Input::Retry
            }
            (Some(_), ThreadStatus::Finished) => {
                // The child finished but the parent never recorded it
                log::info!(
                    "Child graph '{}' thread '{}' already finished; adopting its result",
                    self.child.id(),
                    thread
                );
                return Ok(self.completed(&child_state));
            }
            (Some(_), ThreadStatus::Idle) => {
                return Err(ProtocolError::NoPendingSuspension {
                    graph: self.child.id().to_string(),
                    thread,
                }
                .into());
            }
            // The parent lost track of a child question; ask it again
            (None, ThreadStatus::Suspended { step, interrupt }) => {
                log::warn!(
                    "Child graph '{}' thread '{}' is still suspended at '{}'; relaying its interrupt",
                    self.child.id(),
                    thread,
                    step
                );
                return Ok(StepOutcome::Suspend(interrupt));
            }
            (None, ThreadStatus::Idle | ThreadStatus::Finished) => {
                Input::Reset((self.project)(state))
            }
        };

        match self.child.invoke_with(&thread, input, ctx.events()).await? {
            RunOutcome::Interrupted { interrupt, .. } => Ok(StepOutcome::Suspend(interrupt)),
            RunOutcome::Completed(child_state) => Ok(self.completed(&child_state)),
        }
    }

    fn resume_mode(&self) -> ResumeMode {
        ResumeMode::Reenter
    }
}
