// SPDX-License-Identifier: MIT

//! Graph engine: drives steps until the graph suspends or reaches END

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::edge::{self, Edge, END};
use super::event::{self, EventSender, GraphEvent};
use super::step::{ResumeMode, Step, StepContext, StepOutcome};
use crate::adk::error::{ProtocolError, Result, VoyageError, WorkflowError};
use crate::voyage::workflow::checkpoint::{
    Checkpoint, CheckpointKey, Checkpointer, Cursor, RunOrigin,
};
use crate::voyage::workflow::interrupt::{Interrupt, Resume};
use crate::voyage::workflow::state::{GraphState, StateSchema, StateUpdate};

/// Default bound on step executions per invocation
pub const DEFAULT_MAX_STEPS: usize = 100;

/// When checkpoints are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Durability {
    /// After every executed step, plus on suspension and completion
    #[default]
    Step,
    /// Only when the invocation suspends or completes
    Exit,
}

impl FromStr for Durability {
    type Err = VoyageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "step" => Ok(Self::Step),
            "exit" => Ok(Self::Exit),
            other => Err(VoyageError::config(format!(
                "unknown durability '{}' (expected 'step' or 'exit')",
                other
            ))),
        }
    }
}

/// What the caller asks of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Start a new pass from the entry step, continuing the thread's last
    /// terminal state (or the schema defaults on a new thread)
    Seed(StateUpdate),
    /// Start a new pass from schema defaults, discarding any checkpoint
    Reset(StateUpdate),
    /// Answer the pending interrupt
    Resume(Resume),
    /// Continue a thread left in flight by a failed run, whatever started it
    Retry,
}

impl Input {
    pub fn seed(update: StateUpdate) -> Self {
        Self::Seed(update)
    }

    pub fn resume(value: impl Into<String>) -> Self {
        Self::Resume(Resume::new(value))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Seed(_) => "seed",
            Self::Reset(_) => "reset",
            Self::Resume(_) => "resume",
            Self::Retry => "retry",
        }
    }
}

/// How an invocation ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Interrupted {
        interrupt: Interrupt,
        state: GraphState,
    },
    Completed(GraphState),
}

impl RunOutcome {
    pub fn state(&self) -> &GraphState {
        match self {
            Self::Interrupted { state, .. } => state,
            Self::Completed(state) => state,
        }
    }

    pub fn into_state(self) -> GraphState {
        match self {
            Self::Interrupted { state, .. } => state,
            Self::Completed(state) => state,
        }
    }

    pub fn interrupt(&self) -> Option<&Interrupt> {
        match self {
            Self::Interrupted { interrupt, .. } => Some(interrupt),
            Self::Completed(_) => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt().is_some()
    }
}

/// Persisted position of a thread, as seen from outside the engine
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadStatus {
    /// No checkpoint yet
    Idle,
    /// A previous invocation failed before `next` completed
    InFlight { next: String },
    Suspended { step: String, interrupt: Interrupt },
    Finished,
}

/// Where the loop picks up
enum Entry {
    /// Execute this step
    Execute(String),
    /// Treat this step as satisfied and route from it
    RouteFrom(String),
}

/// Starting state, entry point, pending resume value and origin of a run
type Prepared = (GraphState, Entry, Option<String>, Option<RunOrigin>);

/// A compiled graph bound to a checkpoint store
pub struct GraphEngine {
    pub(super) id: String,
    pub(super) schema: StateSchema,
    pub(super) history: Option<String>,
    pub(super) steps: HashMap<String, Arc<dyn Step>>,
    pub(super) routes: HashMap<String, Vec<Edge>>,
    pub(super) entry: String,
    pub(super) max_steps: usize,
    pub(super) durability: Durability,
    pub(super) checkpointer: Checkpointer,
}

impl GraphEngine {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    pub fn key(&self, thread: &str) -> CheckpointKey {
        CheckpointKey::new(self.id.clone(), thread)
    }

    pub async fn invoke(&self, thread: &str, input: Input) -> Result<RunOutcome> {
        self.invoke_with(thread, input, None).await
    }

    /// Invoke while reporting progress on `events`
    pub async fn invoke_with_events(
        &self,
        thread: &str,
        input: Input,
        events: EventSender,
    ) -> Result<RunOutcome> {
        self.invoke_with(thread, input, Some(events)).await
    }

    /// Run one invocation on `thread`
    ///
    /// The thread is locked for the whole call. A failed invocation writes
    /// nothing after the failure, so the persisted checkpoint is the last
    /// good position. Repeating the input that started the failed run
    /// re-attempts the failed step; any other seed or resume is rejected.
    pub async fn invoke_with(
        &self,
        thread: &str,
        input: Input,
        events: Option<EventSender>,
    ) -> Result<RunOutcome> {
        let key = self.key(thread);
        let _guard = self.checkpointer.lock(&key).await;

        log::info!(
            "Invoking graph '{}' on thread '{}' ({})",
            self.id,
            thread,
            input.kind()
        );

        let checkpoint = self.checkpointer.load(&key).await.map_err(|e| {
            log::error!("Failed to load checkpoint {}: {}", key, e);
            VoyageError::from(e)
        })?;
        let steps_before = checkpoint.as_ref().map_or(0, |cp| cp.steps_executed);
        let prepared = self.prepare(thread, checkpoint, input)?;

        self.run(&key, prepared, steps_before, events)
            .await
            .inspect_err(|e| log::warn!("Graph '{}' failed on thread '{}': {}", self.id, thread, e))
    }

    /// Persisted status and state of a thread
    pub async fn snapshot(&self, thread: &str) -> Result<(ThreadStatus, GraphState)> {
        let Some(cp) = self.checkpointer.load(&self.key(thread)).await? else {
            return Ok((ThreadStatus::Idle, GraphState::new(&self.schema)));
        };
        let status = match cp.cursor {
            Cursor::InFlight { next, .. } => ThreadStatus::InFlight { next },
            Cursor::Suspended {
                step, interrupt, ..
            } => ThreadStatus::Suspended { step, interrupt },
            Cursor::Finished => ThreadStatus::Finished,
        };
        Ok((status, GraphState::restore(&self.schema, cp.values)))
    }

    fn prepare(
        &self,
        thread: &str,
        checkpoint: Option<Checkpoint>,
        input: Input,
    ) -> Result<Prepared> {
        match input {
            Input::Reset(update) => {
                if checkpoint.is_some() {
                    log::debug!("Discarding checkpoint of '{}' thread '{}'", self.id, thread);
                }
                let origin = Some(RunOrigin::Seed(update.clone()));
                Ok((self.seeded(update), Entry::Execute(self.entry.clone()), None, origin))
            }
            Input::Seed(update) => match checkpoint {
                None => {
                    let origin = Some(RunOrigin::Seed(update.clone()));
                    Ok((self.seeded(update), Entry::Execute(self.entry.clone()), None, origin))
                }
                Some(cp) => match cp.cursor {
                    Cursor::Finished => {
                        let origin = Some(RunOrigin::Seed(update.clone()));
                        let mut state = GraphState::restore(&self.schema, cp.values);
                        state.apply(update);
                        Ok((state, Entry::Execute(self.entry.clone()), None, origin))
                    }
                    Cursor::InFlight { next, origin }
                        if matches!(&origin, Some(RunOrigin::Seed(first)) if *first == update) =>
                    {
                        Ok(self.retry(thread, cp.values, next, origin))
                    }
                    Cursor::InFlight { next, .. } => Err(ProtocolError::RetryPending {
                        graph: self.id.clone(),
                        thread: thread.to_string(),
                        step: next,
                    }
                    .into()),
                    Cursor::Suspended { step, .. } => Err(ProtocolError::SuspensionPending {
                        graph: self.id.clone(),
                        thread: thread.to_string(),
                        step,
                    }
                    .into()),
                },
            },
            Input::Resume(resume) => {
                let (values, step) = match checkpoint {
                    Some(Checkpoint {
                        values,
                        cursor: Cursor::Suspended { step, .. },
                        ..
                    }) => (values, step),
                    // The same resume was consumed by a run that failed later on
                    Some(Checkpoint {
                        values,
                        cursor: Cursor::InFlight { next, origin },
                        ..
                    }) if matches!(&origin, Some(RunOrigin::Resume(first)) if first == resume.value()) => {
                        return Ok(self.retry(thread, values, next, origin));
                    }
                    _ => {
                        return Err(ProtocolError::NoPendingSuspension {
                            graph: self.id.clone(),
                            thread: thread.to_string(),
                        }
                        .into())
                    }
                };
                let suspended = self
                    .steps
                    .get(&step)
                    .ok_or_else(|| WorkflowError::UnknownStep(step.clone()))?;

                let mut state = GraphState::restore(&self.schema, values);
                if let Some(history) = &self.history {
                    state.apply(StateUpdate::new().message(history, resume.as_turn()));
                }

                log::info!(
                    "Resuming graph '{}' thread '{}' at '{}'",
                    self.id,
                    thread,
                    step
                );
                let origin = Some(RunOrigin::Resume(resume.value().to_string()));
                match suspended.resume_mode() {
                    ResumeMode::Advance => Ok((state, Entry::RouteFrom(step), None, origin)),
                    ResumeMode::Reenter => Ok((state, Entry::Execute(step), Some(resume.0), origin)),
                }
            }
            Input::Retry => match checkpoint {
                Some(Checkpoint {
                    values,
                    cursor: Cursor::InFlight { next, origin },
                    ..
                }) => Ok(self.retry(thread, values, next, origin)),
                _ => Err(ProtocolError::NothingToRetry {
                    graph: self.id.clone(),
                    thread: thread.to_string(),
                }
                .into()),
            },
        }
    }

    /// Re-enter the step a failed run stopped before
    fn retry(
        &self,
        thread: &str,
        values: Map<String, Value>,
        next: String,
        origin: Option<RunOrigin>,
    ) -> Prepared {
        log::warn!(
            "Graph '{}' thread '{}' stopped before '{}' completed; retrying it",
            self.id,
            thread,
            next
        );
        let state = GraphState::restore(&self.schema, values);
        (state, Entry::Execute(next), None, origin)
    }

    fn seeded(&self, update: StateUpdate) -> GraphState {
        let mut state = GraphState::new(&self.schema);
        state.apply(update);
        state
    }

    fn route(&self, from: &str, state: &GraphState) -> Result<String> {
        let edges = self
            .routes
            .get(from)
            .ok_or_else(|| WorkflowError::DanglingStep(from.to_string()))?;
        let next = edge::route(from, edges, state)?;
        log::debug!("Graph '{}': {} -> {}", self.id, from, next);
        Ok(next)
    }

    async fn run(
        &self,
        key: &CheckpointKey,
        prepared: Prepared,
        mut steps_total: u64,
        events: Option<EventSender>,
    ) -> Result<RunOutcome> {
        let (mut state, entry, mut resume, origin) = prepared;
        let mut current = match entry {
            Entry::Execute(step) => step,
            Entry::RouteFrom(step) => self.route(&step, &state)?,
        };
        let mut executed = 0usize;

        loop {
            if current == END {
                self.persist(key, &state, Cursor::Finished, steps_total).await?;
                log::info!(
                    "Graph '{}' completed on thread '{}' after {} step(s)",
                    self.id,
                    key.thread,
                    executed
                );
                event::emit(
                    events.as_ref(),
                    GraphEvent::Completed {
                        graph: self.id.clone(),
                        thread: key.thread.clone(),
                    },
                )
                .await;
                return Ok(RunOutcome::Completed(state));
            }

            if executed >= self.max_steps {
                return Err(WorkflowError::StepLimitExceeded {
                    graph: self.id.clone(),
                    limit: self.max_steps,
                }
                .into());
            }

            let step = self
                .steps
                .get(&current)
                .ok_or_else(|| WorkflowError::UnknownStep(current.clone()))?;
            let ctx = StepContext::new(self.id.clone(), key.thread.clone())
                .with_resume(resume.take())
                .with_events(events.clone());

            log::info!("Graph '{}': executing step '{}'", self.id, current);
            ctx.emit(GraphEvent::StepStarted {
                graph: self.id.clone(),
                thread: key.thread.clone(),
                step: current.clone(),
            })
            .await;

            let outcome = step.execute(&state, &ctx).await?;
            executed += 1;
            steps_total += 1;

            match outcome {
                StepOutcome::Suspend(interrupt) => {
                    let cursor = Cursor::Suspended {
                        step: current.clone(),
                        interrupt: interrupt.clone(),
                        raised_at: chrono::Utc::now(),
                    };
                    self.persist(key, &state, cursor, steps_total).await?;
                    log::info!(
                        "Graph '{}' suspended at '{}' on thread '{}'",
                        self.id,
                        current,
                        key.thread
                    );
                    ctx.emit(GraphEvent::Interrupted {
                        graph: self.id.clone(),
                        thread: key.thread.clone(),
                        step: current,
                        message: interrupt.message.clone(),
                    })
                    .await;
                    return Ok(RunOutcome::Interrupted { interrupt, state });
                }
                StepOutcome::Advance(update) => {
                    state.apply(update);
                    ctx.emit(GraphEvent::StepCompleted {
                        graph: self.id.clone(),
                        thread: key.thread.clone(),
                        step: current.clone(),
                    })
                    .await;

                    let next = self.route(&current, &state)?;
                    if self.durability == Durability::Step && next != END {
                        let cursor = Cursor::InFlight {
                            next: next.clone(),
                            origin: origin.clone(),
                        };
                        self.persist(key, &state, cursor, steps_total).await?;
                    }
                    current = next;
                }
            }
        }
    }

    async fn persist(
        &self,
        key: &CheckpointKey,
        state: &GraphState,
        cursor: Cursor,
        steps_total: u64,
    ) -> Result<()> {
        let checkpoint = Checkpoint::new(state.values().clone(), cursor, steps_total);
        self.checkpointer.save(key, &checkpoint).await.map_err(|e| {
            log::error!("Failed to save checkpoint {}: {}", key, e);
            e.into()
        })
    }
}

impl std::fmt::Debug for GraphEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut steps: Vec<&String> = self.steps.keys().collect();
        steps.sort();
        f.debug_struct("GraphEngine")
            .field("id", &self.id)
            .field("entry", &self.entry)
            .field("steps", &steps)
            .field("max_steps", &self.max_steps)
            .field("durability", &self.durability)
            .finish()
    }
}
