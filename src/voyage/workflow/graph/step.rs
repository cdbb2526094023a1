// SPDX-License-Identifier: MIT

//! Step executor contract

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;

use super::event::{EventSender, GraphEvent};
use crate::adk::error::Result;
use crate::voyage::workflow::interrupt::Interrupt;
use crate::voyage::workflow::state::{GraphState, StateUpdate};

/// What one step execution produced
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Merge the partial state and follow the step's edges
    Advance(StateUpdate),
    /// Halt the graph and surface the interrupt to the caller
    Suspend(Interrupt),
}

impl StepOutcome {
    pub fn advance(update: StateUpdate) -> Self {
        Self::Advance(update)
    }

    pub fn suspend(message: impl Into<String>) -> Self {
        Self::Suspend(Interrupt::new(message))
    }
}

/// How a suspended step is satisfied by a resume value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumeMode {
    /// The step counts as done; the engine evaluates its edges
    #[default]
    Advance,
    /// The step runs again with the value in [`StepContext::resume`]
    Reenter,
}

/// Per-execution information handed to a step
#[derive(Debug, Clone)]
pub struct StepContext {
    pub graph: String,
    pub thread_id: String,
    /// Present only when a `Reenter` step is being resumed
    pub resume: Option<String>,
    events: Option<EventSender>,
}

impl StepContext {
    pub fn new(graph: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            thread_id: thread_id.into(),
            resume: None,
            events: None,
        }
    }

    pub fn with_resume(mut self, resume: Option<String>) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_events(mut self, events: Option<EventSender>) -> Self {
        self.events = events;
        self
    }

    /// Event channel of the invocation, passed on to nested graphs
    pub fn events(&self) -> Option<EventSender> {
        self.events.clone()
    }

    pub async fn emit(&self, event: GraphEvent) {
        super::event::emit(self.events.as_ref(), event).await;
    }
}

/// A named unit of work in a graph
#[async_trait]
pub trait Step: Send + Sync {
    async fn execute(&self, state: &GraphState, ctx: &StepContext) -> Result<StepOutcome>;

    fn resume_mode(&self) -> ResumeMode {
        ResumeMode::Advance
    }
}

type AsyncStepFn =
    dyn Fn(GraphState, StepContext) -> BoxFuture<'static, Result<StepOutcome>> + Send + Sync;
type SyncStepFn = dyn Fn(&GraphState, &StepContext) -> Result<StepOutcome> + Send + Sync;

enum StepFn {
    Async(Box<AsyncStepFn>),
    Sync(Box<SyncStepFn>),
}

/// A step built from a closure
pub struct FnStep {
    f: StepFn,
    mode: ResumeMode,
}

impl FnStep {
    /// Async closure; receives owned copies of the state and context
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(GraphState, StepContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StepOutcome>> + Send + 'static,
    {
        Self {
            f: StepFn::Async(Box::new(move |state, ctx| Box::pin(f(state, ctx)))),
            mode: ResumeMode::Advance,
        }
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&GraphState, &StepContext) -> Result<StepOutcome> + Send + Sync + 'static,
    {
        Self {
            f: StepFn::Sync(Box::new(f)),
            mode: ResumeMode::Advance,
        }
    }

    /// Re-run this step on resume instead of advancing past it
    pub fn reentrant(mut self) -> Self {
        self.mode = ResumeMode::Reenter;
        self
    }
}

#[async_trait]
impl Step for FnStep {
    async fn execute(&self, state: &GraphState, ctx: &StepContext) -> Result<StepOutcome> {
        match &self.f {
            StepFn::Async(f) => f(state.clone(), ctx.clone()).await,
            StepFn::Sync(f) => f(state, ctx),
        }
    }

    fn resume_mode(&self) -> ResumeMode {
        self.mode
    }
}
