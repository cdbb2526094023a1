// SPDX-License-Identifier: MIT

//! Interrupt protocol shared by every nesting level
//!
//! A suspension carries one opaque prompt for the caller; a resume carries
//! one opaque answer. Adapters relay interrupts without touching the
//! message, so the caller at the root cannot tell how deep the pause
//! originated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::adk::error::ProtocolError;

use crate::adk::error::Result;
use crate::adk::message::Message;
use crate::voyage::workflow::graph::{Step, StepContext, StepOutcome};
use crate::voyage::workflow::state::GraphState;

/// A request for external input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    pub message: String,
}

impl Interrupt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The caller's answer to exactly one pending interrupt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume(pub String);

impl Resume {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// The resume value as the next conversational turn
    pub fn as_turn(&self) -> Message {
        Message::human(self.0.clone())
    }
}

/// Asks the caller for input, using a prompt written to state by an earlier step.
///
/// Resuming satisfies the step: the engine records the answer in the
/// history field and follows this step's edges.
pub struct InterruptStep {
    prompt_field: String,
    fallback: String,
}

impl InterruptStep {
    pub fn from_field(prompt_field: &str) -> Self {
        Self {
            prompt_field: prompt_field.to_string(),
            fallback: "Could you tell me more?".to_string(),
        }
    }

    /// Prompt used when the field is empty
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

#[async_trait]
impl Step for InterruptStep {
    async fn execute(&self, state: &GraphState, _ctx: &StepContext) -> Result<StepOutcome> {
        let prompt = state
            .get_str(&self.prompt_field)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.fallback);
        Ok(StepOutcome::Suspend(Interrupt::new(prompt)))
    }
}
