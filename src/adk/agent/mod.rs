// SPDX-License-Identifier: MIT

//! Agent module - the collaborator boundary used by workflow steps
//!
//! An agent receives an ordered message history and answers with a
//! structured record conforming to its declared output schema. Steps decide
//! what to do with the record; agents never see workflow state.

mod llm;

pub use llm::LLMAgent;

use crate::adk::error::{Result, VoyageError};
use crate::adk::message::Message;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Core agent trait for all agent types
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    /// Produce a structured record for the conversation so far
    async fn invoke(&self, messages: &[Message]) -> Result<Value>;
}

/// Invoke `agent` and decode its record into `T`.
///
/// A record that does not fit `T` is a validation failure, not a
/// collaborator failure.
pub async fn invoke_as<T: DeserializeOwned>(agent: &dyn Agent, messages: &[Message]) -> Result<T> {
    let record = agent.invoke(messages).await?;
    serde_json::from_value(record).map_err(|e| VoyageError::validation(agent.name(), e.to_string()))
}
