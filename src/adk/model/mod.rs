// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and shared types
//!
//! Model implementations live in their own submodules:
//! - [openai] - OpenAI chat completions API (and compatible endpoints)

pub mod openai;

use crate::adk::error::Result;
use crate::adk::message::{Message, Role};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    /// JSON schema the final answer must conform to
    pub response_schema: Option<ResponseSchema>,
}

/// Named JSON schema for structured output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

impl ResponseSchema {
    /// Schema derived from a Rust type
    pub fn for_type<T: schemars::JsonSchema>(name: &str) -> Result<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(T))?;
        Ok(Self {
            name: name.to_string(),
            schema,
        })
    }
}

/// A message in the model conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Parts of a message - text, function calls and their results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Function/tool call requested by the model
    FunctionCall {
        /// Provider-assigned call id, echoed back with the response
        id: Option<String>,
        name: String,
        args: Value,
    },
    /// Response from executing a function/tool
    FunctionResponse {
        id: Option<String>,
        name: String,
        response: Value,
    },
}

impl Content {
    pub fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

impl From<&Message> for Content {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::System => "system",
            Role::Human => "user",
            Role::Ai => "model",
        };
        Content::text(role, message.content.clone())
    }
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content>;
}
