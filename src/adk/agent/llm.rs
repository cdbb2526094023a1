// SPDX-License-Identifier: MIT

//! LLM Agent - tool-calling loop that ends in a structured JSON answer
//!
//! The agent sends the conversation to the model, executes any tool calls
//! the model requests, and stops at the first text answer. That answer must
//! be a JSON object; anything else is a validation failure.

use super::Agent;
use crate::adk::error::{Result, VoyageError};
use crate::adk::message::Message;
use crate::adk::model::{Content, GenerationConfig, Model, Part, ResponseSchema};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_MAX_TURNS: u32 = 10;

/// LLM agent with tool calling and structured output
pub struct LLMAgent {
    pub name: String,
    pub description: String,
    pub instruction: String,
    pub model: Arc<dyn Model>,
    pub tools: Vec<Arc<dyn Tool>>,
    config: GenerationConfig,
    max_turns: u32,
    /// HashMap for O(1) tool lookups
    tool_map: HashMap<String, usize>,
}

impl LLMAgent {
    pub fn new(
        name: String,
        description: String,
        instruction: String,
        model: Arc<dyn Model>,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Self {
        let tool_map: HashMap<String, usize> = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name().to_string(), i))
            .collect();

        Self {
            name,
            description,
            instruction,
            model,
            tools,
            config: GenerationConfig::default(),
            max_turns: DEFAULT_MAX_TURNS,
            tool_map,
        }
    }

    /// Require answers to follow `schema`
    pub fn with_output_schema(mut self, schema: ResponseSchema) -> Self {
        self.config.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    fn get_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tool_map.get(name).map(|&i| &self.tools[i])
    }

    async fn call_tool(&self, name: &str, args: &Value) -> Value {
        match self.get_tool(name) {
            Some(tool) => match tool.execute(args.clone()).await {
                Ok(res) => res,
                Err(e) => {
                    log::error!("Agent {} tool {} failed: {}", self.name, name, e);
                    serde_json::json!({ "error": e.to_string() })
                }
            },
            None => {
                log::error!("Agent {} requested unknown tool {}", self.name, name);
                serde_json::json!({ "error": format!("Tool {} not found", name) })
            }
        }
    }

    /// Parse the final answer into a JSON object
    fn parse_answer(&self, text: &str) -> Result<Value> {
        let body = strip_code_fence(text);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| VoyageError::validation(&self.name, format!("answer is not JSON: {}", e)))?;
        if !value.is_object() {
            return Err(VoyageError::validation(
                &self.name,
                "answer is not a JSON object",
            ));
        }
        Ok(value)
    }
}

/// Remove a surrounding ```json fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait]
impl Agent for LLMAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, messages: &[Message]) -> Result<Value> {
        let mut history = Vec::with_capacity(messages.len() + 1);
        history.push(Content::text("system", self.instruction.clone()));
        history.extend(messages.iter().map(Content::from));

        for turn in 0..self.max_turns {
            log::info!("Agent {} turn {}/{}", self.name, turn + 1, self.max_turns);
            let response = self
                .model
                .generate_content(&history, Some(&self.config), Some(&self.tools))
                .await
                .map_err(|e| VoyageError::collaborator(&self.name, e.to_string()))?;

            let calls: Vec<(Option<String>, String, Value)> = response
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::FunctionCall { id, name, args } => {
                        Some((id.clone(), name.clone(), args.clone()))
                    }
                    _ => None,
                })
                .collect();

            if calls.is_empty() {
                let text = response.joined_text();
                if text.trim().is_empty() {
                    return Err(VoyageError::validation(&self.name, "empty answer"));
                }
                log::debug!("Agent {} answered ({} bytes)", self.name, text.len());
                return self.parse_answer(&text);
            }

            let mut results = Vec::with_capacity(calls.len());
            for (id, name, args) in calls {
                log::info!("Agent {} tool call: {} {}", self.name, name, args);
                let response = self.call_tool(&name, &args).await;
                results.push(Part::FunctionResponse { id, name, response });
            }

            history.push(response);
            history.push(Content {
                role: "user".to_string(),
                parts: results,
            });
        }

        log::error!("Agent {} reached max turns without an answer", self.name);
        Err(VoyageError::MaxIterations {
            kind: "agent turns".to_string(),
            limit: self.max_turns,
        })
    }
}
