// SPDX-License-Identifier: MIT

//! Agent factory - constructs agents from definitions
//!
//! This module handles the creation of Agent instances from AgentManifest
//! configurations, including model instantiation, tool binding and the
//! structured output schema the calling step expects.

use crate::adk::agent::{Agent, LLMAgent};
use crate::adk::error::{Result, VoyageError};
use crate::adk::model::openai::OpenAIModel;
use crate::adk::model::{Model, ResponseSchema};
use crate::voyage::workflow::registry::ToolRegistry;
use crate::voyage::workflow::types::AgentManifest;

use std::sync::Arc;

/// Credentials and defaults for the model provider
#[derive(Debug, Clone, Default)]
pub struct ModelSettings {
    pub api_key: Option<String>,
    /// Used when a manifest names no model
    pub model_name: String,
    pub base_url: Option<String>,
}

/// Factory for creating Agent instances from manifests
pub struct AgentFactory<'a> {
    registry: &'a ToolRegistry,
    settings: ModelSettings,
}

impl<'a> AgentFactory<'a> {
    pub fn new(registry: &'a ToolRegistry, settings: ModelSettings) -> Self {
        Self { registry, settings }
    }

    /// Build an agent whose answers must follow `schema`
    pub fn build(&self, manifest: &AgentManifest, schema: ResponseSchema) -> Result<Arc<dyn Agent>> {
        let model = self.create_model(manifest)?;
        let tools = self.registry.resolve(&manifest.agent.tools)?;

        log::info!(
            "Building agent '{}' with {} tool(s)",
            manifest.name,
            tools.len()
        );

        let mut agent = LLMAgent::new(
            manifest.name.clone(),
            manifest.description.clone(),
            manifest.agent.instructions.clone(),
            model,
            tools,
        )
        .with_output_schema(schema)
        .with_temperature(manifest.agent.model.temperature());
        if let Some(max_turns) = manifest.agent.max_turns {
            agent = agent.with_max_turns(max_turns);
        }
        Ok(Arc::new(agent))
    }

    /// Create the model instance for an agent
    fn create_model(&self, manifest: &AgentManifest) -> Result<Arc<dyn Model>> {
        let model_name = manifest
            .agent
            .model
            .model_name
            .clone()
            .unwrap_or_else(|| self.settings.model_name.clone());

        // Explicit definition > model name prefix
        let provider = manifest
            .agent
            .model
            .provider
            .clone()
            .unwrap_or_else(|| infer_provider_from_model(&model_name));

        log::debug!("Using provider '{}' with model '{}'", provider, model_name);

        match provider.as_str() {
            "OpenAI" | "openai" | "" => {
                let api_key = self.settings.api_key.clone().ok_or_else(|| {
                    VoyageError::config(format!(
                        "OPENAI_API_KEY is required to build agent '{}'",
                        manifest.name
                    ))
                })?;
                Ok(Arc::new(OpenAIModel::new(
                    api_key,
                    model_name,
                    self.settings.base_url.clone(),
                )?))
            }
            _ => Err(VoyageError::config(format!(
                "Unknown model provider '{}' for agent '{}'",
                provider, manifest.name
            ))),
        }
    }
}

/// Infer the provider from the model name prefix
///
/// Unrecognised names fall back to OpenAI, which also serves any
/// compatible endpoint configured through the base URL.
pub fn infer_provider_from_model(model_name: &str) -> String {
    let name_lower = model_name.to_lowercase();
    if name_lower.starts_with("gemini") || name_lower.starts_with("models/gemini") {
        "Gemini".to_string()
    } else if name_lower.starts_with("claude") {
        "Anthropic".to_string()
    } else {
        "OpenAI".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voyage::workflow::loader::AgentLoader;
    use serde_json::json;

    fn settings(api_key: Option<&str>) -> ModelSettings {
        ModelSettings {
            api_key: api_key.map(str::to_string),
            model_name: "gpt-4o-mini".to_string(),
            base_url: None,
        }
    }

    fn schema() -> ResponseSchema {
        ResponseSchema {
            name: "answer".to_string(),
            schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_infer_provider_from_model() {
        assert_eq!(infer_provider_from_model("gpt-4o"), "OpenAI");
        assert_eq!(infer_provider_from_model("o3-mini"), "OpenAI");
        assert_eq!(infer_provider_from_model("gemini-2.0-flash"), "Gemini");
        assert_eq!(infer_provider_from_model("claude-sonnet"), "Anthropic");
    }

    #[test]
    fn test_build_agent_from_manifest() {
        let registry = ToolRegistry::new();
        let factory = AgentFactory::new(&registry, settings(Some("sk-test")));
        let manifest = AgentLoader::parse_yaml(
            "kind: Agent\nname: booker\nagent:\n  instructions: Book.\n  max_turns: 2\n",
        )
        .unwrap();

        let agent = factory.build(&manifest, schema()).unwrap();
        assert_eq!(agent.name(), "booker");
    }

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let registry = ToolRegistry::new();
        let factory = AgentFactory::new(&registry, settings(None));
        let manifest =
            AgentLoader::parse_yaml("kind: Agent\nname: planner\nagent:\n  instructions: Plan.\n")
                .unwrap();

        let err = factory.build(&manifest, schema()).err().unwrap();
        assert_eq!(err.kind(), "configuration_error");
    }

    #[test]
    fn test_unsupported_provider_rejected() {
        let registry = ToolRegistry::new();
        let factory = AgentFactory::new(&registry, settings(Some("sk-test")));
        let manifest = AgentLoader::parse_yaml(
            "kind: Agent\nname: planner\nagent:\n  instructions: Plan.\n  model:\n    model_name: gemini-2.0-flash\n",
        )
        .unwrap();

        let err = factory.build(&manifest, schema()).err().unwrap();
        assert!(err.to_string().contains("Gemini"));
    }

    #[test]
    fn test_required_tool_must_be_registered() {
        let registry = ToolRegistry::new();
        let factory = AgentFactory::new(&registry, settings(Some("sk-test")));
        let manifest = AgentLoader::parse_yaml(
            "kind: Agent\nname: planner\nagent:\n  instructions: Plan.\n  tools:\n    - web_search\n",
        )
        .unwrap();

        let err = factory.build(&manifest, schema()).err().unwrap();
        assert!(matches!(err, VoyageError::ToolNotFound { .. }));

        let manifest = AgentLoader::parse_yaml(
            "kind: Agent\nname: planner\nagent:\n  instructions: Plan.\n  tools:\n    - web_search?\n",
        )
        .unwrap();
        assert!(factory.build(&manifest, schema()).is_ok());
    }
}
