// SPDX-License-Identifier: MIT

//! YAML schema types for agent definitions
//!
//! Each collaborator of the travel pipeline is described by one file under
//! the agents directory:
//!
//! ```yaml
//! kind: Agent
//! name: requirements
//! description: Gathers trip requirements
//! agent:
//!   instructions: |
//!     You collect travel requirements...
//!   model:
//!     model_name: gpt-4o-mini
//!     parameters:
//!       temperature: 0.2
//!   tools: []
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Top-level agent file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentManifest {
    /// Always `Agent`; reserved for other document kinds
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub agent: AgentDefinition,
}

/// How the agent talks to its model
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefinition {
    pub instructions: String,
    #[serde(default)]
    pub model: ModelDefinition,
    /// Names resolved against the tool registry
    #[serde(default)]
    pub tools: Vec<String>,
    /// Upper bound on model calls per invocation
    pub max_turns: Option<u32>,
}

/// Model configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ModelDefinition {
    /// Inferred from the model name when absent
    pub provider: Option<String>,
    pub model_name: Option<String>,
    pub parameters: Option<HashMap<String, Value>>,
}

impl ModelDefinition {
    pub fn temperature(&self) -> Option<f32> {
        self.parameters
            .as_ref()?
            .get("temperature")?
            .as_f64()
            .map(|t| t as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_temperature_parameter() {
        let mut parameters = HashMap::new();
        parameters.insert("temperature".to_string(), json!(0.5));
        let model = ModelDefinition {
            parameters: Some(parameters),
            ..Default::default()
        };
        assert_eq!(model.temperature(), Some(0.5));
        assert_eq!(ModelDefinition::default().temperature(), None);
    }

    #[test]
    fn test_non_numeric_temperature_is_ignored() {
        let mut parameters = HashMap::new();
        parameters.insert("temperature".to_string(), json!("hot"));
        let model = ModelDefinition {
            parameters: Some(parameters),
            ..Default::default()
        };
        assert_eq!(model.temperature(), None);
    }
}
