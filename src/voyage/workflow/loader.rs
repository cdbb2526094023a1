// SPDX-License-Identifier: MIT

//! Agent loader - YAML file loading and parsing
//!
//! Definitions are read from `<agents dir>/<name>.yaml`. When no such file
//! exists the definition shipped with the binary is used instead.

use super::types::AgentManifest;
use crate::adk::error::{Result, VoyageError};
use std::path::{Path, PathBuf};

const BUILTIN: &[(&str, &str)] = &[
    ("requirements", include_str!("../../../agents/requirements.yaml")),
    ("planning", include_str!("../../../agents/planning.yaml")),
    ("planner", include_str!("../../../agents/planner.yaml")),
    ("booker", include_str!("../../../agents/booker.yaml")),
];

/// Loads agent manifests from a directory
#[derive(Debug, Clone)]
pub struct AgentLoader {
    dir: PathBuf,
}

impl AgentLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the manifest for `name`
    pub fn load(&self, name: &str) -> Result<AgentManifest> {
        let path = self.dir.join(format!("{}.yaml", name));
        if path.is_file() {
            log::debug!("Loading agent '{}' from {}", name, path.display());
            let content = std::fs::read_to_string(&path)?;
            return Self::parse_yaml(&content).map_err(|e| {
                VoyageError::config(format!("{}: {}", path.display(), e))
            });
        }

        let (_, content) = BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| {
                VoyageError::config(format!(
                    "agent '{}' not found in {} and has no built-in definition",
                    name,
                    self.dir.display()
                ))
            })?;
        log::debug!("Using built-in definition for agent '{}'", name);
        Self::parse_yaml(content)
    }

    /// Parse and check a manifest from a YAML string
    pub fn parse_yaml(content: &str) -> Result<AgentManifest> {
        let manifest: AgentManifest = serde_yaml::from_str(content)?;
        if manifest.kind != "Agent" {
            return Err(VoyageError::config(format!(
                "'{}' has kind '{}', expected 'Agent'",
                manifest.name, manifest.kind
            )));
        }
        if manifest.agent.instructions.trim().is_empty() {
            return Err(VoyageError::config(format!(
                "agent '{}' has empty instructions",
                manifest.name
            )));
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent() {
        let yaml = r#"
kind: Agent
name: planner
description: "Builds itineraries"

agent:
  instructions: "You plan trips."
  model:
    provider: OpenAI
    model_name: gpt-4o
    parameters:
      temperature: 0.5
  tools:
    - web_search?
  max_turns: 4
"#;
        let manifest = AgentLoader::parse_yaml(yaml).unwrap();
        assert_eq!(manifest.name, "planner");
        assert_eq!(manifest.agent.instructions, "You plan trips.");
        assert_eq!(manifest.agent.model.provider.as_deref(), Some("OpenAI"));
        assert_eq!(manifest.agent.model.temperature(), Some(0.5));
        assert_eq!(manifest.agent.tools, vec!["web_search?"]);
        assert_eq!(manifest.agent.max_turns, Some(4));
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let yaml = r#"
kind: Agent
name: booker
agent:
  instructions: "Book things."
"#;
        let manifest = AgentLoader::parse_yaml(yaml).unwrap();
        assert!(manifest.agent.tools.is_empty());
        assert!(manifest.agent.model.model_name.is_none());
        assert_eq!(manifest.description, "");
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let yaml = r#"
kind: Composite
name: x
agent:
  instructions: "y"
"#;
        let err = AgentLoader::parse_yaml(yaml).unwrap_err();
        assert_eq!(err.kind(), "configuration_error");
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let yaml = r#"
kind: Agent
name:
  - invalid structure
"#;
        assert!(AgentLoader::parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_builtin_definitions_parse() {
        let loader = AgentLoader::new("/nonexistent/agents");
        for name in ["requirements", "planning", "planner", "booker"] {
            let manifest = loader.load(name).unwrap();
            assert_eq!(manifest.name, name);
        }
        assert!(loader.load("concierge").is_err());
    }

    #[test]
    fn test_directory_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("planning.yaml"),
            "kind: Agent\nname: planning\nagent:\n  instructions: custom\n",
        )
        .unwrap();

        let manifest = AgentLoader::new(dir.path()).load("planning").unwrap();
        assert_eq!(manifest.agent.instructions, "custom");
    }
}
