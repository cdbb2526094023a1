// SPDX-License-Identifier: MIT

use crate::adk::error::{Result, VoyageError};
use crate::adk::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// Tools agents may reference by name, fixed at startup
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        if self.tools.insert(tool.name().to_string(), tool.clone()).is_some() {
            log::warn!("Tool '{}' registered twice; keeping the last", tool.name());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up every name an agent asks for
    ///
    /// A name ending in `?` is optional and skipped when not registered;
    /// any other unknown name is an error.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Arc<dyn Tool>>> {
        let mut tools = Vec::with_capacity(names.len());
        for raw in names {
            let (name, optional) = match raw.strip_suffix('?') {
                Some(name) => (name, true),
                None => (raw.as_str(), false),
            };
            match self.get(name) {
                Some(tool) => tools.push(tool),
                None if optional => log::info!("Optional tool '{}' is not configured", name),
                None => return Err(VoyageError::tool_not_found(name)),
            }
        }
        Ok(tools)
    }
}
