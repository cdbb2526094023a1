// SPDX-License-Identifier: MIT

//! Environment-driven application configuration

use std::path::PathBuf;
use std::sync::Arc;

use crate::adk::error::{Result, VoyageError};
use crate::voyage::tools::Catalog;
use crate::voyage::travel::GraphSettings;
use crate::voyage::workflow::agent_factory::ModelSettings;
use crate::voyage::workflow::checkpoint::{Checkpointer, FileStore};
use crate::voyage::workflow::graph::{Durability, DEFAULT_MAX_STEPS};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PORT: u16 = 8585;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub model_name: String,
    pub openai_base_url: Option<String>,
    pub agents_dir: PathBuf,
    /// `None` keeps checkpoints in memory
    pub checkpoint_dir: Option<PathBuf>,
    pub max_steps: usize,
    pub durability: Durability,
    /// Plan queries without calling the model
    pub planning_stub: bool,
    /// Stop the travel system after planning
    pub planning_only: bool,
    pub brave_api_key: Option<String>,
    /// Flight and hotel inventory; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            openai_base_url: None,
            agents_dir: PathBuf::from("agents"),
            checkpoint_dir: None,
            max_steps: DEFAULT_MAX_STEPS,
            durability: Durability::default(),
            planning_stub: false,
            planning_only: false,
            brave_api_key: None,
            catalog_path: None,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str| get(key).is_some_and(|v| v.trim() == "1");
        let defaults = Self::default();

        let max_steps = match get("VOYAGE_MAX_STEPS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                VoyageError::config(format!("VOYAGE_MAX_STEPS '{}': {}", raw, e))
            })?,
            None => defaults.max_steps,
        };
        if max_steps == 0 {
            return Err(VoyageError::config("VOYAGE_MAX_STEPS must be at least 1"));
        }

        let port = match get("VOYAGE_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| VoyageError::config(format!("VOYAGE_PORT '{}': {}", raw, e)))?,
            None => defaults.port,
        };

        let durability = match get("VOYAGE_DURABILITY") {
            Some(raw) => raw.parse()?,
            None => defaults.durability,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            model_name: get("OPENAI_MODEL_NAME").unwrap_or(defaults.model_name),
            openai_base_url: get("OPENAI_BASE_URL"),
            agents_dir: get("VOYAGE_AGENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.agents_dir),
            checkpoint_dir: get("VOYAGE_CHECKPOINT_DIR").map(PathBuf::from),
            max_steps,
            durability,
            planning_stub: flag("PLANNING_STUB"),
            planning_only: flag("PLANNING_ONLY"),
            brave_api_key: get("BRAVE_API_KEY"),
            catalog_path: get("VOYAGE_CATALOG").map(PathBuf::from),
            port,
        })
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            api_key: self.openai_api_key.clone(),
            model_name: self.model_name.clone(),
            base_url: self.openai_base_url.clone(),
        }
    }

    pub fn graph_settings(&self) -> GraphSettings {
        GraphSettings {
            max_steps: self.max_steps,
            durability: self.durability,
        }
    }

    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }

    /// Process-wide checkpointer; file-backed when a directory is configured
    pub fn checkpointer(&self) -> Checkpointer {
        match &self.checkpoint_dir {
            Some(dir) => {
                log::info!("Checkpoints stored under {}", dir.display());
                Checkpointer::new(Arc::new(FileStore::new(dir.clone())))
            }
            None => {
                log::info!("Checkpoints kept in memory");
                Checkpointer::in_memory()
            }
        }
    }
}
