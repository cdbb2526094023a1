// SPDX-License-Identifier: MIT

//! State schema definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Schema defining the workflow state structure
///
/// Fields that are not declared use [`Reducer::Replace`].
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StateSchema {
    #[serde(flatten)]
    pub fields: HashMap<String, StateFieldDef>,
}

/// Definition of a single state field
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StateFieldDef {
    /// How updates merge into the accumulated value
    #[serde(default)]
    pub reducer: Reducer,
    /// Value the field holds before any step writes it
    pub default: Option<Value>,
}

/// Merge rule for a state field
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Last write wins
    #[default]
    Replace,
    /// Updates are concatenated onto the existing sequence
    Append,
}

impl StateSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an append-only sequence field
    pub fn append(mut self, name: &str) -> Self {
        self.fields.insert(
            name.to_string(),
            StateFieldDef {
                reducer: Reducer::Append,
                default: Some(Value::Array(vec![])),
            },
        );
        self
    }

    /// Declare a replace-on-write field
    pub fn replace(mut self, name: &str) -> Self {
        self.fields.insert(
            name.to_string(),
            StateFieldDef {
                reducer: Reducer::Replace,
                default: None,
            },
        );
        self
    }

    /// Set the initial value of a declared (or new replace) field
    pub fn with_default(mut self, name: &str, value: Value) -> Self {
        self.fields.entry(name.to_string()).or_default().default = Some(value);
        self
    }

    pub fn reducer(&self, name: &str) -> Reducer {
        self.fields
            .get(name)
            .map(|def| def.reducer)
            .unwrap_or_default()
    }
}
