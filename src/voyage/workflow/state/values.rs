// SPDX-License-Identifier: MIT

//! Runtime state storage for workflow execution

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::schema::{Reducer, StateSchema};
use crate::adk::message::Message;

/// A partial state produced by one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateUpdate(Map<String, Value>);

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` to `key`, replacing anything set earlier in this update
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Add one message to the sequence carried under `key`
    pub fn message(mut self, key: &str, message: Message) -> Self {
        let entry = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(vec![]));
        match entry {
            Value::Array(items) => items.push(message.to_value()),
            other => *other = Value::Array(vec![other.take(), message.to_value()]),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl IntoIterator for StateUpdate {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Accumulated workflow state with reducer support
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    values: Map<String, Value>,
    reducers: HashMap<String, Reducer>,
}

impl GraphState {
    /// Create state holding the schema's defaults
    pub fn new(schema: &StateSchema) -> Self {
        let mut values = Map::new();
        let mut reducers = HashMap::new();

        for (name, def) in &schema.fields {
            if let Some(default) = &def.default {
                values.insert(name.clone(), default.clone());
            }
            reducers.insert(name.clone(), def.reducer);
        }

        Self { values, reducers }
    }

    /// Rebuild state from persisted values
    pub fn restore(schema: &StateSchema, values: Map<String, Value>) -> Self {
        let mut state = Self::new(schema);
        state.values.extend(values);
        state
    }

    /// Create an empty state where every field replaces
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge a step's partial update using each field's reducer
    pub fn apply(&mut self, update: StateUpdate) {
        for (key, value) in update {
            self.update(&key, value);
        }
    }

    /// Update a single field using its reducer
    ///
    /// Appending never discards accumulated entries: a non-array value that
    /// somehow sits in an append field is kept as the first element.
    pub fn update(&mut self, key: &str, value: Value) {
        let reducer = self.reducers.get(key).copied().unwrap_or_default();

        match reducer {
            Reducer::Replace => {
                self.values.insert(key.to_string(), value);
            }
            Reducer::Append => {
                if value.is_null() {
                    return;
                }
                let slot = self
                    .values
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Array(vec![]));
                if !slot.is_array() {
                    let previous = slot.take();
                    *slot = Value::Array(if previous.is_null() {
                        vec![]
                    } else {
                        vec![previous]
                    });
                }
                if let Value::Array(items) = slot {
                    match value {
                        Value::Array(new_items) => items.extend(new_items),
                        other => items.push(other),
                    }
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a nested field value using dot notation (e.g., "requirements.destination")
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    /// String value of a field, if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Decode the messages held in a history field
    pub fn messages(&self, key: &str) -> Vec<Message> {
        Message::list_from_value(self.get(key))
    }

    /// Field value, treating JSON null as absent
    pub fn present(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}
