// SPDX-License-Identifier: MIT

use crate::adk::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools an agent may call while producing its answer.
///
/// `name()`, `description()` and `schema()` return borrowed data; store them
/// in struct fields or statics.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique within an agent's tool set
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the tool's input parameters
    fn schema(&self) -> &Value;

    async fn execute(&self, input: Value) -> Result<Value>;
}
