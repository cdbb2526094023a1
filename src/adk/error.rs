// SPDX-License-Identifier: MIT

//! Typed error handling for voyage-rs
//!
//! The taxonomy mirrors how a failed turn is reported to the caller:
//! validation failures, interrupt protocol violations, checkpoint store
//! failures and collaborator failures are distinct variants so the transport
//! can map each onto its own response.

use thiserror::Error;

/// Top-level error type for voyage-rs
#[derive(Debug, Error)]
pub enum VoyageError {
    /// API errors from external services (OpenAI, Brave, ...)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Tool not found during agent construction
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph construction and routing errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Suspend/resume protocol violations
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// Checkpoint store failures
    #[error("Checkpoint store failure: {0}")]
    Store(#[from] StoreError),

    /// Model/LLM errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Collaborator output did not match the declared schema
    #[error("Agent '{agent}' returned an invalid structured response: {message}")]
    Validation { agent: String, message: String },

    /// The delegated collaborator call itself failed
    #[error("Agent '{agent}' failed: {message}")]
    Collaborator { agent: String, message: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Max iterations/turns reached
    #[error("Max {kind} reached: {limit}")]
    MaxIterations { kind: String, limit: u32 },

    #[error("{0}")]
    Other(String),
}

/// Graph construction and routing errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Unknown step '{0}'")]
    UnknownStep(String),

    #[error("Step '{0}' declared twice")]
    DuplicateStep(String),

    #[error("Graph '{0}' has no entry edge from START")]
    MissingEntry(String),

    #[error("'{0}' is reserved for the engine")]
    ReservedName(String),

    /// A step mixes guarded and unconditional outgoing edges
    #[error("Step '{0}' mixes guarded and unconditional edges")]
    MixedEdges(String),

    #[error("Step '{0}' has more than one unconditional edge")]
    MultipleUnconditional(String),

    /// A step without outgoing edges
    #[error("Step '{0}' has no outgoing edges")]
    DanglingStep(String),

    #[error("Invalid guard '{expr}': {message}")]
    InvalidGuard { expr: String, message: String },

    /// No guarded edge matched the state after the step ran
    #[error("No edge out of '{0}' matches the current state")]
    NoRoute(String),

    /// More than one guarded edge matched
    #[error("Edges out of '{step}' are not mutually exclusive: {targets:?} all match")]
    AmbiguousRoute { step: String, targets: Vec<String> },

    #[error("Graph '{graph}' exceeded {limit} step executions in one invocation")]
    StepLimitExceeded { graph: String, limit: usize },
}

/// Interrupt protocol violations
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// A resume value arrived but nothing is waiting for one
    #[error("thread '{thread}' of graph '{graph}' has no pending suspension to resume")]
    NoPendingSuspension { graph: String, thread: String },

    /// A new turn arrived while a suspension still awaits its resume value
    #[error("thread '{thread}' of graph '{graph}' is suspended at '{step}' and must be resumed")]
    SuspensionPending {
        graph: String,
        thread: String,
        step: String,
    },

    /// A new turn differs from the request a failed run was started with
    #[error("thread '{thread}' of graph '{graph}' stopped before '{step}' completed; repeat the same request to retry it")]
    RetryPending {
        graph: String,
        thread: String,
        step: String,
    },

    /// A retry was requested but no failed run is waiting for one
    #[error("thread '{thread}' of graph '{graph}' has no failed run to retry")]
    NothingToRetry { graph: String, thread: String },
}

/// Checkpoint store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("checkpoint I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint serialization failed for {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint {key} is corrupt: {message}")]
    Corrupt { key: String, message: String },
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl VoyageError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            agent: agent.into(),
            message: message.into(),
        }
    }

    pub fn collaborator(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Stable, machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol_violation",
            Self::Validation { .. } => "validation_failure",
            Self::Store(_) => "store_failure",
            Self::Collaborator { .. } | Self::Api { .. } | Self::Model(_) | Self::Http(_) => {
                "collaborator_failure"
            }
            Self::Workflow(_) | Self::MaxIterations { .. } => "workflow_error",
            Self::Config(_) | Self::ToolNotFound { .. } => "configuration_error",
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Other(_) => "internal_error",
        }
    }
}

impl From<&str> for VoyageError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for VoyageError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, VoyageError>;
