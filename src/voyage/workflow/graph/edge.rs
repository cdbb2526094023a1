// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::adk::error::WorkflowError;
use crate::voyage::workflow::condition::{self, Expression};
use crate::voyage::workflow::state::GraphState;

/// Pseudo-step every graph is entered from
pub const START: &str = "__start__";
/// Pseudo-step that marks a finished graph
pub const END: &str = "__end__";

type GuardFn = dyn Fn(&GraphState) -> bool + Send + Sync;

/// Predicate deciding whether an edge may be taken
#[derive(Clone)]
pub enum Guard {
    /// Parsed guard expression, e.g. `requirements_complete == false`
    Expr { source: String, expr: Expression },
    /// Arbitrary predicate, labelled for logs and errors
    Fn { label: String, f: Arc<GuardFn> },
}

impl Guard {
    pub fn parse(source: &str) -> Result<Self, WorkflowError> {
        let expr = condition::parse(source).map_err(|e| WorkflowError::InvalidGuard {
            expr: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::Expr {
            source: source.to_string(),
            expr,
        })
    }

    pub fn from_fn<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&GraphState) -> bool + Send + Sync + 'static,
    {
        Self::Fn {
            label: label.into(),
            f: Arc::new(f),
        }
    }

    pub fn matches(&self, state: &GraphState) -> bool {
        match self {
            Self::Expr { expr, .. } => condition::evaluate(expr, state),
            Self::Fn { f, .. } => f(state),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Expr { source, .. } => source,
            Self::Fn { label, .. } => label,
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guard").field(&self.label()).finish()
    }
}

/// A transition between two steps
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// `None` for an unconditional edge
    pub guard: Option<Guard>,
}

impl Edge {
    pub fn always(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            guard: None,
        }
    }

    pub fn guarded(from: impl Into<String>, to: impl Into<String>, guard: Guard) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            guard: Some(guard),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.guard.is_none()
    }
}

/// Pick the next step out of `from`
///
/// Guarded edges must be mutually exclusive: more than one match is
/// reported instead of silently taking the first.
pub fn route(from: &str, edges: &[Edge], state: &GraphState) -> Result<String, WorkflowError> {
    if let [only] = edges {
        if only.is_unconditional() {
            return Ok(only.to.clone());
        }
    }

    let targets: Vec<&Edge> = edges
        .iter()
        .filter(|e| e.guard.as_ref().is_some_and(|g| g.matches(state)))
        .collect();

    match targets.as_slice() {
        [] => Err(WorkflowError::NoRoute(from.to_string())),
        [edge] => Ok(edge.to.clone()),
        many => Err(WorkflowError::AmbiguousRoute {
            step: from.to_string(),
            targets: many.iter().map(|e| e.to.clone()).collect(),
        }),
    }
}
