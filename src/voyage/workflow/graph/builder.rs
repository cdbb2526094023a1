// SPDX-License-Identifier: MIT

//! Declarative construction and validation of graphs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::edge::{Edge, Guard, END, START};
use super::engine::{Durability, GraphEngine, DEFAULT_MAX_STEPS};
use super::step::Step;
use crate::adk::error::WorkflowError;
use crate::voyage::workflow::checkpoint::Checkpointer;
use crate::voyage::workflow::state::{GraphState, StateSchema};

enum PendingGuard {
    None,
    Expr(String),
    Ready(Guard),
}

struct PendingEdge {
    from: String,
    to: String,
    guard: PendingGuard,
}

/// Builder for a [`GraphEngine`]
///
/// Guard expressions are parsed and the wiring is checked in
/// [`GraphBuilder::build`], so a malformed graph never starts running.
pub struct GraphBuilder {
    id: String,
    schema: StateSchema,
    history: Option<String>,
    steps: Vec<(String, Arc<dyn Step>)>,
    edges: Vec<PendingEdge>,
    max_steps: usize,
    durability: Durability,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schema: StateSchema::default(),
            history: None,
            steps: Vec::new(),
            edges: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
            durability: Durability::default(),
        }
    }

    pub fn state(mut self, schema: StateSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Field that receives resume values as human turns
    pub fn history(mut self, field: &str) -> Self {
        self.history = Some(field.to_string());
        self
    }

    pub fn step(self, name: &str, step: impl Step + 'static) -> Self {
        self.shared_step(name, Arc::new(step))
    }

    pub fn shared_step(mut self, name: &str, step: Arc<dyn Step>) -> Self {
        self.steps.push((name.to_string(), step));
        self
    }

    /// Unconditional edge
    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push(PendingEdge {
            from: from.to_string(),
            to: to.to_string(),
            guard: PendingGuard::None,
        });
        self
    }

    /// Edge guarded by an expression such as `requirements_complete == true`
    pub fn conditional_edge(mut self, from: &str, expr: &str, to: &str) -> Self {
        self.edges.push(PendingEdge {
            from: from.to_string(),
            to: to.to_string(),
            guard: PendingGuard::Expr(expr.to_string()),
        });
        self
    }

    /// Edge guarded by a predicate
    pub fn guarded_edge<F>(mut self, from: &str, label: &str, predicate: F, to: &str) -> Self
    where
        F: Fn(&GraphState) -> bool + Send + Sync + 'static,
    {
        self.edges.push(PendingEdge {
            from: from.to_string(),
            to: to.to_string(),
            guard: PendingGuard::Ready(Guard::from_fn(label, predicate)),
        });
        self
    }

    pub fn max_steps(mut self, limit: usize) -> Self {
        self.max_steps = limit;
        self
    }

    pub fn durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    pub fn build(self, checkpointer: Checkpointer) -> Result<GraphEngine, WorkflowError> {
        let mut steps: HashMap<String, Arc<dyn Step>> = HashMap::new();
        for (name, step) in self.steps {
            if name == START || name == END {
                return Err(WorkflowError::ReservedName(name));
            }
            if steps.insert(name.clone(), step).is_some() {
                return Err(WorkflowError::DuplicateStep(name));
            }
        }

        let mut routes: HashMap<String, Vec<Edge>> = HashMap::new();
        for pending in self.edges {
            if pending.from == END {
                return Err(WorkflowError::ReservedName(pending.from));
            }
            if pending.to == START {
                return Err(WorkflowError::ReservedName(pending.to));
            }
            for endpoint in [&pending.from, &pending.to] {
                if endpoint != START && endpoint != END && !steps.contains_key(endpoint) {
                    return Err(WorkflowError::UnknownStep(endpoint.clone()));
                }
            }
            let guard = match pending.guard {
                PendingGuard::None => None,
                PendingGuard::Expr(expr) => Some(Guard::parse(&expr)?),
                PendingGuard::Ready(guard) => Some(guard),
            };
            routes.entry(pending.from.clone()).or_default().push(Edge {
                from: pending.from,
                to: pending.to,
                guard,
            });
        }

        let entry = match routes.remove(START).as_deref() {
            Some([edge]) if edge.is_unconditional() => edge.to.clone(),
            Some([_, _, ..]) => return Err(WorkflowError::MultipleUnconditional(START.to_string())),
            _ => return Err(WorkflowError::MissingEntry(self.id)),
        };
        if entry == END {
            return Err(WorkflowError::MissingEntry(self.id));
        }

        for name in steps.keys() {
            let edges = routes
                .get(name)
                .ok_or_else(|| WorkflowError::DanglingStep(name.clone()))?;
            let unconditional = edges.iter().filter(|e| e.is_unconditional()).count();
            if unconditional > 1 {
                return Err(WorkflowError::MultipleUnconditional(name.clone()));
            }
            if unconditional == 1 && edges.len() > 1 {
                return Err(WorkflowError::MixedEdges(name.clone()));
            }
        }

        let reachable = reachable_from(&entry, &routes);
        for name in steps.keys().filter(|n| !reachable.contains(n.as_str())) {
            log::warn!("Graph '{}': step '{}' is unreachable", self.id, name);
        }

        log::debug!(
            "Built graph '{}' with {} step(s), entry '{}'",
            self.id,
            steps.len(),
            entry
        );

        Ok(GraphEngine {
            id: self.id,
            schema: self.schema,
            history: self.history,
            steps,
            routes,
            entry,
            max_steps: self.max_steps,
            durability: self.durability,
            checkpointer,
        })
    }
}

fn reachable_from<'a>(entry: &'a str, routes: &'a HashMap<String, Vec<Edge>>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack = vec![entry];
    while let Some(name) = stack.pop() {
        if !seen.insert(name) {
            continue;
        }
        if let Some(edges) = routes.get(name) {
            stack.extend(edges.iter().map(|e| e.to.as_str()));
        }
    }
    seen
}
