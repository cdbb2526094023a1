// SPDX-License-Identifier: MIT

//! Graph wiring for the requirements loop and the full travel system
//!
//! ```text
//! requirements:   START -> requirements_agent -[complete]-> END
//!                               ^      |
//!                               |   [incomplete]
//!                               |      v
//!                               +-- ask_user (suspends)
//!
//! travel_system:  START -> planning -> requirements -> planner -> booker -> END
//! ```
//!
//! The `requirements` step of the travel system runs its own requirements
//! engine under the graph id `travel_system.requirements`, so its checkpoints
//! never mix with those of the standalone requirements graph.

use serde_json::json;
use std::sync::Arc;

use super::steps::{BookerStep, PlannerStep, PlanningStep, RequirementsStep};
use super::{fields, HISTORY};
use crate::adk::agent::Agent;
use crate::adk::error::Result;
use crate::adk::message::Message;
use crate::voyage::workflow::checkpoint::Checkpointer;
use crate::voyage::workflow::graph::{Durability, GraphBuilder, GraphEngine, DEFAULT_MAX_STEPS, END, START};
use crate::voyage::workflow::interrupt::InterruptStep;
use crate::voyage::workflow::state::{StateSchema, StateUpdate};
use crate::voyage::workflow::subgraph::SubgraphStep;

pub const REQUIREMENTS_GRAPH: &str = "requirements";
pub const TRAVEL_SYSTEM_GRAPH: &str = "travel_system";

/// Engine limits applied to every graph
#[derive(Debug, Clone, Copy)]
pub struct GraphSettings {
    pub max_steps: usize,
    pub durability: Durability,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            durability: Durability::default(),
        }
    }
}

/// Collaborators of the travel system
///
/// `planning: None` runs the planning step without a model.
#[derive(Clone)]
pub struct TravelAgents {
    pub planning: Option<Arc<dyn Agent>>,
    pub requirements: Arc<dyn Agent>,
    pub planner: Arc<dyn Agent>,
    pub booker: Arc<dyn Agent>,
}

pub fn requirements_schema() -> StateSchema {
    StateSchema::new()
        .append(HISTORY)
        .replace(fields::REQUIREMENTS)
        .replace(fields::REQUIREMENTS_COMPLETE)
        .with_default(fields::REQUIREMENTS_COMPLETE, json!(false))
        .replace(fields::INTERRUPTION_MESSAGE)
        .with_default(fields::INTERRUPTION_MESSAGE, json!(""))
}

pub fn travel_system_schema() -> StateSchema {
    StateSchema::new()
        .append(HISTORY)
        .replace(fields::PLAN)
        .replace(fields::SUB_QUERIES)
        .replace(fields::REQUIREMENTS)
        .replace(fields::ITINERARY)
        .replace(fields::BOOKINGS)
}

/// Requirements gathering loop
///
/// Completes once the agent's answer carries no pending question.
pub fn requirements_graph(
    id: &str,
    agent: Arc<dyn Agent>,
    checkpointer: Checkpointer,
    settings: GraphSettings,
) -> Result<GraphEngine> {
    let engine = GraphBuilder::new(id)
        .state(requirements_schema())
        .history(HISTORY)
        .step("requirements_agent", RequirementsStep::new(agent))
        .step(
            "ask_user",
            InterruptStep::from_field(fields::INTERRUPTION_MESSAGE),
        )
        .edge(START, "requirements_agent")
        .conditional_edge("requirements_agent", "requirements_complete == false", "ask_user")
        .conditional_edge("requirements_agent", "requirements_complete == true", END)
        .edge("ask_user", "requirements_agent")
        .max_steps(settings.max_steps)
        .durability(settings.durability)
        .build(checkpointer)?;
    Ok(engine)
}

/// Full pipeline with the requirements loop embedded as one step
pub fn travel_system_graph(
    agents: TravelAgents,
    checkpointer: Checkpointer,
    settings: GraphSettings,
) -> Result<GraphEngine> {
    let child = requirements_graph(
        &format!("{}.{}", TRAVEL_SYSTEM_GRAPH, REQUIREMENTS_GRAPH),
        agents.requirements,
        checkpointer.clone(),
        settings,
    )?;

    let requirements = SubgraphStep::new(Arc::new(child), "requirements")
        .project_fields(&[HISTORY])
        .extract_with(|child| {
            let requirements = child
                .present(fields::REQUIREMENTS)
                .cloned()
                .unwrap_or_default();
            StateUpdate::new()
                .message(
                    HISTORY,
                    Message::ai(requirements.to_string()).named("requirements"),
                )
                .set(fields::REQUIREMENTS, requirements)
        });

    let planning = match agents.planning {
        Some(agent) => PlanningStep::new(agent),
        None => PlanningStep::stub(),
    };

    let engine = GraphBuilder::new(TRAVEL_SYSTEM_GRAPH)
        .state(travel_system_schema())
        .history(HISTORY)
        .step("planning", planning)
        .step("requirements", requirements)
        .step("planner", PlannerStep::new(agents.planner))
        .step("booker", BookerStep::new(agents.booker))
        .edge(START, "planning")
        .edge("planning", "requirements")
        .edge("requirements", "planner")
        .edge("planner", "booker")
        .edge("booker", END)
        .max_steps(settings.max_steps)
        .durability(settings.durability)
        .build(checkpointer)?;
    Ok(engine)
}
