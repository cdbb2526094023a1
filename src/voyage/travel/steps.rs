// SPDX-License-Identifier: MIT

//! Domain steps of the travel pipeline
//!
//! Each step hands a prompt to its agent, decodes the structured answer and
//! turns it into a state update. None of them suspend on their own; asking
//! the traveller is left to an [`InterruptStep`] routed from
//! `requirements_complete`.
//!
//! [`InterruptStep`]: crate::voyage::workflow::interrupt::InterruptStep

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::models::{BookerResponse, PlannerResponse, PlanningResponse, RequirementsResponse};
use super::{fields, HISTORY};
use crate::adk::agent::{invoke_as, Agent};
use crate::adk::error::{Result, VoyageError};
use crate::adk::message::{Message, Role};
use crate::voyage::workflow::graph::{Step, StepContext, StepOutcome};
use crate::voyage::workflow::state::{GraphState, StateUpdate};

fn pretty(value: Option<&Value>) -> String {
    value
        .and_then(|v| serde_json::to_string_pretty(v).ok())
        .unwrap_or_else(|| "null".to_string())
}

/// Latest traveller turn, falling back to the latest turn of any kind
fn latest_query(state: &GraphState) -> Option<String> {
    let history = state.messages(HISTORY);
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::Human)
        .or_else(|| history.last())
        .map(|m| m.content.clone())
}

/// Plan produced without calling a model
pub fn stub_plan(query: &str) -> PlanningResponse {
    PlanningResponse {
        plan: "Analyze user query, identify destinations, dates, preferences, and create \
               focused sub-queries to guide requirements gathering and itinerary planning."
            .to_string(),
        sub_queries: vec![
            format!("{} – destinations & regions", query),
            format!("{} – dates & duration", query),
            format!("{} – activities & interests", query),
        ],
    }
}

/// Decompose `query` with the planning agent, or the stub when there is none
pub async fn plan_query(agent: Option<&dyn Agent>, query: &str) -> Result<PlanningResponse> {
    let Some(agent) = agent else {
        return Ok(stub_plan(query));
    };
    let prompt = format!(
        "Analyze the following travel query and create a structured plan:\n\n\
         Query: {}\n\n\
         Decompose it into specific search aspects and sub-queries that will help gather all necessary information.",
        query
    );
    invoke_as(agent, &[Message::human(prompt)]).await
}

/// Turns the traveller's query into a plan and sub-queries
pub struct PlanningStep {
    agent: Option<Arc<dyn Agent>>,
}

impl PlanningStep {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent: Some(agent) }
    }

    /// Answers with [`stub_plan`]
    pub fn stub() -> Self {
        Self { agent: None }
    }
}

#[async_trait]
impl Step for PlanningStep {
    async fn execute(&self, state: &GraphState, _ctx: &StepContext) -> Result<StepOutcome> {
        let Some(query) = latest_query(state) else {
            log::warn!("Planning step found no messages; skipping");
            return Ok(StepOutcome::advance(StateUpdate::new()));
        };

        let planned = plan_query(self.agent.as_deref(), &query).await?;
        log::debug!("Planned {} sub-queries", planned.sub_queries.len());

        Ok(StepOutcome::advance(
            StateUpdate::new()
                .message(
                    HISTORY,
                    Message::ai(format!("Plan: {}", planned.plan)).named("planner_node"),
                )
                .set(fields::PLAN, planned.plan)
                .set(fields::SUB_QUERIES, planned.sub_queries),
        ))
    }
}

/// Fills in the requirements from the whole conversation
///
/// Leaves `requirements_complete == false` and the agent's question in
/// `interruption_message` while something essential is missing.
pub struct RequirementsStep {
    agent: Arc<dyn Agent>,
}

impl RequirementsStep {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Step for RequirementsStep {
    async fn execute(&self, state: &GraphState, _ctx: &StepContext) -> Result<StepOutcome> {
        let history = state.messages(HISTORY);
        let response: RequirementsResponse = invoke_as(self.agent.as_ref(), &history).await?;
        let requirements = serde_json::to_value(&response.requirements)?;

        let update = match response.requirements.question() {
            Some(question) => {
                log::info!("Requirements incomplete; asking: {}", question);
                StateUpdate::new()
                    .message(HISTORY, Message::ai(question))
                    .set(fields::INTERRUPTION_MESSAGE, question)
                    .set(fields::REQUIREMENTS_COMPLETE, false)
                    .set(fields::REQUIREMENTS, requirements)
            }
            None => StateUpdate::new()
                .message(
                    HISTORY,
                    Message::ai(serde_json::to_string(&response)?).named("requirements"),
                )
                .set(fields::INTERRUPTION_MESSAGE, "")
                .set(fields::REQUIREMENTS_COMPLETE, true)
                .set(fields::REQUIREMENTS, requirements),
        };
        Ok(StepOutcome::advance(update))
    }
}

/// Builds a day-by-day itinerary from the gathered requirements
pub struct PlannerStep {
    agent: Arc<dyn Agent>,
}

impl PlannerStep {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Step for PlannerStep {
    async fn execute(&self, state: &GraphState, _ctx: &StepContext) -> Result<StepOutcome> {
        let requirements = state.present(fields::REQUIREMENTS).ok_or_else(|| {
            VoyageError::validation(self.agent.name(), "no requirements to plan from")
        })?;
        let prompt = format!(
            "Based on the following travel requirements, create a day-by-day itinerary:\n\n{}",
            pretty(Some(requirements))
        );

        let response: PlannerResponse =
            invoke_as(self.agent.as_ref(), &[Message::human(prompt)]).await?;
        let itinerary = serde_json::to_value(&response.itinerary)?;
        log::info!(
            "Itinerary for {} with {} day(s)",
            response.itinerary.destination,
            response.itinerary.days.len()
        );

        Ok(StepOutcome::advance(
            StateUpdate::new()
                .message(HISTORY, Message::ai(itinerary.to_string()).named("planner"))
                .set(fields::ITINERARY, itinerary),
        ))
    }
}

/// Books the confirmed flight and a hotel
pub struct BookerStep {
    agent: Arc<dyn Agent>,
}

impl BookerStep {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Step for BookerStep {
    async fn execute(&self, state: &GraphState, _ctx: &StepContext) -> Result<StepOutcome> {
        let prompt = format!(
            "Based on the following requirements and itinerary, book the flights and hotels:\n\n\
             REQUIREMENTS:\n{}\n\n\
             ITINERARY:\n{}\n\n\
             Extract the flight ID from the confirmed flight in requirements and book it.\n\
             For hotels, use the destination city and dates from the itinerary or requirements to book a hotel.\n\
             Return booking confirmations for both flight and hotel.",
            pretty(state.present(fields::REQUIREMENTS)),
            pretty(state.present(fields::ITINERARY)),
        );

        let response: BookerResponse =
            invoke_as(self.agent.as_ref(), &[Message::human(prompt)]).await?;
        let bookings = serde_json::to_value(&response.bookings)?;

        Ok(StepOutcome::advance(
            StateUpdate::new()
                .message(HISTORY, Message::ai(bookings.to_string()).named("booker"))
                .set(fields::BOOKINGS, bookings),
        ))
    }
}
