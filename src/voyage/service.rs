// SPDX-License-Identifier: MIT

//! Transport-agnostic chat contract for the travel system
//!
//! A request either starts a new turn on a thread or, with `resume`, answers
//! the question the thread is waiting on. The response carries either that
//! question (`is_interrupt`) or a summary of what the pipeline produced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::adk::agent::Agent;
use crate::adk::error::{Result, VoyageError};
use crate::adk::message::{Message, Role};
use crate::adk::model::ResponseSchema;
use crate::voyage::config::AppConfig;
use crate::voyage::tools::{with_travel_tools, BookingLedger, WebSearchTool};
use crate::voyage::travel::models::{
    BookerResponse, Bookings, CompleteRequirements, Itinerary, PlannerResponse, PlanningResponse,
    RequirementsResponse,
};
use crate::voyage::travel::steps::plan_query;
use crate::voyage::travel::{
    fields, requirements_graph, travel_system_graph, GraphSettings, TravelAgents, HISTORY,
    REQUIREMENTS_GRAPH,
};
use crate::voyage::workflow::agent_factory::AgentFactory;
use crate::voyage::workflow::checkpoint::Checkpointer;
use crate::voyage::workflow::graph::{EventSender, GraphEngine, Input, RunOutcome};
use crate::voyage::workflow::loader::AgentLoader;
use crate::voyage::workflow::registry::ToolRegistry;
use crate::voyage::workflow::state::{GraphState, StateUpdate};

const PENDING_SUMMARY: &str = "Processing travel request...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(alias = "threadId")]
    pub thread_id: String,
    #[serde(default)]
    pub resume: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            thread_id: thread_id.into(),
            resume: false,
        }
    }

    pub fn resume(message: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            resume: true,
            ..Self::new(message, thread_id)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.thread_id.trim().is_empty() {
            return Err(VoyageError::validation("request", "thread_id must not be empty"));
        }
        if self.message.trim().is_empty() {
            return Err(VoyageError::validation("request", "message must not be empty"));
        }
        Ok(())
    }

    fn into_input(self) -> Input {
        if self.resume {
            Input::resume(self.message)
        } else {
            Input::seed(StateUpdate::new().message(HISTORY, Message::human(self.message)))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub is_interrupt: bool,
    pub plan: Option<String>,
    pub sub_queries: Option<Vec<String>>,
    pub requirements: Option<CompleteRequirements>,
    pub itinerary: Option<Itinerary>,
    pub bookings: Option<Bookings>,
}

impl ChatResponse {
    fn interrupt(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_interrupt: true,
            ..Default::default()
        }
    }
}

/// Decode a stage's output, treating an unreadable value as not produced
fn typed<T: serde::de::DeserializeOwned>(state: &GraphState, field: &str) -> Option<T> {
    let value = state.present(field)?;
    serde_json::from_value(value.clone())
        .inspect_err(|e| log::warn!("Ignoring unreadable '{}' in state: {}", field, e))
        .ok()
}

/// One-line summary of the completed stages
pub fn summarize(response: &ChatResponse) -> String {
    let mut parts = Vec::new();
    if response.plan.is_some() {
        parts.push("✓ Query plan created".to_string());
    }
    if response.requirements.is_some() {
        parts.push("✓ Requirements gathered".to_string());
    }
    if let Some(itinerary) = &response.itinerary {
        parts.push(format!(
            "✓ Itinerary created with {} days",
            itinerary.days.len()
        ));
    }
    if let Some(bookings) = &response.bookings {
        let mut booked = Vec::new();
        if !bookings.flights.is_empty() {
            booked.push("flight");
        }
        if !bookings.hotels.is_empty() {
            booked.push("hotel");
        }
        if !booked.is_empty() {
            parts.push(format!("✓ Bookings confirmed: {}", booked.join(", ")));
        }
    }

    if parts.is_empty() {
        PENDING_SUMMARY.to_string()
    } else {
        parts.join(" | ")
    }
}

/// Entry point shared by the HTTP server and the CLI
pub struct ChatService {
    travel: Arc<GraphEngine>,
    requirements: Arc<GraphEngine>,
    planning: Option<Arc<dyn Agent>>,
    planning_only: bool,
    ledger: Arc<BookingLedger>,
}

impl ChatService {
    /// Wire both graphs around `agents`, sharing one checkpointer
    pub fn new(
        agents: TravelAgents,
        checkpointer: Checkpointer,
        settings: GraphSettings,
    ) -> Result<Self> {
        let requirements = requirements_graph(
            REQUIREMENTS_GRAPH,
            agents.requirements.clone(),
            checkpointer.clone(),
            settings,
        )?;
        let planning = agents.planning.clone();
        let travel = travel_system_graph(agents, checkpointer, settings)?;
        Ok(Self {
            travel: Arc::new(travel),
            requirements: Arc::new(requirements),
            planning,
            planning_only: false,
            ledger: Arc::new(BookingLedger::new()),
        })
    }

    /// Share the ledger the booking tools write to
    pub fn with_ledger(mut self, ledger: Arc<BookingLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Answer travel chats with the plan alone
    pub fn with_planning_only(mut self, planning_only: bool) -> Self {
        self.planning_only = planning_only;
        self
    }

    /// Load agent definitions and build the service described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = Arc::new(config.catalog()?);
        let ledger = Arc::new(BookingLedger::new());
        let mut registry = with_travel_tools(ToolRegistry::new(), catalog, ledger.clone());
        if let Some(key) = &config.brave_api_key {
            registry = registry.with_tool(Arc::new(WebSearchTool::new(key.clone())));
        }
        log::info!("Registered tools: {:?}", registry.names());

        let loader = AgentLoader::new(config.agents_dir.clone());
        let factory = AgentFactory::new(&registry, config.model_settings());
        let build = |name: &str, schema: ResponseSchema| -> Result<Arc<dyn Agent>> {
            factory.build(&loader.load(name)?, schema)
        };

        let planning = if config.planning_stub {
            log::info!("Planning step runs without a model");
            None
        } else {
            Some(build(
                "planning",
                ResponseSchema::for_type::<PlanningResponse>("planning_response")?,
            )?)
        };
        let agents = TravelAgents {
            planning,
            requirements: build(
                "requirements",
                ResponseSchema::for_type::<RequirementsResponse>("requirements_response")?,
            )?,
            planner: build(
                "planner",
                ResponseSchema::for_type::<PlannerResponse>("planner_response")?,
            )?,
            booker: build(
                "booker",
                ResponseSchema::for_type::<BookerResponse>("booker_response")?,
            )?,
        };

        Ok(Self::new(agents, config.checkpointer(), config.graph_settings())?
            .with_planning_only(config.planning_only)
            .with_ledger(ledger))
    }

    pub fn travel_graph(&self) -> &Arc<GraphEngine> {
        &self.travel
    }

    pub fn requirements_graph(&self) -> &Arc<GraphEngine> {
        &self.requirements
    }

    pub fn ledger(&self) -> &Arc<BookingLedger> {
        &self.ledger
    }

    /// One turn of the full travel system
    pub async fn travel_chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.travel_chat_with(request, None).await
    }

    /// Same as [`travel_chat`](Self::travel_chat), reporting progress on `events`
    pub async fn travel_chat_with_events(
        &self,
        request: ChatRequest,
        events: EventSender,
    ) -> Result<ChatResponse> {
        self.travel_chat_with(request, Some(events)).await
    }

    async fn travel_chat_with(
        &self,
        request: ChatRequest,
        events: Option<EventSender>,
    ) -> Result<ChatResponse> {
        request.validate()?;
        if self.planning_only && !request.resume {
            let planned = plan_query(self.planning.as_deref(), &request.message).await?;
            return Ok(ChatResponse {
                message: "✓ Query plan created".to_string(),
                plan: Some(planned.plan),
                sub_queries: Some(planned.sub_queries),
                ..Default::default()
            });
        }

        let thread = request.thread_id.clone();
        let outcome = self
            .travel
            .invoke_with(&thread, request.into_input(), events)
            .await?;

        let state = outcome.state();
        let plan = typed::<String>(state, fields::PLAN);
        let sub_queries = typed::<Vec<String>>(state, fields::SUB_QUERIES);

        match &outcome {
            RunOutcome::Interrupted { interrupt, .. } => Ok(ChatResponse {
                plan,
                sub_queries,
                ..ChatResponse::interrupt(interrupt.message.clone())
            }),
            RunOutcome::Completed(state) => {
                let mut response = ChatResponse {
                    plan,
                    sub_queries,
                    requirements: typed(state, fields::REQUIREMENTS),
                    itinerary: typed(state, fields::ITINERARY),
                    bookings: typed(state, fields::BOOKINGS),
                    ..Default::default()
                };
                response.message = summarize(&response);
                Ok(response)
            }
        }
    }

    /// One turn of the standalone requirements graph
    pub async fn requirements_chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        request.validate()?;
        let thread = request.thread_id.clone();
        match self.requirements.invoke(&thread, request.into_input()).await? {
            RunOutcome::Interrupted { interrupt, .. } => {
                Ok(ChatResponse::interrupt(interrupt.message))
            }
            RunOutcome::Completed(state) => {
                let message = state
                    .messages(HISTORY)
                    .into_iter()
                    .rev()
                    .find(|m| m.role == Role::Ai)
                    .map(|m| m.content)
                    .unwrap_or_else(|| {
                        state
                            .present(fields::REQUIREMENTS)
                            .map(Value::to_string)
                            .unwrap_or_default()
                    });
                Ok(ChatResponse {
                    message,
                    requirements: typed(&state, fields::REQUIREMENTS),
                    ..Default::default()
                })
            }
        }
    }
}
