// SPDX-License-Identifier: MIT

//! Integration tests for the travel pipeline
//!
//! These tests drive the full system through `ChatService` with scripted
//! agents in place of the model-backed ones.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use voyage_rs::adk::agent::{Agent, LLMAgent};
use voyage_rs::adk::error::{ProtocolError, Result, VoyageError};
use voyage_rs::adk::message::{Message, Role};
use voyage_rs::adk::model::{Content, GenerationConfig, Model, Part};
use voyage_rs::adk::tool::Tool;
use voyage_rs::voyage::service::{ChatRequest, ChatService};
use voyage_rs::voyage::tools::{with_travel_tools, BookingLedger, Catalog};
use voyage_rs::voyage::travel::{GraphSettings, TravelAgents};
use voyage_rs::voyage::workflow::checkpoint::{
    CheckpointKey, Checkpointer, Cursor, FileStore, MemoryStore,
};
use voyage_rs::voyage::workflow::graph::{
    FnStep, GraphBuilder, GraphEvent, Input, StepOutcome, ThreadStatus, END, START,
};
use voyage_rs::voyage::workflow::interrupt::InterruptStep;
use voyage_rs::voyage::workflow::loader::AgentLoader;
use voyage_rs::voyage::workflow::registry::ToolRegistry;
use voyage_rs::voyage::workflow::state::{StateSchema, StateUpdate};
use voyage_rs::voyage::workflow::subgraph::SubgraphStep;

// ============================================================================
// Scripted agents
// ============================================================================

type Script = dyn Fn(&[Message], usize) -> Result<Value> + Send + Sync;

/// Agent whose answer is computed from the history and the call number
struct ScriptedAgent {
    name: &'static str,
    calls: AtomicUsize,
    script: Box<Script>,
}

impl ScriptedAgent {
    fn new<F>(name: &'static str, script: F) -> Arc<Self>
    where
        F: Fn(&[Message], usize) -> Result<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name,
            calls: AtomicUsize::new(0),
            script: Box::new(script),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, messages: &[Message]) -> Result<Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(messages, call)
    }
}

const CITY_QUESTION: &str = "Which city would you like to visit?";

/// Complete once any traveller turn names Seoul
fn requirements_agent() -> Arc<ScriptedAgent> {
    ScriptedAgent::new("requirements", |messages, _| {
        let destination = messages
            .iter()
            .any(|m| m.role == Role::Human && m.content.contains("Seoul"));
        Ok(if destination {
            json!({"requirements": {
                "origin": "Tokyo",
                "destination": "Seoul",
                "travelers": 1,
                "confirmed_flight": {"flight_id": "KE704"},
                "missing_info": {"question": ""}
            }})
        } else {
            json!({"requirements": {
                "origin": "Tokyo",
                "missing_info": {"question": CITY_QUESTION}
            }})
        })
    })
}

fn planner_agent() -> Arc<ScriptedAgent> {
    ScriptedAgent::new("planner", |_, _| {
        Ok(json!({"itinerary": {
            "destination": "Seoul",
            "days": [
                {"day": 1, "title": "Arrival and Myeongdong", "activities": ["Check in", "Street food"]},
                {"day": 2, "title": "Palaces", "activities": ["Gyeongbokgung"]},
                {"day": 3, "title": "Departure"}
            ]
        }}))
    })
}

fn booker_agent() -> Arc<ScriptedAgent> {
    ScriptedAgent::new("booker", |_, _| {
        Ok(json!({"bookings": {
            "flights": [{"flight_id": "KE704", "confirmation_code": "FL-1"}],
            "hotels": [{"hotel_name": "Lotte Hotel Seoul", "confirmation_code": "HT-1", "city": "Seoul"}]
        }}))
    })
}

struct Fixture {
    service: ChatService,
    requirements: Arc<ScriptedAgent>,
    planner: Arc<ScriptedAgent>,
}

fn fixture_with(checkpointer: Checkpointer, planner: Arc<ScriptedAgent>) -> Fixture {
    let requirements = requirements_agent();
    let agents = TravelAgents {
        planning: None,
        requirements: requirements.clone(),
        planner: planner.clone(),
        booker: booker_agent(),
    };
    let service = ChatService::new(agents, checkpointer, GraphSettings::default()).unwrap();
    Fixture {
        service,
        requirements,
        planner,
    }
}

fn fixture(checkpointer: Checkpointer) -> Fixture {
    fixture_with(checkpointer, planner_agent())
}

const FULL_SUMMARY: &str = "✓ Query plan created | ✓ Requirements gathered | ✓ Itinerary created with 3 days | ✓ Bookings confirmed: flight, hotel";

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_complete_request_finishes_in_one_turn() {
    let f = fixture(Checkpointer::in_memory());

    let response = f
        .service
        .travel_chat(ChatRequest::new(
            "I want to go to Seoul from Tokyo, dates flexible",
            "thread-a",
        ))
        .await
        .unwrap();

    assert!(!response.is_interrupt);
    assert_eq!(response.message, FULL_SUMMARY);
    let requirements = response.requirements.unwrap();
    assert_eq!(requirements.destination.as_deref(), Some("Seoul"));
    assert_eq!(requirements.origin.as_deref(), Some("Tokyo"));
    assert_eq!(response.itinerary.unwrap().days.len(), 3);
    assert_eq!(response.bookings.unwrap().hotels[0].confirmation_code, "HT-1");

    let (status, _) = f.service.travel_graph().snapshot("thread-a").await.unwrap();
    assert_eq!(status, ThreadStatus::Finished);
}

#[tokio::test]
async fn test_missing_destination_suspends_then_resumes() {
    let store = Arc::new(MemoryStore::new());
    let f = fixture(Checkpointer::new(store.clone()));

    let first = f
        .service
        .travel_chat(ChatRequest::new("I want to travel from Tokyo", "thread-b"))
        .await
        .unwrap();
    assert!(first.is_interrupt);
    assert_eq!(first.message, CITY_QUESTION);
    assert!(first.plan.is_some());
    assert!(first.requirements.is_none());
    assert!(first.itinerary.is_none());

    // The root waits at the adapter step, the child at its ask step
    let (status, _) = f.service.travel_graph().snapshot("thread-b").await.unwrap();
    assert!(matches!(status, ThreadStatus::Suspended { ref step, .. } if step == "requirements"));
    let child = Checkpointer::new(store.clone())
        .load(&CheckpointKey::new(
            "travel_system.requirements",
            "thread-b-requirements",
        ))
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(child.cursor, Cursor::Suspended { ref step, .. } if step == "ask_user"));

    let second = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "thread-b"))
        .await
        .unwrap();
    assert!(!second.is_interrupt);
    assert_eq!(second.message, FULL_SUMMARY);
    assert_eq!(
        second.requirements.unwrap().destination.as_deref(),
        Some("Seoul")
    );

    // The resume value follows the last turn recorded before the suspension
    let (_, state) = f.service.travel_graph().snapshot("thread-b").await.unwrap();
    let history = state.messages("messages");
    assert_eq!(history[0].content, "I want to travel from Tokyo");
    assert_eq!(history[1].name.as_deref(), Some("planner_node"));
    assert_eq!(history[2], Message::human("Seoul"));
    let names: Vec<Option<&str>> = history[3..].iter().map(|m| m.name.as_deref()).collect();
    assert_eq!(names, vec![Some("requirements"), Some("planner"), Some("booker")]);
}

#[tokio::test]
async fn test_double_resume_is_rejected() {
    let f = fixture(Checkpointer::in_memory());

    f.service
        .travel_chat(ChatRequest::new("From Tokyo please", "thread-c"))
        .await
        .unwrap();
    f.service
        .travel_chat(ChatRequest::resume("Seoul", "thread-c"))
        .await
        .unwrap();
    let calls = f.requirements.calls();

    let err = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "thread-c"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoyageError::Protocol(ProtocolError::NoPendingSuspension { .. })
    ));
    assert_eq!(err.kind(), "protocol_violation");

    // Nothing restarted
    assert_eq!(f.requirements.calls(), calls);
    let (status, _) = f.service.travel_graph().snapshot("thread-c").await.unwrap();
    assert_eq!(status, ThreadStatus::Finished);
}

#[tokio::test]
async fn test_resume_on_unknown_thread_is_rejected() {
    let f = fixture(Checkpointer::in_memory());
    let err = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "never-started"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "protocol_violation");
    assert_eq!(f.requirements.calls(), 0);
}

#[tokio::test]
async fn test_new_turn_while_suspended_is_rejected() {
    let f = fixture(Checkpointer::in_memory());
    f.service
        .travel_chat(ChatRequest::new("From Tokyo", "thread-d"))
        .await
        .unwrap();

    let err = f
        .service
        .travel_chat(ChatRequest::new("Actually, plan something else", "thread-d"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoyageError::Protocol(ProtocolError::SuspensionPending { ref step, .. }) if step == "requirements"
    ));
}

#[tokio::test]
async fn test_several_clarification_rounds() {
    let f = fixture(Checkpointer::in_memory());

    let mut response = f
        .service
        .travel_chat(ChatRequest::new("Somewhere from Tokyo", "thread-e"))
        .await
        .unwrap();
    for answer in ["not sure yet", "somewhere with food"] {
        assert!(response.is_interrupt);
        assert_eq!(response.message, CITY_QUESTION);
        response = f
            .service
            .travel_chat(ChatRequest::resume(answer, "thread-e"))
            .await
            .unwrap();
    }
    assert!(response.is_interrupt);
    assert_eq!(f.planner.calls(), 0);

    let done = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "thread-e"))
        .await
        .unwrap();
    assert!(!done.is_interrupt);
    assert_eq!(f.planner.calls(), 1);
    assert_eq!(f.requirements.calls(), 4);
}

#[tokio::test]
async fn test_requirements_chat_alone() {
    let f = fixture(Checkpointer::in_memory());

    let first = f
        .service
        .requirements_chat(ChatRequest::new("From Tokyo", "r-1"))
        .await
        .unwrap();
    assert!(first.is_interrupt);
    assert_eq!(first.message, CITY_QUESTION);

    let done = f
        .service
        .requirements_chat(ChatRequest::resume("Seoul", "r-1"))
        .await
        .unwrap();
    assert!(!done.is_interrupt);
    let parsed: Value = serde_json::from_str(&done.message).unwrap();
    assert_eq!(parsed["requirements"]["destination"], "Seoul");
    assert!(done.plan.is_none());

    // Standalone and embedded requirements threads never share checkpoints
    let (status, _) = f.service.travel_graph().snapshot("r-1").await.unwrap();
    assert_eq!(status, ThreadStatus::Idle);
}

// ============================================================================
// Durability and failure handling
// ============================================================================

#[tokio::test]
async fn test_resume_after_restart_from_file_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let f = fixture(Checkpointer::new(Arc::new(FileStore::new(dir.path()))));
        let response = f
            .service
            .travel_chat(ChatRequest::new("From Tokyo", "durable"))
            .await
            .unwrap();
        assert!(response.is_interrupt);
    }

    // A fresh process sees only what is on disk
    let f = fixture(Checkpointer::new(Arc::new(FileStore::new(dir.path()))));
    let response = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "durable"))
        .await
        .unwrap();
    assert!(!response.is_interrupt);
    assert_eq!(response.message, FULL_SUMMARY);
}

#[tokio::test]
async fn test_collaborator_failure_is_retried_by_identical_request() {
    let planner = ScriptedAgent::new("planner", |_, call| {
        if call == 0 {
            Err(VoyageError::collaborator("planner", "upstream timeout"))
        } else {
            Ok(json!({"itinerary": {"destination": "Seoul", "days": [{"day": 1, "title": "Arrive"}]}}))
        }
    });
    let f = fixture_with(Checkpointer::in_memory(), planner);

    let first = f
        .service
        .travel_chat(ChatRequest::new("From Tokyo", "retry"))
        .await
        .unwrap();
    assert!(first.is_interrupt);

    let err = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "retry"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "collaborator_failure");
    let requirement_calls = f.requirements.calls();

    let response = f
        .service
        .travel_chat(ChatRequest::resume("Seoul", "retry"))
        .await
        .unwrap();
    assert!(!response.is_interrupt);
    assert_eq!(f.planner.calls(), 2);
    assert_eq!(f.requirements.calls(), requirement_calls);

    let (_, state) = f.service.travel_graph().snapshot("retry").await.unwrap();
    let seoul_turns = state
        .messages("messages")
        .iter()
        .filter(|m| m.role == Role::Human && m.content == "Seoul")
        .count();
    assert_eq!(seoul_turns, 1);
}

#[tokio::test]
async fn test_failed_first_turn_only_retries_the_same_request() {
    let planner = ScriptedAgent::new("planner", |_, call| {
        if call == 0 {
            Err(VoyageError::collaborator("planner", "upstream timeout"))
        } else {
            Ok(json!({"itinerary": {"destination": "Seoul", "days": [{"day": 1, "title": "Arrive"}]}}))
        }
    });
    let f = fixture_with(Checkpointer::in_memory(), planner);
    let request = "Seoul from Tokyo, dates flexible";

    let err = f
        .service
        .travel_chat(ChatRequest::new(request, "fresh-failure"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "collaborator_failure");

    // No question was asked, so there is nothing to answer
    let err = f
        .service
        .travel_chat(ChatRequest::resume("Busan", "fresh-failure"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoyageError::Protocol(ProtocolError::NoPendingSuspension { .. })
    ));

    let err = f
        .service
        .travel_chat(ChatRequest::new("Make it Busan instead", "fresh-failure"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoyageError::Protocol(ProtocolError::RetryPending { ref step, .. }) if step == "planner"
    ));
    assert_eq!(f.planner.calls(), 1);

    let response = f
        .service
        .travel_chat(ChatRequest::new(request, "fresh-failure"))
        .await
        .unwrap();
    assert!(!response.is_interrupt);
    assert_eq!(f.planner.calls(), 2);

    let (_, state) = f.service.travel_graph().snapshot("fresh-failure").await.unwrap();
    let human: Vec<String> = state
        .messages("messages")
        .into_iter()
        .filter(|m| m.role == Role::Human)
        .map(|m| m.content)
        .collect();
    assert_eq!(human, vec![request.to_string()]);
}

#[tokio::test]
async fn test_invalid_collaborator_output_leaves_checkpoint() {
    let planner = ScriptedAgent::new("planner", |_, _| Ok(json!({"itinerary": "tomorrow"})));
    let f = fixture_with(Checkpointer::in_memory(), planner);

    let err = f
        .service
        .travel_chat(ChatRequest::new("Seoul from Tokyo", "invalid"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_failure");

    let (status, state) = f.service.travel_graph().snapshot("invalid").await.unwrap();
    assert_eq!(
        status,
        ThreadStatus::InFlight {
            next: "planner".into()
        }
    );
    assert!(state.present("itinerary").is_none());
}

#[tokio::test]
async fn test_same_thread_invocations_are_serialized() {
    let echo = ScriptedAgent::new("requirements", |messages, _| {
        Ok(json!({"requirements": {
            "destination": "Seoul",
            "missing_info": {"question": ""},
            "preferences": messages.iter().map(|m| m.content.clone()).collect::<Vec<_>>()
        }}))
    });
    let agents = TravelAgents {
        planning: None,
        requirements: echo,
        planner: planner_agent(),
        booker: booker_agent(),
    };
    let service = ChatService::new(agents, Checkpointer::in_memory(), GraphSettings::default())
        .unwrap();

    let (a, b) = tokio::join!(
        service.requirements_chat(ChatRequest::new("first", "shared")),
        service.requirements_chat(ChatRequest::new("second", "shared")),
    );
    a.unwrap();
    b.unwrap();

    let (_, state) = service.requirements_graph().snapshot("shared").await.unwrap();
    let humans: Vec<String> = state
        .messages("messages")
        .into_iter()
        .filter(|m| m.role == Role::Human)
        .map(|m| m.content)
        .collect();
    assert_eq!(humans.len(), 2);
    assert!(humans.contains(&"first".to_string()));
    assert!(humans.contains(&"second".to_string()));
}

#[tokio::test]
async fn test_events_cover_nested_graph() {
    let f = fixture(Checkpointer::in_memory());
    let (tx, mut rx) = mpsc::channel(256);

    let response = f
        .service
        .travel_chat_with_events(ChatRequest::new("From Tokyo", "events"), tx)
        .await
        .unwrap();
    assert!(response.is_interrupt);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let interrupted: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            GraphEvent::Interrupted { graph, .. } => Some(graph.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(interrupted, vec!["travel_system.requirements", "travel_system"]);
    assert!(events.iter().any(|e| matches!(
        e,
        GraphEvent::StepStarted { graph, thread, step }
            if graph == "travel_system.requirements" && thread == "events-requirements" && step == "requirements_agent"
    )));
}

// ============================================================================
// Nesting depth
// ============================================================================

#[tokio::test]
async fn test_three_level_nesting_relays_one_interrupt() {
    let checkpointer = Checkpointer::in_memory();
    let schema = || StateSchema::new().append("messages");

    let leaf = GraphBuilder::new("leaf")
        .state(schema())
        .history("messages")
        .step(
            "ask",
            InterruptStep::from_field("prompt").with_fallback("What is your budget?"),
        )
        .step(
            "record",
            FnStep::sync(|state, _| {
                let answer = state
                    .messages("messages")
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(StepOutcome::advance(StateUpdate::new().set("budget", answer)))
            }),
        )
        .edge(START, "ask")
        .edge("ask", "record")
        .edge("record", END)
        .build(checkpointer.clone())
        .unwrap();

    let middle = GraphBuilder::new("middle")
        .state(schema())
        .history("messages")
        .step(
            "leaf",
            SubgraphStep::new(Arc::new(leaf), "leaf")
                .project_fields(&["messages"])
                .extract_fields(&["budget"]),
        )
        .edge(START, "leaf")
        .edge("leaf", END)
        .build(checkpointer.clone())
        .unwrap();

    let root = GraphBuilder::new("root")
        .state(schema())
        .history("messages")
        .step(
            "middle",
            SubgraphStep::new(Arc::new(middle), "middle")
                .project_fields(&["messages"])
                .extract_fields(&["budget"]),
        )
        .edge(START, "middle")
        .edge("middle", END)
        .build(checkpointer.clone())
        .unwrap();

    let outcome = root
        .invoke(
            "trip",
            Input::seed(StateUpdate::new().message("messages", Message::human("Plan a trip"))),
        )
        .await
        .unwrap();
    assert_eq!(outcome.interrupt().unwrap().message, "What is your budget?");

    let leaf_checkpoint = checkpointer
        .load(&CheckpointKey::new("leaf", "trip-middle-leaf"))
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(leaf_checkpoint.cursor, Cursor::Suspended { .. }));

    let done = root.invoke("trip", Input::resume("500 USD")).await.unwrap();
    assert!(!done.is_interrupted());
    assert_eq!(done.state().get("budget"), Some(&json!("500 USD")));
}

// ============================================================================
// Booking through tools
// ============================================================================

/// Model that books through the offered tools, then quotes their references
struct BookingModel {
    turns: AtomicUsize,
}

#[async_trait]
impl Model for BookingModel {
    async fn generate_content(
        &self,
        history: &[Content],
        _config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content> {
        if self.turns.fetch_add(1, Ordering::SeqCst) == 0 {
            let offered: Vec<&str> = tools.unwrap_or_default().iter().map(|t| t.name()).collect();
            assert!(offered.contains(&"book_flight"));
            assert!(offered.contains(&"book_hotel"));
            return Ok(Content {
                role: "model".to_string(),
                parts: vec![
                    Part::FunctionCall {
                        id: Some("call-1".to_string()),
                        name: "book_flight".to_string(),
                        args: json!({
                            "flight_id": "KE704",
                            "departure_date": "2026-11-03",
                            "passenger_name": "Mina Park",
                            "email": "mina@example.com"
                        }),
                    },
                    Part::FunctionCall {
                        id: Some("call-2".to_string()),
                        name: "book_hotel".to_string(),
                        args: json!({
                            "hotel_id": "SEL-LOTTE",
                            "check_in_date": "2026-11-03",
                            "check_out_date": "2026-11-06",
                            "guest_name": "Mina Park",
                            "email": "mina@example.com"
                        }),
                    },
                ],
            });
        }

        let result = |tool: &str| {
            history
                .iter()
                .flat_map(|content| content.parts.iter())
                .find_map(|part| match part {
                    Part::FunctionResponse { name, response, .. } if name == tool => {
                        Some(response.clone())
                    }
                    _ => None,
                })
                .unwrap_or(Value::Null)
        };
        let flight = result("book_flight");
        let hotel = result("book_hotel");
        let answer = json!({"bookings": {
            "flights": [{
                "flight_id": flight["flight_id"],
                "confirmation_code": flight["booking_reference"],
                "status": flight["status"]
            }],
            "hotels": [{
                "hotel_name": hotel["hotel_name"],
                "confirmation_code": hotel["booking_reference"],
                "city": hotel["city"],
                "check_in": hotel["check_in_date"],
                "check_out": hotel["check_out_date"]
            }]
        }});
        Ok(Content::text("model", answer.to_string()))
    }
}

#[tokio::test]
async fn test_booker_books_through_tools() {
    let ledger = Arc::new(BookingLedger::new());
    let registry = with_travel_tools(
        ToolRegistry::new(),
        Arc::new(Catalog::builtin().unwrap()),
        ledger.clone(),
    );
    let manifest = AgentLoader::new("/nonexistent/agents").load("booker").unwrap();
    let model = Arc::new(BookingModel {
        turns: AtomicUsize::new(0),
    });
    let booker = LLMAgent::new(
        manifest.name.clone(),
        manifest.description.clone(),
        manifest.agent.instructions.clone(),
        model.clone(),
        registry.resolve(&manifest.agent.tools).unwrap(),
    );

    let agents = TravelAgents {
        planning: None,
        requirements: requirements_agent(),
        planner: planner_agent(),
        booker: Arc::new(booker),
    };
    let service = ChatService::new(agents, Checkpointer::in_memory(), GraphSettings::default())
        .unwrap()
        .with_ledger(ledger.clone());

    let response = service
        .travel_chat(ChatRequest::new("Seoul from Tokyo for Mina Park", "booked"))
        .await
        .unwrap();
    assert!(!response.is_interrupt);
    assert_eq!(model.turns.load(Ordering::SeqCst), 2);

    let flights = service.ledger().flights().await;
    let hotels = service.ledger().hotels().await;
    assert_eq!(flights.len(), 1);
    assert_eq!(hotels.len(), 1);
    assert_eq!(flights[0].flight_id, "KE704");
    assert_eq!(hotels[0].number_of_nights, 3);

    let bookings = response.bookings.unwrap();
    assert_eq!(bookings.flights[0].confirmation_code, flights[0].booking_reference);
    assert_eq!(bookings.hotels[0].confirmation_code, hotels[0].booking_reference);
    assert_eq!(bookings.hotels[0].check_in.as_deref(), Some("2026-11-03"));

    let (mine, _) = ledger.for_email("mina@example.com").await;
    assert_eq!(mine.len(), 1);
}
