// SPDX-License-Identifier: MIT

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adk::error::VoyageError;
use crate::voyage::service::{ChatRequest, ChatResponse, ChatService};

/// Error body `{error, kind}` with a status chosen by failure class
#[derive(Debug)]
pub struct ApiError(VoyageError);

impl From<VoyageError> for ApiError {
    fn from(err: VoyageError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            "protocol_violation" => StatusCode::CONFLICT,
            "validation_failure" => StatusCode::UNPROCESSABLE_ENTITY,
            "collaborator_failure" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        json!({ "error": self.0.to_string(), "kind": self.0.kind() })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::error!("Request failed ({}): {}", self.0.kind(), self.0);
        (self.status(), Json(self.body())).into_response()
    }
}

pub fn router(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/travel-system/chat", post(travel_chat))
        .route("/api/travel-system/chat/stream", post(travel_chat_stream))
        .route("/api/requirements/chat", post(requirements_chat))
        .route("/api/bookings/all", get(all_bookings))
        .route("/api/bookings/flights", get(flight_bookings))
        .route("/api/bookings/hotels", get(hotel_bookings))
        .route("/api/bookings/user", get(user_bookings))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(service: Arc<ChatService>, port: u16) -> std::io::Result<()> {
    let app = router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Multi-Agent Travel Planner API" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn travel_chat(
    State(service): State<Arc<ChatService>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    Ok(Json(service.travel_chat(request).await?))
}

async fn requirements_chat(
    State(service): State<Arc<ChatService>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    Ok(Json(service.requirements_chat(request).await?))
}

async fn all_bookings(State(service): State<Arc<ChatService>>) -> Json<Value> {
    let flights = service.ledger().flights().await;
    let hotels = service.ledger().hotels().await;
    Json(json!({
        "total": flights.len() + hotels.len(),
        "flights": flights,
        "hotels": hotels,
    }))
}

async fn flight_bookings(State(service): State<Arc<ChatService>>) -> Json<Value> {
    let flights = service.ledger().flights().await;
    Json(json!({ "count": flights.len(), "bookings": flights }))
}

async fn hotel_bookings(State(service): State<Arc<ChatService>>) -> Json<Value> {
    let hotels = service.ledger().hotels().await;
    Json(json!({ "count": hotels.len(), "bookings": hotels }))
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    #[serde(default)]
    email: String,
}

async fn user_bookings(
    State(service): State<Arc<ChatService>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let email = query.email.trim();
    if email.is_empty() {
        return Err(VoyageError::validation("request", "email must not be empty").into());
    }
    let (flights, hotels) = service.ledger().for_email(email).await;
    Ok(Json(json!({
        "email": email,
        "flights": flights,
        "hotels": hotels,
    })))
}

fn sse_json(name: &str, data: &impl serde::Serialize) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

/// Graph events as they happen, then one `response` or `error` event
async fn travel_chat_stream(
    State(service): State<Arc<ChatService>>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(100);

    log::info!(
        "Starting streaming chat on thread '{}' (resume: {})",
        request.thread_id,
        request.resume
    );
    let handle =
        tokio::spawn(async move { service.travel_chat_with_events(request, tx).await });

    let events = ReceiverStream::new(rx).map(|event| Ok(sse_json("graph", &event)));
    let last = stream::once(async move {
        let event = match handle.await {
            Ok(Ok(response)) => sse_json("response", &response),
            Ok(Err(err)) => {
                let err = ApiError(err);
                log::error!("Streaming chat failed: {}", err.0);
                sse_json("error", &err.body())
            }
            Err(join) => {
                log::error!("Streaming chat task failed: {}", join);
                sse_json("error", &json!({ "error": join.to_string(), "kind": "internal_error" }))
            }
        };
        Ok(event)
    });

    Sse::new(events.chain(last)).keep_alive(
        KeepAlive::new().interval(std::time::Duration::from_secs(1)),
    )
}
