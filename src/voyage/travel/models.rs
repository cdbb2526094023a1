// SPDX-License-Identifier: MIT

//! Structured answers of the travel agents
//!
//! Each response type doubles as the JSON schema handed to the model, so
//! field docs end up in the prompt.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Query decomposition produced before requirements gathering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlanningResponse {
    /// A structured search plan naming the key aspects to explore
    pub plan: String,
    /// Sub-queries that break the main query into specific search aspects
    pub sub_queries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequirementsResponse {
    pub requirements: CompleteRequirements,
}

/// Everything known about the trip so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompleteRequirements {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// ISO date, or absent when flexible
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default)]
    pub travelers: Option<u32>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub confirmed_flight: Option<ConfirmedFlight>,
    #[serde(default)]
    pub missing_info: MissingInfo,
}

impl CompleteRequirements {
    /// The pending question, if the agent still needs something
    pub fn question(&self) -> Option<&str> {
        let question = self.missing_info.question.trim();
        (!question.is_empty()).then_some(question)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfirmedFlight {
    pub flight_id: String,
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// What the requirements agent still needs to ask
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MissingInfo {
    /// One question for the traveller; empty when nothing is missing
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlannerResponse {
    pub itinerary: Itinerary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Itinerary {
    pub destination: String,
    pub days: Vec<ItineraryDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(default)]
    pub date: Option<String>,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BookerResponse {
    pub bookings: Bookings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bookings {
    #[serde(default)]
    pub flights: Vec<FlightBooking>,
    #[serde(default)]
    pub hotels: Vec<HotelBooking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightBooking {
    pub flight_id: String,
    pub confirmation_code: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HotelBooking {
    pub hotel_name: String,
    pub confirmation_code: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
}
