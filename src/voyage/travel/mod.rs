// SPDX-License-Identifier: MIT

//! The travel pipeline: plan, gather requirements, build an itinerary, book

pub mod graphs;
pub mod models;
pub mod steps;

pub use graphs::{
    requirements_graph, requirements_schema, travel_system_graph, travel_system_schema,
    GraphSettings, TravelAgents, REQUIREMENTS_GRAPH, TRAVEL_SYSTEM_GRAPH,
};

/// History field shared by both graphs
pub const HISTORY: &str = "messages";

/// State field names
pub mod fields {
    pub const PLAN: &str = "plan";
    pub const SUB_QUERIES: &str = "sub_queries";
    pub const REQUIREMENTS: &str = "requirements";
    pub const REQUIREMENTS_COMPLETE: &str = "requirements_complete";
    pub const INTERRUPTION_MESSAGE: &str = "interruption_message";
    pub const ITINERARY: &str = "itinerary";
    pub const BOOKINGS: &str = "bookings";
}
