// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::booking::BookingLedger;
use super::catalog::Catalog;
use crate::adk::error::{Result, VoyageError};
use crate::adk::tool::Tool;

static FLIGHT_SEARCH_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "origin": {"type": "string", "description": "Departure city, e.g. 'Tokyo'"},
            "destination": {"type": "string", "description": "Arrival city, e.g. 'Seoul'"},
            "departure_date": {
                "type": "string",
                "description": "YYYY-MM-DD; when given, seats left on that day are reported"
            }
        },
        "required": ["origin", "destination"]
    })
});

#[derive(Debug, Deserialize)]
struct FlightSearchArgs {
    origin: String,
    destination: String,
    #[serde(default)]
    departure_date: Option<String>,
}

/// Daily flights on a route, for the requirements agent to confirm one
pub struct FlightSearchTool {
    catalog: Arc<Catalog>,
    ledger: Arc<BookingLedger>,
}

impl FlightSearchTool {
    pub fn new(catalog: Arc<Catalog>, ledger: Arc<BookingLedger>) -> Self {
        Self { catalog, ledger }
    }
}

#[async_trait]
impl Tool for FlightSearchTool {
    fn name(&self) -> &str {
        "search_flight_availability"
    }

    fn description(&self) -> &str {
        "Finds flights between two cities, cheapest first, with airline, times and price. With a departure date it also reports seats left."
    }

    fn schema(&self) -> &Value {
        &FLIGHT_SEARCH_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: FlightSearchArgs = serde_json::from_value(input)?;
        let date = args
            .departure_date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                    VoyageError::validation(
                        self.name(),
                        format!("departure_date '{}' is not a YYYY-MM-DD date: {}", raw, e),
                    )
                })
            })
            .transpose()?;

        let mut flights = Vec::new();
        for flight in self.catalog.flights_between(&args.origin, &args.destination) {
            let mut entry = serde_json::to_value(flight)?;
            if let Some(date) = date {
                let left = self.ledger.seats_left(flight, date).await;
                if left == 0 {
                    continue;
                }
                entry["seats_left"] = json!(left);
                entry["departure_date"] = json!(date);
            }
            flights.push(entry);
        }

        log::debug!(
            "search_flight_availability: {} -> {}: {} flight(s)",
            args.origin,
            args.destination,
            flights.len()
        );
        Ok(json!({
            "origin": args.origin,
            "destination": args.destination,
            "flights": flights
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> (FlightSearchTool, Arc<Catalog>, Arc<BookingLedger>) {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        let ledger = Arc::new(BookingLedger::new());
        (
            FlightSearchTool::new(catalog.clone(), ledger.clone()),
            catalog,
            ledger,
        )
    }

    #[tokio::test]
    async fn test_search_lists_route_cheapest_first() {
        let (tool, _, _) = tool();
        let result = tool
            .execute(json!({"origin": "Tokyo", "destination": "Seoul"}))
            .await
            .unwrap();
        let flights = result["flights"].as_array().unwrap();
        assert_eq!(flights.len(), 3);
        assert_eq!(flights[0]["flight_id"], "OZ101");
        assert!(flights[0].get("seats_left").is_none());
    }

    #[tokio::test]
    async fn test_search_with_date_reports_seats() {
        let (tool, catalog, ledger) = tool();
        let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let ke704 = catalog.flight("KE704").unwrap();
        ledger.book_flight(ke704, date, "Mina Park", None).await.unwrap();

        let result = tool
            .execute(json!({"origin": "Tokyo", "destination": "Seoul", "departure_date": "2026-11-03"}))
            .await
            .unwrap();
        let booked = result["flights"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["flight_id"] == "KE704")
            .unwrap();
        assert_eq!(booked["seats_left"], 179);
        assert_eq!(booked["departure_date"], "2026-11-03");
    }

    #[tokio::test]
    async fn test_search_rejects_bad_date() {
        let (tool, _, _) = tool();
        let err = tool
            .execute(json!({"origin": "Tokyo", "destination": "Seoul", "departure_date": "soon"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation_failure");
    }
}
