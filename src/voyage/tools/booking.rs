// SPDX-License-Identifier: MIT

//! Hotel search and flight/hotel booking against an in-memory ledger

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::catalog::{Catalog, Flight, Hotel};
use crate::adk::error::{Result, VoyageError};
use crate::adk::tool::Tool;

const SEAT_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightReservation {
    pub booking_reference: String,
    pub flight_id: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub passenger_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub seat_number: String,
    pub total_price: f64,
    pub currency: String,
    pub status: String,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelReservation {
    pub booking_reference: String,
    pub hotel_id: String,
    pub hotel_name: String,
    pub city: String,
    pub room_type: String,
    pub guest_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub number_of_nights: i64,
    pub total_price: f64,
    pub currency: String,
    pub status: String,
    pub booked_at: DateTime<Utc>,
}

fn reference(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &id[..8])
}

fn parse_date(tool: &str, field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        VoyageError::validation(tool, format!("{} '{}' is not a YYYY-MM-DD date: {}", field, raw, e))
    })
}

/// Every booking made by the booking tools
#[derive(Debug, Default)]
pub struct BookingLedger {
    flights: RwLock<Vec<FlightReservation>>,
    hotels: RwLock<Vec<HotelReservation>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats still free on one departure
    pub async fn seats_left(&self, flight: &Flight, date: NaiveDate) -> u32 {
        let taken = self
            .flights
            .read()
            .await
            .iter()
            .filter(|r| r.flight_id == flight.flight_id && r.departure_date == date)
            .count() as u32;
        flight.seats.saturating_sub(taken)
    }

    /// Rooms free for every night of a stay
    pub async fn rooms_left(&self, hotel: &Hotel, check_in: NaiveDate, check_out: NaiveDate) -> u32 {
        let taken = self
            .hotels
            .read()
            .await
            .iter()
            .filter(|r| {
                r.hotel_id == hotel.hotel_id
                    && r.check_in_date < check_out
                    && check_in < r.check_out_date
            })
            .count() as u32;
        hotel.rooms.saturating_sub(taken)
    }

    pub async fn book_flight(
        &self,
        flight: &Flight,
        date: NaiveDate,
        passenger_name: &str,
        email: Option<String>,
    ) -> Result<FlightReservation> {
        if passenger_name.trim().is_empty() {
            return Err(VoyageError::validation("book_flight", "passenger_name is required"));
        }
        let mut flights = self.flights.write().await;
        let taken = flights
            .iter()
            .filter(|r| r.flight_id == flight.flight_id && r.departure_date == date)
            .count();
        if taken as u32 >= flight.seats {
            return Err(VoyageError::validation(
                "book_flight",
                format!("{} on {} is sold out", flight.flight_id, date),
            ));
        }

        let reservation = FlightReservation {
            booking_reference: reference("FL"),
            flight_id: flight.flight_id.clone(),
            airline: flight.airline.clone(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            departure_date: date,
            departure_time: flight.departure_time.clone(),
            passenger_name: passenger_name.trim().to_string(),
            email,
            seat_number: format!("{}{}", 10 + taken / 6, SEAT_LETTERS[taken % 6]),
            total_price: flight.price,
            currency: flight.currency.clone(),
            status: "confirmed".to_string(),
            booked_at: Utc::now(),
        };
        log::info!(
            "Booked flight {} on {} for {} ({})",
            reservation.flight_id,
            date,
            reservation.passenger_name,
            reservation.booking_reference
        );
        flights.push(reservation.clone());
        Ok(reservation)
    }

    pub async fn book_hotel(
        &self,
        hotel: &Hotel,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guest_name: &str,
        email: Option<String>,
    ) -> Result<HotelReservation> {
        if guest_name.trim().is_empty() {
            return Err(VoyageError::validation("book_hotel", "guest_name is required"));
        }
        let nights = (check_out - check_in).num_days();
        if nights < 1 {
            return Err(VoyageError::validation(
                "book_hotel",
                "check_out_date must be after check_in_date",
            ));
        }
        let mut hotels = self.hotels.write().await;
        let taken = hotels
            .iter()
            .filter(|r| {
                r.hotel_id == hotel.hotel_id
                    && r.check_in_date < check_out
                    && check_in < r.check_out_date
            })
            .count();
        if taken as u32 >= hotel.rooms {
            return Err(VoyageError::validation(
                "book_hotel",
                format!("{} has no rooms left for those dates", hotel.name),
            ));
        }

        let reservation = HotelReservation {
            booking_reference: reference("HT"),
            hotel_id: hotel.hotel_id.clone(),
            hotel_name: hotel.name.clone(),
            city: hotel.city.clone(),
            room_type: hotel.room_type.clone(),
            guest_name: guest_name.trim().to_string(),
            email,
            check_in_date: check_in,
            check_out_date: check_out,
            number_of_nights: nights,
            total_price: hotel.price_per_night * nights as f64,
            currency: hotel.currency.clone(),
            status: "confirmed".to_string(),
            booked_at: Utc::now(),
        };
        log::info!(
            "Booked {} from {} to {} for {} ({})",
            reservation.hotel_name,
            check_in,
            check_out,
            reservation.guest_name,
            reservation.booking_reference
        );
        hotels.push(reservation.clone());
        Ok(reservation)
    }

    pub async fn flights(&self) -> Vec<FlightReservation> {
        self.flights.read().await.clone()
    }

    pub async fn hotels(&self) -> Vec<HotelReservation> {
        self.hotels.read().await.clone()
    }

    /// Bookings made with `email`, compared case-insensitively
    pub async fn for_email(&self, email: &str) -> (Vec<FlightReservation>, Vec<HotelReservation>) {
        let matches = |candidate: &Option<String>| {
            candidate
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email.trim()))
        };
        let flights = self
            .flights
            .read()
            .await
            .iter()
            .filter(|r| matches(&r.email))
            .cloned()
            .collect();
        let hotels = self
            .hotels
            .read()
            .await
            .iter()
            .filter(|r| matches(&r.email))
            .cloned()
            .collect();
        (flights, hotels)
    }
}

// ============================================================================
// Tools
// ============================================================================

static SEARCH_HOTELS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "city": {"type": "string", "description": "City to stay in, e.g. 'Seoul'"},
            "check_in_date": {"type": "string", "description": "YYYY-MM-DD"},
            "check_out_date": {"type": "string", "description": "YYYY-MM-DD"}
        },
        "required": ["city"]
    })
});

static BOOK_FLIGHT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "flight_id": {"type": "string", "description": "Flight id from search_flight_availability"},
            "departure_date": {"type": "string", "description": "YYYY-MM-DD"},
            "passenger_name": {"type": "string"},
            "email": {"type": "string", "description": "Contact email for the booking"}
        },
        "required": ["flight_id", "departure_date", "passenger_name"]
    })
});

static BOOK_HOTEL_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "hotel_id": {"type": "string", "description": "Hotel id from search_hotels"},
            "check_in_date": {"type": "string", "description": "YYYY-MM-DD"},
            "check_out_date": {"type": "string", "description": "YYYY-MM-DD"},
            "guest_name": {"type": "string"},
            "email": {"type": "string", "description": "Contact email for the booking"}
        },
        "required": ["hotel_id", "check_in_date", "check_out_date", "guest_name"]
    })
});

#[derive(Debug, Deserialize)]
struct SearchHotelsArgs {
    city: String,
    #[serde(default)]
    check_in_date: Option<String>,
    #[serde(default)]
    check_out_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookFlightArgs {
    flight_id: String,
    departure_date: String,
    passenger_name: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookHotelArgs {
    hotel_id: String,
    check_in_date: String,
    check_out_date: String,
    guest_name: String,
    #[serde(default)]
    email: Option<String>,
}

/// Lists hotels in a city, with availability when dates are given
pub struct HotelSearchTool {
    catalog: Arc<Catalog>,
    ledger: Arc<BookingLedger>,
}

impl HotelSearchTool {
    pub fn new(catalog: Arc<Catalog>, ledger: Arc<BookingLedger>) -> Self {
        Self { catalog, ledger }
    }
}

#[async_trait]
impl Tool for HotelSearchTool {
    fn name(&self) -> &str {
        "search_hotels"
    }

    fn description(&self) -> &str {
        "Lists hotels in a city with room type and nightly price. With check-in and check-out dates it also reports rooms left."
    }

    fn schema(&self) -> &Value {
        &SEARCH_HOTELS_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: SearchHotelsArgs = serde_json::from_value(input)?;
        let stay = match (&args.check_in_date, &args.check_out_date) {
            (Some(check_in), Some(check_out)) => Some((
                parse_date(self.name(), "check_in_date", check_in)?,
                parse_date(self.name(), "check_out_date", check_out)?,
            )),
            _ => None,
        };

        let mut hotels = Vec::new();
        for hotel in self.catalog.hotels_in(&args.city) {
            let mut entry = serde_json::to_value(hotel)?;
            if let Some((check_in, check_out)) = stay {
                entry["rooms_left"] = json!(self.ledger.rooms_left(hotel, check_in, check_out).await);
            }
            hotels.push(entry);
        }
        log::debug!("search_hotels: {} hotel(s) in {}", hotels.len(), args.city);
        Ok(json!({ "city": args.city, "hotels": hotels }))
    }
}

/// Books one seat on a catalog flight
pub struct BookFlightTool {
    catalog: Arc<Catalog>,
    ledger: Arc<BookingLedger>,
}

impl BookFlightTool {
    pub fn new(catalog: Arc<Catalog>, ledger: Arc<BookingLedger>) -> Self {
        Self { catalog, ledger }
    }
}

#[async_trait]
impl Tool for BookFlightTool {
    fn name(&self) -> &str {
        "book_flight"
    }

    fn description(&self) -> &str {
        "Books one seat on a flight for a given date. Returns the booking reference to quote as the confirmation code."
    }

    fn schema(&self) -> &Value {
        &BOOK_FLIGHT_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: BookFlightArgs = serde_json::from_value(input)?;
        let flight = self.catalog.flight(&args.flight_id).ok_or_else(|| {
            VoyageError::validation(self.name(), format!("unknown flight '{}'", args.flight_id))
        })?;
        let date = parse_date(self.name(), "departure_date", &args.departure_date)?;
        let reservation = self
            .ledger
            .book_flight(flight, date, &args.passenger_name, args.email)
            .await?;
        Ok(serde_json::to_value(reservation)?)
    }
}

/// Books one room at a catalog hotel
pub struct BookHotelTool {
    catalog: Arc<Catalog>,
    ledger: Arc<BookingLedger>,
}

impl BookHotelTool {
    pub fn new(catalog: Arc<Catalog>, ledger: Arc<BookingLedger>) -> Self {
        Self { catalog, ledger }
    }
}

#[async_trait]
impl Tool for BookHotelTool {
    fn name(&self) -> &str {
        "book_hotel"
    }

    fn description(&self) -> &str {
        "Books one room at a hotel between two dates. Returns the booking reference to quote as the confirmation code."
    }

    fn schema(&self) -> &Value {
        &BOOK_HOTEL_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: BookHotelArgs = serde_json::from_value(input)?;
        let hotel = self.catalog.hotel(&args.hotel_id).ok_or_else(|| {
            VoyageError::validation(self.name(), format!("unknown hotel '{}'", args.hotel_id))
        })?;
        let check_in = parse_date(self.name(), "check_in_date", &args.check_in_date)?;
        let check_out = parse_date(self.name(), "check_out_date", &args.check_out_date)?;
        let reservation = self
            .ledger
            .book_hotel(hotel, check_in, check_out, &args.guest_name, args.email)
            .await?;
        Ok(serde_json::to_value(reservation)?)
    }
}
