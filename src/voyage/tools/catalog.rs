// SPDX-License-Identifier: MIT

//! Bookable inventory: daily flights and hotels

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::adk::error::{Result, VoyageError};

const BUILTIN_CATALOG: &str = include_str!("../../../data/catalog.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    /// Local departure time, `HH:MM`
    pub departure_time: String,
    pub arrival_time: String,
    pub price: f64,
    pub currency: String,
    /// Seats sold per departure
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub hotel_id: String,
    pub name: String,
    pub city: String,
    pub room_type: String,
    pub price_per_night: f64,
    pub currency: String,
    pub rooms: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub hotels: Vec<Hotel>,
}

fn same_place(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl Catalog {
    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading catalog from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| VoyageError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        let mut ids: Vec<&str> = catalog
            .flights
            .iter()
            .map(|f| f.flight_id.as_str())
            .chain(catalog.hotels.iter().map(|h| h.hotel_id.as_str()))
            .collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(VoyageError::config(format!(
                "catalog lists '{}' more than once",
                pair[0]
            )));
        }
        Ok(catalog)
    }

    pub fn flight(&self, flight_id: &str) -> Option<&Flight> {
        self.flights
            .iter()
            .find(|f| f.flight_id.eq_ignore_ascii_case(flight_id.trim()))
    }

    pub fn hotel(&self, hotel_id: &str) -> Option<&Hotel> {
        self.hotels
            .iter()
            .find(|h| h.hotel_id.eq_ignore_ascii_case(hotel_id.trim()))
    }

    /// Flights on a route, cheapest first
    pub fn flights_between(&self, origin: &str, destination: &str) -> Vec<&Flight> {
        let mut found: Vec<&Flight> = self
            .flights
            .iter()
            .filter(|f| same_place(&f.origin, origin) && same_place(&f.destination, destination))
            .collect();
        found.sort_by(|a, b| a.price.total_cmp(&b.price));
        found
    }

    /// Hotels in a city, cheapest first
    pub fn hotels_in(&self, city: &str) -> Vec<&Hotel> {
        let mut found: Vec<&Hotel> = self
            .hotels
            .iter()
            .filter(|h| same_place(&h.city, city))
            .collect();
        found.sort_by(|a, b| a.price_per_night.total_cmp(&b.price_per_night));
        found
    }
}
