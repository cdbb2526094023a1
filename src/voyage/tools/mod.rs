// SPDX-License-Identifier: MIT

//! Tools available to travel agents

pub mod booking;
pub mod catalog;
pub mod flights;
pub mod search;

use std::sync::Arc;

pub use booking::{
    BookFlightTool, BookHotelTool, BookingLedger, FlightReservation, HotelReservation,
    HotelSearchTool,
};
pub use catalog::{Catalog, Flight, Hotel};
pub use flights::FlightSearchTool;
pub use search::WebSearchTool;

use crate::voyage::workflow::registry::ToolRegistry;

/// Add the search and booking tools, all sharing `catalog` and `ledger`
pub fn with_travel_tools(
    registry: ToolRegistry,
    catalog: Arc<Catalog>,
    ledger: Arc<BookingLedger>,
) -> ToolRegistry {
    registry
        .with_tool(Arc::new(FlightSearchTool::new(catalog.clone(), ledger.clone())))
        .with_tool(Arc::new(HotelSearchTool::new(catalog.clone(), ledger.clone())))
        .with_tool(Arc::new(BookFlightTool::new(catalog.clone(), ledger.clone())))
        .with_tool(Arc::new(BookHotelTool::new(catalog, ledger)))
}
