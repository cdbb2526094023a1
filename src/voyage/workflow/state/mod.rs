// SPDX-License-Identifier: MIT

//! State management for graph workflows
//!
//! This module provides:
//! - `StateSchema` - declares which fields append and which replace
//! - `GraphState` - accumulated runtime state with reducer support
//! - `StateUpdate` - the partial state a step hands back to the engine

mod schema;
mod values;

pub use schema::{Reducer, StateFieldDef, StateSchema};
pub use values::{GraphState, StateUpdate};
