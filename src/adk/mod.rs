// SPDX-License-Identifier: MIT

//! Agent development kit: models, tools, agents and the shared error type

pub mod agent;
pub mod error;
pub mod message;
pub mod model;
pub mod tool;
