// SPDX-License-Identifier: MIT

//! Checkpointed workflow engine and agent wiring

pub mod agent_factory;
pub mod checkpoint;
pub mod condition;
pub mod graph;
pub mod interrupt;
pub mod loader;
pub mod registry;
pub mod state;
pub mod subgraph;
pub mod types;
