// SPDX-License-Identifier: MIT

//! Conversational travel planner built on a checkpointed workflow engine

pub mod config;
pub mod server;
pub mod service;
pub mod tools;
pub mod travel;
pub mod workflow;
