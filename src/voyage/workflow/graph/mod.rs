// SPDX-License-Identifier: MIT

//! Checkpointed state-machine graphs
//!
//! A graph is a fixed set of named steps joined by unconditional or guarded
//! edges between the START and END pseudo-steps. The engine runs steps over
//! a shared state until one suspends or END is reached, persisting its
//! position so a later invocation can resume it.

mod builder;
mod edge;
mod engine;
mod event;
mod step;

pub use builder::GraphBuilder;
pub use edge::{route, Edge, Guard, END, START};
pub use engine::{
    Durability, GraphEngine, Input, RunOutcome, ThreadStatus, DEFAULT_MAX_STEPS,
};
pub use event::{EventSender, GraphEvent};
pub use step::{FnStep, ResumeMode, Step, StepContext, StepOutcome};
