// SPDX-License-Identifier: MIT

//! Guard expressions for conditional edges
//!
//! Guards are small boolean expressions evaluated against graph state:
//! - `requirements_complete == true`
//! - `not requirements_complete`
//! - `requirements.destination == null or interruption_message != ''`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Expression, Literal};
pub use evaluator::{evaluate, is_truthy};
pub use parser::{parse, ParseError};
