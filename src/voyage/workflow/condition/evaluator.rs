// SPDX-License-Identifier: MIT

//! Guard expression evaluator

use super::ast::{CompareOp, Expression, Literal};
use crate::voyage::workflow::state::GraphState;
use serde_json::Value;

/// Evaluate a guard against graph state
pub fn evaluate(expr: &Expression, state: &GraphState) -> bool {
    match expr {
        Expression::True => true,
        Expression::False => false,
        Expression::Truthy(path) => is_truthy(state.get_path(path)),
        Expression::Compare { left, op, right } => compare(state.get_path(left), *op, right),
        Expression::And(l, r) => evaluate(l, state) && evaluate(r, state),
        Expression::Or(l, r) => evaluate(l, state) || evaluate(r, state),
        Expression::Not(inner) => !evaluate(inner, state),
    }
}

/// Absent, null, false, zero and empty values are falsy
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn compare(left: Option<&Value>, op: CompareOp, right: &Literal) -> bool {
    match op {
        CompareOp::Eq => equals(left, right),
        CompareOp::NotEq => !equals(left, right),
        CompareOp::Gt => numbers(left, right).is_some_and(|(a, b)| a > b),
        CompareOp::Gte => numbers(left, right).is_some_and(|(a, b)| a >= b),
        CompareOp::Lt => numbers(left, right).is_some_and(|(a, b)| a < b),
        CompareOp::Lte => numbers(left, right).is_some_and(|(a, b)| a <= b),
        CompareOp::Contains => contains(left, right),
    }
}

fn equals(left: Option<&Value>, right: &Literal) -> bool {
    match (left.unwrap_or(&Value::Null), right) {
        (Value::Null, Literal::Null) => true,
        (Value::String(s), Literal::String(rs)) => s == rs,
        (Value::Number(n), Literal::Number(rn)) => {
            n.as_f64().is_some_and(|f| (f - rn).abs() < f64::EPSILON)
        }
        (Value::Bool(b), Literal::Boolean(rb)) => b == rb,
        _ => false,
    }
}

fn numbers(left: Option<&Value>, right: &Literal) -> Option<(f64, f64)> {
    match (left?, right) {
        (Value::Number(n), Literal::Number(rn)) => Some((n.as_f64()?, *rn)),
        _ => None,
    }
}

fn contains(left: Option<&Value>, right: &Literal) -> bool {
    match left {
        Some(Value::String(s)) => matches!(right, Literal::String(sub) if s.contains(sub.as_str())),
        Some(Value::Array(items)) => items.iter().any(|item| equals(Some(item), right)),
        _ => false,
    }
}
