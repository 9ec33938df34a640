//! Schema validation of a resolved context
//!
//! Every violation is collected; validation never stops at the first one.

use std::fmt;

use crate::domain::{FluxSchema, FluxType, FluxVariable};

use super::context::{Context, Node};

/// One schema violation for one variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluxViolation {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for FluxViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

/// Validate `context` against every declared variable in `schema`
pub fn validate(schema: &FluxSchema, context: &Context) -> Vec<FluxViolation> {
    schema
        .iter()
        .filter_map(|var| check_variable(var, context))
        .collect()
}

fn violation(var: &FluxVariable, message: String) -> Option<FluxViolation> {
    Some(FluxViolation {
        variable: var.name.clone(),
        message,
    })
}

fn check_variable(var: &FluxVariable, context: &Context) -> Option<FluxViolation> {
    let value = match context.get_by_path(&var.name) {
        None => None,
        Some(Node::Scalar(s)) if s.is_empty() => None,
        Some(node) => Some(node),
    };

    let Some(node) = value else {
        if var.required {
            return violation(var, "required variable is missing".to_string());
        }
        return None;
    };

    let Node::Scalar(text) = node else {
        return match var.kind {
            FluxType::Bool | FluxType::Int => violation(
                var,
                format!("expected a single {} value, found a nested map", var.kind),
            ),
            _ => None,
        };
    };

    match var.kind {
        FluxType::Bool if !is_bool(text) => violation(
            var,
            format!("value '{text}' is not a valid bool (expected true or false)"),
        ),
        FluxType::Int if text.trim().parse::<i64>().is_err() => {
            violation(var, format!("value '{text}' is not a valid int"))
        }
        // list values only need to be present; element syntax is not checked
        _ => None,
    }
}

fn is_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}
