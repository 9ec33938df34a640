//! Flux resolution: layered variable values with precedence and validation
//!
//! Precedence, lowest to highest:
//! 1. Inline defaults declared in the schema
//! 2. An externally supplied defaults file
//! 3. Explicit `dotted.key=value` overrides
//!
//! Defaults (layers 1 and 2) only fill gaps. Overrides replace any leaf.
//! Every step returns a new [`Context`]; inputs are never modified.

pub mod context;
pub mod overrides;
pub mod validate;


use serde_json::Value as JsonValue;
use tracing::debug;

use crate::domain::{FluxSchema, FluxType};
use crate::error::{Result, flux::validation_failed};

pub use context::{Context, Node};
pub use overrides::Override;
pub use validate::{FluxViolation, validate};

/// Fill absent keys with the schema's non-empty inline defaults
pub fn apply_defaults(schema: &FluxSchema, context: &Context) -> Context {
    schema.iter().fold(context.clone(), |acc, var| {
        match var.non_empty_default() {
            Some(default) if !acc.contains(&var.name) => acc.set_by_path(&var.name, default),
            _ => acc,
        }
    })
}

/// Deep-merge `overlay` over `context`
pub fn apply_layer(context: &Context, overlay: &Context) -> Context {
    context.apply_layer(overlay)
}

/// Set `value` at a dotted path
pub fn set_by_path(context: &Context, path: &str, value: &str) -> Context {
    context.set_by_path(path, value)
}

/// Look up a dotted path
pub fn get_by_path<'a>(context: &'a Context, path: &str) -> Option<&'a Node> {
    context.get_by_path(path)
}

/// Apply overrides in order; later overrides win
pub fn apply_overrides(context: &Context, overrides: &[Override]) -> Context {
    overrides.iter().fold(context.clone(), |acc, o| {
        acc.set_by_path(&o.key, o.value.as_str())
    })
}

/// Build the variable context from every layer
pub fn resolve(schema: &FluxSchema, defaults_file: &Context, overrides: &[Override]) -> Context {
    let base = apply_layer(&Context::new(), defaults_file);
    debug!(keys = base.iter().count(), "applied defaults file layer");
    let with_defaults = apply_defaults(schema, &base);
    let resolved = apply_overrides(&with_defaults, overrides);
    debug!(overrides = overrides.len(), "resolved flux context");
    resolved
}

/// Validate and turn the violations into a single error carrying all of them
pub fn ensure_valid(schema: &FluxSchema, context: &Context) -> Result<()> {
    let violations = validate(schema, context);
    if violations.is_empty() {
        return Ok(());
    }
    Err(validation_failed(
        violations.iter().map(ToString::to_string).collect(),
    ))
}

/// JSON data handed to the template engine.
///
/// Leaves declared `bool` become JSON booleans and leaves declared `int`
/// become numbers, so `{{if .flag}}` behaves as authors expect.
pub fn render_data(schema: &FluxSchema, context: &Context) -> JsonValue {
    let mut data = context.to_json();
    for var in schema.iter() {
        let Some(text) = context.get_scalar(&var.name) else {
            continue;
        };
        let typed = match var.kind {
            FluxType::Bool if text.eq_ignore_ascii_case("true") => JsonValue::Bool(true),
            FluxType::Bool if text.eq_ignore_ascii_case("false") => JsonValue::Bool(false),
            FluxType::Int => match text.trim().parse::<i64>() {
                Ok(n) => JsonValue::from(n),
                Err(_) => continue,
            },
            _ => continue,
        };
        set_json_path(&mut data, &var.name, typed);
    }
    data
}

fn set_json_path(data: &mut JsonValue, path: &str, value: JsonValue) {
    let mut current = data;
    let segs: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segs.split_last() else {
        return;
    };
    for seg in parents {
        match current.get_mut(*seg) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(obj) = current.as_object_mut() {
        obj.insert((*last).to_string(), value);
    }
}
