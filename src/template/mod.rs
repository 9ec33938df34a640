//! Template rendering
//!
//! Documents use the Go `text/template` dialect through gtmpl. Text goes
//! through the shorthand pass, then the preparation pass, then is parsed and
//! executed against JSON data. Unresolved references never fail a render: they
//! print as empty and push a warning into the caller's diagnostic sink.

mod frame;
mod funcs;
mod prepare;
pub mod shorthand;
mod value;


use std::collections::HashMap;

use gtmpl::{Context, Template};
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::domain::Diagnostic;
use crate::error::{
    Result,
    template::{exec_failed, parse_failed},
};
use frame::{Expansion, Frame};

/// Marker printed for missing values under [`MissingKey::NoValue`]
pub const NO_VALUE: &str = "<no value>";

/// What a missing reference renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKey {
    /// Empty output plus a warning diagnostic
    #[default]
    Empty,
    /// The literal [`NO_VALUE`] marker, no diagnostic
    NoValue,
}

/// Expands `partial "name"` references during rendering
pub trait PartialLookup {
    /// Render the partial `name` against `data`, sharing the caller's scope
    fn expand(&self, name: &str, data: &JsonValue, scope: &mut RenderScope<'_>) -> Result<String>;
}

/// State shared by one top-level render and every partial it pulls in
pub struct RenderScope<'a> {
    pub partials: Option<&'a dyn PartialLookup>,
    /// Partials currently being expanded, outermost first
    pub stack: Vec<String>,
    pub sink: &'a mut Vec<Diagnostic>,
    pub missing: MissingKey,
}

impl<'a> RenderScope<'a> {
    pub fn new(partials: Option<&'a dyn PartialLookup>, sink: &'a mut Vec<Diagnostic>) -> Self {
        Self {
            partials,
            stack: Vec::new(),
            sink,
            missing: MissingKey::default(),
        }
    }

    #[must_use]
    pub fn with_missing(mut self, missing: MissingKey) -> Self {
        self.missing = missing;
        self
    }
}

/// Parsed template plus the partials it names
fn build(name: &str, text: &str) -> Result<(Template, Vec<String>)> {
    let expanded = shorthand::expand(text);
    let prepared = prepare::prepare(&expanded);
    let mut tmpl = Template::with_name(name);
    tmpl.add_funcs(funcs::FUNCS);
    tmpl.parse(prepared.text)
        .map_err(|e| parse_failed(name, e.to_string()))?;
    Ok((tmpl, prepared.partials))
}

/// Check that `text` parses, without executing it
pub fn check_syntax(name: &str, text: &str) -> Result<()> {
    build(name, text).map(|_| ())
}

/// Render `text` in a fresh scope
pub fn render(
    name: &str,
    text: &str,
    data: &JsonValue,
    partials: Option<&dyn PartialLookup>,
    sink: &mut Vec<Diagnostic>,
) -> Result<String> {
    let mut scope = RenderScope::new(partials, sink);
    render_in_scope(name, text, data, &mut scope)
}

/// Render `text` inside an existing scope (used for nested partials)
pub fn render_in_scope(
    name: &str,
    text: &str,
    data: &JsonValue,
    scope: &mut RenderScope<'_>,
) -> Result<String> {
    trace!(template = name, depth = scope.stack.len(), "rendering template");
    let (tmpl, partials) = build(name, text)?;
    let expansions = expand_partials(&partials, data, scope);

    let context = Context::from(value::from_json(data));
    let frame = Frame::new(name, scope.missing, expansions);
    let (rendered, frame) = frame::enter(frame, || tmpl.render(&context));
    scope.sink.extend(frame.warnings);
    rendered.map_err(|e| {
        frame
            .failure
            .unwrap_or_else(|| exec_failed(name, e.to_string()))
    })
}

/// Render every partial `names` lists ahead of execution, each with its own
/// sink so only the partials the document actually calls report warnings.
/// `None` without a resolver.
fn expand_partials(
    names: &[String],
    data: &JsonValue,
    scope: &RenderScope<'_>,
) -> Option<HashMap<String, Expansion>> {
    let lookup = scope.partials?;
    let expansions = names
        .iter()
        .map(|name| {
            let mut warnings = Vec::new();
            let mut nested = RenderScope {
                partials: Some(lookup),
                stack: scope.stack.clone(),
                sink: &mut warnings,
                missing: scope.missing,
            };
            let expansion = match lookup.expand(name, data, &mut nested) {
                Ok(text) => Expansion::Rendered { text, warnings },
                Err(e) => Expansion::Failed(Some(e)),
            };
            (name.clone(), expansion)
        })
        .collect();
    Some(expansions)
}
