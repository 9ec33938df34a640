//! Discovery: enumerate selectable values for a variable by running a command
//!
//! The command template is expanded against the current context (missing
//! references become `<no value>`), run through the platform shell, and its
//! stdout is parsed into options. Each output line is `label|value[|extra...]`
//! or a bare token used as both label and value.
//!
//! With a `parse` template, stdout is decoded as JSON first and the template
//! turns it into lines in the same convention.

use std::process::Command;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::domain::DiscoverySpec;
use crate::error::{
    Result,
    discovery::{failed, parse_failed},
};
use crate::flux::Context;
use crate::template::{self, MissingKey, RenderScope};

/// One selectable value produced by discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredOption {
    pub label: String,
    pub value: String,
    /// Segments after the value, addressed by `also_sets` positions
    pub extra: Vec<String>,
}

impl DiscoveredOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            extra: Vec::new(),
        }
    }
}

fn render_no_value(name: &str, text: &str, data: &JsonValue) -> Result<String> {
    let mut sink = Vec::new();
    let mut scope = RenderScope::new(None, &mut sink).with_missing(MissingKey::NoValue);
    template::render_in_scope(name, text, data, &mut scope)
}

/// Expand context references in the command template
pub fn expand_command(command: &str, context: &Context) -> Result<String> {
    render_no_value("discover.command", command, &context.to_json())
}

/// Run `command` through the platform shell and return its stdout
pub fn run_command(command: &str) -> Result<String> {
    debug!(command, "running discovery command");
    let output = shell(command)
        .output()
        .map_err(|e| failed(command, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("exited with {}", output.status),
            text => format!("exited with {}: {text}", output.status),
        };
        return Err(failed(command, reason));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// Parse `label|value[|extra...]` lines; blank lines are skipped
pub fn parse_lines(output: &str) -> Vec<DiscoveredOption> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut segments = line.split('|');
            let first = segments.next().unwrap_or_default().to_string();
            match segments.next() {
                None => DiscoveredOption::new(first.clone(), first),
                Some(value) => DiscoveredOption {
                    label: first,
                    value: value.to_string(),
                    extra: segments.map(str::to_string).collect(),
                },
            }
        })
        .collect()
}

/// Decode `output` as JSON, render `parse_template` over it, then parse the lines
pub fn parse_structured(output: &str, parse_template: &str) -> Result<Vec<DiscoveredOption>> {
    let data: JsonValue = serde_json::from_str(output)
        .map_err(|e| parse_failed(format!("output is not valid JSON: {e}")))?;
    let lines = render_no_value("discover.parse", parse_template, &data)
        .map_err(|e| parse_failed(e.to_string()))?;
    Ok(parse_lines(&lines))
}

/// Run discovery for `spec` against the current context
pub fn discover(spec: &DiscoverySpec, context: &Context) -> Result<Vec<DiscoveredOption>> {
    let command = expand_command(&spec.command, context)?;
    let stdout = run_command(&command)?;
    let options = match &spec.parse {
        Some(parse_template) => parse_structured(&stdout, parse_template)?,
        None => parse_lines(&stdout),
    };
    debug!(count = options.len(), "discovered options");
    Ok(options)
}

/// Variable assignments implied by choosing `option`
///
/// Positions past the option's extra fields are skipped.
pub fn also_sets(option: &DiscoveredOption, spec: &DiscoverySpec) -> Vec<(String, String)> {
    spec.also_sets
        .iter()
        .filter_map(|(name, &position)| {
            option
                .extra
                .get(position)
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}
