//! Interactive prompting for variables still missing after layering
//!
//! Each missing variable is first turned into a [`PromptPlan`] (which widget,
//! which choices) and then asked with `inquire`. Planning is pure so the
//! fallback order can be tested without a terminal.

use std::fmt;

use inquire::{Confirm, MultiSelect, Select, Text};
use tracing::debug;

use crate::discovery::{self, DiscoveredOption};
use crate::domain::{FluxSchema, FluxType, FluxVariable, PromptKind};
use crate::error::Result;
use crate::flux::Context;

/// A discovered option shown by its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice(pub DiscoveredOption);

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.label)
    }
}

/// How one variable is asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPlan {
    Discovered {
        choices: Vec<Choice>,
        multi: bool,
    },
    Options(Vec<String>),
    Confirm(bool),
    Text(Option<String>),
}

/// Pick the widget for `var`.
///
/// `discovered` carries the outcome of running the variable's discovery
/// command, if it has one. A failure or an empty result falls back to the
/// static options, then to free text.
pub fn plan(var: &FluxVariable, discovered: Option<Result<Vec<DiscoveredOption>>>) -> PromptPlan {
    if let (Some(spec), Some(result)) = (&var.discover, discovered) {
        match result {
            Ok(options) if !options.is_empty() => {
                return PromptPlan::Discovered {
                    choices: options.into_iter().map(Choice).collect(),
                    multi: spec.prompt == PromptKind::Multiselect,
                };
            }
            Ok(_) => debug!(variable = %var.name, "discovery returned no options"),
            Err(e) => debug!(variable = %var.name, error = %e, "discovery failed"),
        }
    }

    match var.kind {
        FluxType::Bool => PromptPlan::Confirm(
            var.default
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case("true")),
        ),
        _ if !var.options.is_empty() => PromptPlan::Options(var.options.clone()),
        _ => PromptPlan::Text(var.non_empty_default().map(ToString::to_string)),
    }
}

/// Values an answer assigns: the variable itself plus any `also_sets` fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub assignments: Vec<(String, String)>,
}

impl Answer {
    fn single(name: &str, value: impl Into<String>) -> Self {
        Self {
            assignments: vec![(name.to_string(), value.into())],
        }
    }

    /// Apply every assignment to `context`
    pub fn apply(&self, context: &Context) -> Context {
        self.assignments
            .iter()
            .fold(context.clone(), |acc, (path, value)| {
                acc.set_by_path(path, value.as_str())
            })
    }
}

/// Answer for choosing `selected` among discovered options
pub fn discovered_answer(var: &FluxVariable, selected: &[Choice]) -> Answer {
    let value = selected
        .iter()
        .map(|c| c.0.value.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let mut answer = Answer::single(&var.name, value);
    if let ([only], Some(spec)) = (selected, &var.discover) {
        answer.assignments.extend(discovery::also_sets(&only.0, spec));
    }
    answer
}

fn message(var: &FluxVariable) -> String {
    var.prompt.clone().unwrap_or_else(|| var.name.clone())
}

/// Ask one variable; `None` when the user skipped it
fn ask(var: &FluxVariable, plan: PromptPlan) -> Result<Option<Answer>> {
    let message = message(var);
    let answer = match plan {
        PromptPlan::Discovered { choices, multi: false } => {
            Select::new(&message, choices)
                .with_page_size(10)
                .with_help_message("↑↓ to move, type to filter, ENTER to select, ESC to skip")
                .prompt_skippable()?
                .map(|choice| discovered_answer(var, &[choice]))
        }
        PromptPlan::Discovered { choices, multi: true } => {
            MultiSelect::new(&message, choices)
                .with_page_size(10)
                .with_help_message("  ↑↓ navigate  space select  enter confirm  esc skip")
                .prompt_skippable()?
                .map(|selected| discovered_answer(var, &selected))
        }
        PromptPlan::Options(options) => Select::new(&message, options)
            .with_page_size(10)
            .prompt_skippable()?
            .map(|value| Answer::single(&var.name, value)),
        PromptPlan::Confirm(default) => Confirm::new(&message)
            .with_default(default)
            .prompt_skippable()?
            .map(|value| Answer::single(&var.name, value.to_string())),
        PromptPlan::Text(default) => {
            let mut text = Text::new(&message);
            if let Some(default) = default.as_deref() {
                text = text.with_default(default);
            }
            text.prompt_skippable()?
                .map(|value| Answer::single(&var.name, value))
        }
    };
    Ok(answer)
}

/// Prompt for every declared variable absent from `context`
///
/// Variables are asked in declaration order, so a discovery command may
/// reference values answered earlier.
pub fn prompt_missing(schema: &FluxSchema, context: &Context) -> Result<Context> {
    let mut context = context.clone();
    for var in schema.iter() {
        if context.contains(&var.name) {
            continue;
        }
        let discovered = var
            .discover
            .as_ref()
            .map(|spec| discovery::discover(spec, &context));
        let plan = plan(var, discovered);
        debug!(variable = %var.name, ?plan, "prompting");
        if let Some(answer) = ask(var, plan)? {
            context = answer.apply(&context);
        }
    }
    Ok(context)
}
