//! State of the render in progress, reachable from template functions
//!
//! gtmpl functions are plain `fn` pointers, so the document name, missing-key
//! policy, collected warnings and pre-rendered partials live in a thread-local
//! frame for the duration of one `execute` call.

use std::cell::RefCell;
use std::collections::HashMap;

use gtmpl_value::{FuncError, Value};

use super::{MissingKey, NO_VALUE};
use crate::domain::Diagnostic;
use crate::error::{ForgeError, template::exec_failed};

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// A partial rendered ahead of execution. Warnings are only kept when the
/// document actually calls it.
pub enum Expansion {
    Rendered {
        text: String,
        warnings: Vec<Diagnostic>,
    },
    /// Surfaced unchanged the first time the partial is called
    Failed(Option<ForgeError>),
}

#[derive(Default)]
pub struct Frame {
    name: String,
    missing: MissingKey,
    /// `None` when rendering without a partial resolver
    partials: Option<HashMap<String, Expansion>>,
    pub warnings: Vec<Diagnostic>,
    /// The error behind a failed function call, preferred over gtmpl's wrapper
    pub failure: Option<ForgeError>,
}

impl Frame {
    pub fn new(
        name: &str,
        missing: MissingKey,
        partials: Option<HashMap<String, Expansion>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            missing,
            partials,
            warnings: Vec::new(),
            failure: None,
        }
    }

    /// Record an unresolved reference under the current policy
    pub fn unresolved(&mut self, label: &str) {
        if self.missing == MissingKey::Empty {
            self.warnings.push(
                Diagnostic::warning(format!("unresolved template variable: {label}"))
                    .in_file(&self.name),
            );
        }
    }

    /// What a missing value prints as
    pub fn placeholder(&self) -> &'static str {
        match self.missing {
            MissingKey::Empty => "",
            MissingKey::NoValue => NO_VALUE,
        }
    }

    pub fn expand_partial(&mut self, name: &str) -> Result<Value, FuncError> {
        let error = match self.partials.as_mut().map(|partials| partials.get_mut(name)) {
            None => exec_failed(
                &self.name,
                format!("partial \"{name}\" used but no partial resolver is available"),
            ),
            Some(None) => exec_failed(
                &self.name,
                format!("partial \"{name}\" must be named by a string literal"),
            ),
            Some(Some(Expansion::Rendered { text, warnings })) => {
                self.warnings.extend(warnings.iter().cloned());
                return Ok(Value::String(text.clone()));
            }
            Some(Some(Expansion::Failed(error))) => match error.take() {
                Some(error) => error,
                None => exec_failed(&self.name, format!("partial \"{name}\" failed")),
            },
        };
        let message = error.to_string();
        if self.failure.is_none() {
            self.failure = Some(error);
        }
        Err(FuncError::Generic(message))
    }
}

/// Run `body` with `frame` as the current frame and hand the frame back
pub fn enter<T>(frame: Frame, body: impl FnOnce() -> T) -> (T, Frame) {
    FRAMES.with_borrow_mut(|frames| frames.push(frame));
    let out = body();
    let frame = FRAMES.with_borrow_mut(Vec::pop).unwrap_or_default();
    (out, frame)
}

/// Apply `f` to the current frame, if a render is in progress
pub fn with_current<R>(f: impl FnOnce(&mut Frame) -> R) -> Option<R> {
    FRAMES.with_borrow_mut(|frames| frames.last_mut().map(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_current_only_inside_enter() {
        assert!(with_current(|_| ()).is_none());
        let frame = Frame::new("doc.md", MissingKey::Empty, None);
        let (seen, frame) = enter(frame, || with_current(|f| f.name.clone()));
        assert_eq!(seen.as_deref(), Some("doc.md"));
        assert_eq!(frame.name, "doc.md");
        assert!(with_current(|_| ()).is_none());
    }

    #[test]
    fn test_no_value_policy_is_silent() {
        let mut frame = Frame::new("cmd", MissingKey::NoValue, None);
        frame.unresolved("team");
        assert!(frame.warnings.is_empty());
        assert_eq!(frame.placeholder(), NO_VALUE);
    }

    #[test]
    fn test_failed_partial_surfaces_original_error() {
        let partials = HashMap::from([(
            "a".to_string(),
            Expansion::Failed(Some(crate::error::partial::not_found("a"))),
        )]);
        let mut frame = Frame::new("doc.md", MissingKey::Empty, Some(partials));
        assert!(frame.expand_partial("a").is_err());
        assert!(matches!(
            frame.failure,
            Some(ForgeError::PartialNotFound { ref name }) if name == "a"
        ));
    }
}
