//! Shorthand preprocessing
//!
//! Authors may write `{{org}}` instead of `{{.org}}`. A bare action holding a
//! dotted identifier path is rewritten into the explicit data-access form
//! unless its leading identifier is a reserved word.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Control keywords that must never be rewritten
pub const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "end", "range", "with", "define", "block", "template", "break", "continue",
];

/// Literal keywords
pub const LITERALS: &[&str] = &["true", "false", "nil"];

/// Function name used to reference a partial
pub const PARTIAL_FUNC: &str = "partial";

/// Functions available inside templates (see `funcs`)
pub const FUNCTIONS: &[&str] = &[
    "and",
    "or",
    "not",
    "eq",
    "ne",
    "lt",
    "le",
    "gt",
    "ge",
    "len",
    "index",
    "print",
    "printf",
    "println",
    "default",
    "upper",
    "lower",
    "trim",
    "join",
    "split",
    "contains",
    "hasPrefix",
    "hasSuffix",
    "replace",
];

/// Every word excluded from shorthand rewriting
pub static RESERVED_WORDS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CONTROL_KEYWORDS
        .iter()
        .chain(LITERALS)
        .chain(FUNCTIONS)
        .chain(std::iter::once(&PARTIAL_FUNC))
        .copied()
        .collect()
});

#[allow(clippy::expect_used)]
static SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{\{(-\s+|\s*)([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(\s+-|\s*)\}\}",
    )
    .expect("shorthand pattern is valid")
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// Rewrite `{{name.path}}` into `{{.name.path}}`, leaving reserved words alone
pub fn expand(text: &str) -> Cow<'_, str> {
    SHORTHAND.replace_all(text, |caps: &Captures| {
        let path = &caps[2];
        let head = path.split('.').next().unwrap_or(path);
        if is_reserved(head) {
            caps[0].to_string()
        } else {
            format!("{{{{{}.{}{}}}}}", &caps[1], path, &caps[3])
        }
    })
}
