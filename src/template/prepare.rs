//! Preparation pass between shorthand expansion and gtmpl parsing
//!
//! - Field references (`.a.b`, `$.a`, `$x.a`) become `lookup` calls, or
//!   `peek` calls where a missing value is expected: conditions, ranges and
//!   the arguments of `default`, `and`, `or` and `not`.
//! - Printing actions end in `emit`, which applies the missing-key policy and
//!   refuses to print maps.
//! - `range` is lowered onto the sorted keys of its collection, so maps
//!   iterate in key order and `else` only runs for empty collections.
//!
//! Literal `partial "name"` references are collected on the way.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::shorthand::PARTIAL_FUNC;

pub const LOOKUP: &str = "lookup";
pub const PEEK: &str = "peek";
pub const EMIT: &str = "emit";
pub const RANGE_KEYS: &str = "rangeKeys";
pub const RANGE_ENTRY: &str = "rangeEntry";
pub const RANGE_DOT: &str = "rangeDot";

/// Functions whose arguments may be missing without a warning
const QUIET_FUNCS: &[&str] = &["default", "and", "or", "not"];

#[allow(clippy::expect_used)]
static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{(-\s)?(.*?)(\s-)?\}\}").expect("action pattern is valid")
});

#[allow(clippy::expect_used)]
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        (?P<str>"(?:[^"\\]|\\.)*"|`[^`]*`|'(?:[^'\\]|\\.)*')
        |(?P<chain>(?:\$[A-Za-z0-9_]*)?(?:\.[A-Za-z_][A-Za-z0-9_]*)+)
        |(?P<var>\$[A-Za-z0-9_]*)
        |(?P<ident>[A-Za-z_][A-Za-z0-9_]*)
        |(?P<punct>:=|[|(),=])
        |(?P<space>\s+)
        |(?P<other>.)
        "#,
    )
    .expect("token pattern is valid")
});

const KINDS: &[(Kind, &str)] = &[
    (Kind::Str, "str"),
    (Kind::Chain, "chain"),
    (Kind::Var, "var"),
    (Kind::Ident, "ident"),
    (Kind::Punct, "punct"),
    (Kind::Space, "space"),
    (Kind::Other, "other"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Str,
    Chain,
    Var,
    Ident,
    Punct,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: Kind,
    text: &'a str,
}

impl Token<'_> {
    fn is(&self, kind: Kind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// Text ready for gtmpl plus the partials it names literally
#[derive(Debug)]
pub struct Prepared {
    pub text: String,
    pub partials: Vec<String>,
}

enum Block {
    Range { else_seen: bool },
    Other,
}

#[derive(Default)]
struct Prep {
    blocks: Vec<Block>,
    ranges: usize,
    partials: Vec<String>,
}

pub fn prepare(text: &str) -> Prepared {
    let mut prep = Prep::default();
    let text = ACTION
        .replace_all(text, |caps: &Captures| prep.action(caps))
        .into_owned();
    Prepared {
        text,
        partials: prep.partials,
    }
}

impl Prep {
    fn action(&mut self, caps: &Captures) -> String {
        let body = caps.get(2).map_or("", |m| m.as_str());
        let tokens = tokenize(body);
        self.collect_partials(&tokens);
        let Some(bodies) = self.rewrite(body.trim(), trim_spaces(&tokens)) else {
            return caps[0].to_string();
        };
        let ltrim = caps.get(1).map_or("", |m| m.as_str());
        let rtrim = caps.get(3).map_or("", |m| m.as_str());
        let last = bodies.len().saturating_sub(1);
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                let l = if i == 0 { ltrim } else { "" };
                let r = if i == last { rtrim } else { "" };
                format!("{{{{{l}{body}{r}}}}}")
            })
            .collect()
    }

    /// Replacement action bodies, or `None` to keep the action as written
    fn rewrite(&mut self, trimmed: &str, toks: &[Token<'_>]) -> Option<Vec<String>> {
        if trimmed.starts_with("/*") {
            return None;
        }
        let first = toks.first()?;
        if first.kind != Kind::Ident {
            return Some(vec![statement(trimmed, toks)]);
        }
        let rest = trim_spaces(&toks[1..]);
        match first.text {
            "end" => {
                let closes = match self.blocks.pop() {
                    Some(Block::Range { else_seen: false }) => 3,
                    _ => 1,
                };
                Some(vec!["end".to_string(); closes])
            }
            "else" => {
                if let Some(Block::Range { else_seen }) = self.blocks.last_mut() {
                    *else_seen = true;
                    return Some(["end", "end", "else"].map(String::from).to_vec());
                }
                if !rest.first().is_some_and(|t| t.is(Kind::Ident, "if")) {
                    return None;
                }
                let pipe = pipeline(trim_spaces(&rest[1..]), true);
                Some(vec![format!("else if {pipe}")])
            }
            "if" | "with" => {
                self.blocks.push(Block::Other);
                Some(vec![format!("{} {}", first.text, pipeline(rest, true))])
            }
            "range" => Some(self.range(rest)),
            "define" => {
                self.blocks.push(Block::Other);
                None
            }
            "block" => {
                self.blocks.push(Block::Other);
                Some(vec![invocation(first.text, rest)])
            }
            "template" => Some(vec![invocation(first.text, rest)]),
            "break" | "continue" => None,
            _ => Some(vec![statement(trimmed, toks)]),
        }
    }

    /// `range [$k[, $v] :=] P` iterates the sorted keys of P, rebinding dot to
    /// each value through a one-element inner range
    fn range(&mut self, toks: &[Token<'_>]) -> Vec<String> {
        let n = self.ranges;
        self.ranges += 1;
        self.blocks.push(Block::Range { else_seen: false });

        let (vars, source) = match declaration(toks) {
            Some((vars, _, source)) => (vars, source),
            None => (Vec::new(), toks),
        };
        let (key, value) = match vars.as_slice() {
            [key, value] => ((*key).to_string(), (*value).to_string()),
            [value] => (format!("$_i{n}"), (*value).to_string()),
            _ => (format!("$_i{n}"), format!("$_v{n}")),
        };
        let collection = format!("$_r{n}");
        let keys = format!("$_k{n}");
        vec![
            format!("{collection} := {}", pipeline(source, true)),
            format!("{keys} := {collection} | {RANGE_KEYS}"),
            format!("if {keys}"),
            format!("range {key} := {keys}"),
            format!("{value} := {RANGE_ENTRY} {collection} {key}"),
            format!("range {value} | {RANGE_DOT}"),
        ]
    }

    fn collect_partials(&mut self, tokens: &[Token<'_>]) {
        let words: Vec<&Token<'_>> = tokens.iter().filter(|t| t.kind != Kind::Space).collect();
        let names = words.windows(2).filter_map(|pair| match pair {
            [func, name] if func.is(Kind::Ident, PARTIAL_FUNC) && name.kind == Kind::Str => {
                unquote(name.text)
            }
            _ => None,
        });
        for name in names {
            if !self.partials.contains(&name) {
                self.partials.push(name);
            }
        }
    }
}

fn tokenize(body: &str) -> Vec<Token<'_>> {
    TOKEN
        .captures_iter(body)
        .filter_map(|caps| {
            KINDS.iter().find_map(|(kind, group)| {
                caps.name(group).map(|m| Token {
                    kind: *kind,
                    text: m.as_str(),
                })
            })
        })
        .collect()
}

fn trim_spaces<'t, 'a>(toks: &'t [Token<'a>]) -> &'t [Token<'a>] {
    let start = toks.iter().position(|t| t.kind != Kind::Space).unwrap_or(toks.len());
    let end = toks.iter().rposition(|t| t.kind != Kind::Space).map_or(start, |i| i + 1);
    &toks[start..end.max(start)]
}

/// A declaration (`$x := P`) or an action that prints its pipeline
fn statement(trimmed: &str, toks: &[Token<'_>]) -> String {
    if let Some((vars, op, rest)) = declaration(toks) {
        return format!("{} {op} {}", vars.join(", "), pipeline(rest, false));
    }
    let label = match toks {
        [only] if only.kind == Kind::Chain => chain_label(only.text),
        _ => trimmed.to_string(),
    };
    format!("{} | {EMIT} {}", pipeline(toks, false), quote(&label))
}

/// `template "name" P` and `block "name" P`
fn invocation(keyword: &str, toks: &[Token<'_>]) -> String {
    match toks.split_first() {
        Some((name, rest)) if name.kind == Kind::Str => {
            let rest = trim_spaces(rest);
            if rest.is_empty() {
                format!("{keyword} {}", name.text)
            } else {
                format!("{keyword} {} {}", name.text, pipeline(rest, false))
            }
        }
        _ => format!("{keyword} {}", join(toks)),
    }
}

type Declaration<'t, 'a> = (Vec<&'a str>, &'a str, &'t [Token<'a>]);

/// Leading `$a[, $b] :=` (or `=`): the variables, the operator and the rest
fn declaration<'t, 'a>(toks: &'t [Token<'a>]) -> Option<Declaration<'t, 'a>> {
    let words: Vec<(usize, &Token<'a>)> = toks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind != Kind::Space)
        .collect();
    let mut vars = Vec::new();
    let mut at = 0;
    loop {
        let (_, var) = words.get(at)?;
        if var.kind != Kind::Var {
            return None;
        }
        vars.push(var.text);
        let (index, next) = words.get(at + 1)?;
        match (next.kind, next.text) {
            (Kind::Punct, ":=" | "=") => {
                return Some((vars, next.text, trim_spaces(&toks[index + 1..])));
            }
            (Kind::Punct, ",") => at += 2,
            _ => return None,
        }
    }
}

fn pipeline(toks: &[Token<'_>], quiet: bool) -> String {
    let commands = split_commands(toks);
    let heads: Vec<Option<&str>> = commands.iter().map(|cmd| head(cmd)).collect();
    let is_quiet = |head: Option<&str>| head.is_some_and(|h| QUIET_FUNCS.contains(&h));
    let mut out = String::new();
    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        let feeds_quiet = heads.get(i + 1).copied().is_some_and(is_quiet);
        command(cmd, quiet || feeds_quiet || is_quiet(heads[i]), &mut out);
    }
    out
}

fn split_commands<'t, 'a>(toks: &'t [Token<'a>]) -> Vec<&'t [Token<'a>]> {
    let mut commands = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, t) in toks.iter().enumerate() {
        match (t.kind, t.text) {
            (Kind::Punct, "(") => depth += 1,
            (Kind::Punct, ")") => depth = depth.saturating_sub(1),
            (Kind::Punct, "|") if depth == 0 => {
                commands.push(&toks[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    commands.push(&toks[start..]);
    commands
}

fn head<'a>(cmd: &[Token<'a>]) -> Option<&'a str> {
    cmd.iter()
        .find(|t| t.kind != Kind::Space)
        .filter(|t| t.kind == Kind::Ident)
        .map(|t| t.text)
}

fn command(toks: &[Token<'_>], quiet: bool, out: &mut String) {
    let mut i = 0;
    while i < toks.len() {
        let token = toks[i];
        if token.is(Kind::Punct, "(") {
            if let Some(close) = matching_paren(toks, i) {
                out.push('(');
                out.push_str(&pipeline(&toks[i + 1..close], quiet));
                out.push(')');
                i = close + 1;
                continue;
            }
        }
        let after_paren = i > 0 && toks[i - 1].is(Kind::Punct, ")");
        if token.kind == Kind::Chain && !after_paren {
            out.push_str(&reference(token.text, quiet));
        } else {
            out.push_str(token.text);
        }
        i += 1;
    }
}

fn matching_paren(toks: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in toks.iter().enumerate().skip(open) {
        if t.is(Kind::Punct, "(") {
            depth += 1;
        } else if t.is(Kind::Punct, ")") {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split a chain into receiver (`.`, `$` or `$name`) and dotted path
fn split_chain(chain: &str) -> (&str, &str) {
    match chain.find('.') {
        Some(dot) if dot > 0 => (&chain[..dot], &chain[dot + 1..]),
        _ => (".", chain.trim_start_matches('.')),
    }
}

/// Name used in warnings: the path, prefixed by its variable unless it is `$`
fn chain_label(chain: &str) -> String {
    match split_chain(chain) {
        ("." | "$", path) => path.to_string(),
        (var, path) => format!("{var}.{path}"),
    }
}

fn reference(chain: &str, quiet: bool) -> String {
    let func = if quiet { PEEK } else { LOOKUP };
    let (receiver, path) = split_chain(chain);
    format!("({func} {receiver} \"{path}\" {})", quote(&chain_label(chain)))
}

fn join(toks: &[Token<'_>]) -> String {
    toks.iter().map(|t| t.text).collect()
}

/// Go string literal for `text`
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return Some(raw.to_string());
    }
    if literal.starts_with('"') {
        serde_json::from_str(literal).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> String {
        prepare(input).text
    }

    #[test]
    fn test_field_reference_prints_through_emit() {
        assert_eq!(
            text("a {{.linear.team}} b"),
            r#"a {{(lookup . "linear.team" "linear.team") | emit "linear.team"}} b"#
        );
    }

    #[test]
    fn test_trim_markers_survive() {
        assert_eq!(
            text("{{- .org -}}"),
            r#"{{- (lookup . "org" "org") | emit "org" -}}"#
        );
    }

    #[test]
    fn test_variable_references_are_labelled() {
        assert_eq!(
            text("{{$.org}}{{$x.name}}"),
            concat!(
                r#"{{(lookup $ "org" "org") | emit "org"}}"#,
                r#"{{(lookup $x "name" "$x.name") | emit "$x.name"}}"#
            )
        );
    }

    #[test]
    fn test_conditions_peek() {
        assert_eq!(
            text(r#"{{if eq .tier "gold"}}G{{else if .flag}}F{{end}}"#),
            r#"{{if eq (peek . "tier" "tier") "gold"}}G{{else if (peek . "flag" "flag")}}F{{end}}"#
        );
    }

    #[test]
    fn test_default_arguments_peek() {
        assert_eq!(
            text(r#"{{.board | default "Eng"}}"#),
            r#"{{(peek . "board" "board") | default "Eng" | emit ".board | default \"Eng\""}}"#
        );
        assert!(text(r#"{{default "x" .a}}"#).contains(r#"(peek . "a" "a")"#));
    }

    #[test]
    fn test_function_arguments_lookup() {
        let out = text("{{upper .missing}}");
        assert_eq!(out, r#"{{upper (lookup . "missing" "missing") | emit "upper .missing"}}"#);
    }

    #[test]
    fn test_parenthesized_pipelines_are_rewritten() {
        let out = text(r#"{{printf "%s" (.a | lower)}}"#);
        assert!(out.contains(r#"((lookup . "a" "a") | lower)"#), "{out}");
    }

    #[test]
    fn test_declarations_do_not_print() {
        assert_eq!(text("{{$x := .org}}"), r#"{{$x := (lookup . "org" "org")}}"#);
    }

    #[test]
    fn test_strings_are_left_alone() {
        let out = text(r#"{{print ".not.a.field"}}"#);
        assert!(out.starts_with(r#"{{print ".not.a.field" | emit"#), "{out}");
    }

    #[test]
    fn test_comments_and_define_untouched() {
        let input = r#"{{/* .x */}}{{define "greet"}}hi{{end}}"#;
        assert_eq!(text(input), input);
    }

    #[test]
    fn test_template_argument_is_rewritten() {
        assert_eq!(
            text(r#"{{template "greet" .name}}"#),
            r#"{{template "greet" (lookup . "name" "name")}}"#
        );
    }

    #[test]
    fn test_range_lowers_onto_sorted_keys() {
        let out = text("{{range $k, $v := .env}}{{$k}}{{end}}");
        let lowered = concat!(
            r#"{{$_r0 := (peek . "env" "env")}}{{$_k0 := $_r0 | rangeKeys}}{{if $_k0}}"#,
            r#"{{range $k := $_k0}}{{$v := rangeEntry $_r0 $k}}{{range $v | rangeDot}}"#,
        );
        assert!(out.starts_with(lowered), "{out}");
        assert!(out.ends_with("{{end}}{{end}}{{end}}"), "{out}");
    }

    #[test]
    fn test_range_else_closes_inner_loops() {
        let out = text("{{range .items}}x{{else}}none{{end}}");
        assert!(out.contains("x{{end}}{{end}}{{else}}none{{end}}"), "{out}");
    }

    #[test]
    fn test_nested_ranges_get_distinct_names() {
        let out = text("{{range .a}}{{range .b}}{{end}}{{end}}");
        assert!(out.contains("$_r0") && out.contains("$_r1"));
    }

    #[test]
    fn test_literal_partials_are_collected_once() {
        let prepared = prepare(r#"{{partial "header"}} {{partial `footer`}} {{partial "header"}}"#);
        assert_eq!(prepared.partials, vec!["header", "footer"]);
    }

    #[test]
    fn test_unclosed_action_is_left_for_the_parser() {
        assert_eq!(text("{{org"), "{{org");
    }
}
