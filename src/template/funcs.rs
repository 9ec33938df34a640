//! Template functions registered on top of gtmpl's builtins
//!
//! String helpers take the subject last so they read naturally at the end of a
//! pipeline: `{{.org | replace "-" "_"}}`, `{{split "," .labels}}`.
//!
//! `and`, `or`, `not`, `call` and `urlquery` are gtmpl's own. The rest either
//! replace a builtin (comparison across number representations, `print`
//! spacing) or are added here, including the helpers the preparation pass
//! emits.

use std::cmp::Ordering;

use gtmpl_value::{Func, FuncError, Value};

use super::frame;
use super::prepare::{EMIT, LOOKUP, PEEK, RANGE_DOT, RANGE_ENTRY, RANGE_KEYS};
use super::shorthand::PARTIAL_FUNC;
use super::value::{compare_numbers, is_missing, resolve_path, to_text, truthy, type_name};

type FuncResult = Result<Value, FuncError>;

pub static FUNCS: &[(&str, Func)] = &[
    ("eq", eq as Func),
    ("ne", ne as Func),
    ("lt", lt as Func),
    ("le", le as Func),
    ("gt", gt as Func),
    ("ge", ge as Func),
    ("len", len as Func),
    ("index", index as Func),
    ("print", print as Func),
    ("println", println as Func),
    ("printf", printf as Func),
    ("default", default as Func),
    ("upper", upper as Func),
    ("lower", lower as Func),
    ("trim", trim as Func),
    ("join", join as Func),
    ("split", split as Func),
    ("contains", contains as Func),
    ("hasPrefix", has_prefix as Func),
    ("hasSuffix", has_suffix as Func),
    ("replace", replace as Func),
    (PARTIAL_FUNC, partial as Func),
    (LOOKUP, lookup as Func),
    (PEEK, peek as Func),
    (EMIT, emit as Func),
    (RANGE_KEYS, range_keys as Func),
    (RANGE_ENTRY, range_entry as Func),
    (RANGE_DOT, range_dot as Func),
];

fn generic(message: impl Into<String>) -> FuncError {
    FuncError::Generic(message.into())
}

fn arity(name: &str, args: &[Value], want: usize) -> Result<(), FuncError> {
    if args.len() == want {
        Ok(())
    } else {
        Err(generic(format!(
            "wrong number of args for {name}: want {want} got {}",
            args.len()
        )))
    }
}

fn eq(args: &[Value]) -> FuncResult {
    let Some((first, rest)) = args.split_first().filter(|(_, rest)| !rest.is_empty()) else {
        return Err(generic("eq requires at least two arguments"));
    };
    Ok(Value::Bool(rest.iter().any(|other| equal(first, other))))
}

fn ne(args: &[Value]) -> FuncResult {
    arity("ne", args, 2)?;
    Ok(Value::Bool(!equal(&args[0], &args[1])))
}

fn lt(args: &[Value]) -> FuncResult {
    ordered("lt", args, |ord| ord == Ordering::Less)
}

fn le(args: &[Value]) -> FuncResult {
    ordered("le", args, |ord| ord != Ordering::Greater)
}

fn gt(args: &[Value]) -> FuncResult {
    ordered("gt", args, |ord| ord == Ordering::Greater)
}

fn ge(args: &[Value]) -> FuncResult {
    ordered("ge", args, |ord| ord != Ordering::Less)
}

fn ordered(name: &str, args: &[Value], test: fn(Ordering) -> bool) -> FuncResult {
    arity(name, args, 2)?;
    compare(&args[0], &args[1]).map(|ord| Value::Bool(test(ord)))
}

fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        (x, y) if is_missing(x) || is_missing(y) => is_missing(x) && is_missing(y),
        (x, y) => x == y,
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, FuncError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            compare_numbers(x, y).ok_or_else(|| generic("invalid number for comparison"))
        }
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(generic(format!(
            "incompatible types for comparison: {} and {}",
            type_name(a),
            type_name(b)
        ))),
    }
}

fn len(args: &[Value]) -> FuncResult {
    arity("len", args, 1)?;
    let n = match &args[0] {
        Value::NoValue | Value::Nil => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Map(map) | Value::Object(map) => map.len(),
        other => return Err(generic(format!("len of type {}", type_name(other)))),
    };
    Ok(Value::from(n))
}

fn index(args: &[Value]) -> FuncResult {
    let Some((base, keys)) = args.split_first() else {
        return Err(generic("index requires at least one argument"));
    };
    let mut current = base.clone();
    for key in keys {
        current = match (&current, key) {
            (Value::NoValue | Value::Nil, _) => Value::NoValue,
            (Value::Array(items), Value::Number(n)) => {
                let i = n
                    .as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or_else(|| generic(format!("invalid index {n}")))?;
                items
                    .get(i)
                    .cloned()
                    .ok_or_else(|| generic(format!("index out of range: {i}")))?
            }
            (Value::Map(map) | Value::Object(map), Value::String(k)) => {
                map.get(k).cloned().unwrap_or(Value::NoValue)
            }
            (other, _) => {
                return Err(generic(format!(
                    "can't index item of type {}",
                    type_name(other)
                )));
            }
        };
    }
    Ok(current)
}

/// Operands are separated by a space when neither side is a string
fn print(args: &[Value]) -> FuncResult {
    let is_string = |v: &Value| matches!(v, Value::String(_));
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !is_string(&args[i - 1]) && !is_string(arg) {
            out.push(' ');
        }
        out.push_str(&to_text(arg));
    }
    Ok(Value::String(out))
}

fn println(args: &[Value]) -> FuncResult {
    let parts: Vec<String> = args.iter().map(to_text).collect();
    Ok(Value::String(format!("{}\n", parts.join(" "))))
}

fn printf(args: &[Value]) -> FuncResult {
    let Some((format, rest)) = args.split_first() else {
        return Err(generic("printf requires a format string"));
    };
    Ok(Value::String(sprintf(&to_text(format), rest)))
}

fn format_verb(verb: char, arg: &Value) -> String {
    match verb {
        'd' => match arg {
            Value::Number(n) if n.as_i64().is_some() => n.to_string(),
            other => match to_text(other).trim().parse::<i64>() {
                Ok(n) => n.to_string(),
                Err(_) => format!("%!d({})", to_text(other)),
            },
        },
        'q' => format!("{:?}", to_text(arg)),
        _ => to_text(arg),
    }
}

/// `printf` supporting `%s %d %v %q %t %%`
fn sprintf(format: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'd' | 'v' | 'q' | 't')) => match args.next() {
                Some(arg) => out.push_str(&format_verb(verb, arg)),
                None => out.push_str(&format!("%!{verb}(MISSING)")),
            },
            Some(other) => out.push_str(&format!("%!{other}(BADVERB)")),
            None => out.push_str("%!(NOVERB)"),
        }
    }
    let extra: Vec<String> = args.map(to_text).collect();
    if !extra.is_empty() {
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }
    out
}

fn default(args: &[Value]) -> FuncResult {
    match args {
        [fallback] => Ok(fallback.clone()),
        [fallback, given] => Ok(if truthy(given) {
            given.clone()
        } else {
            fallback.clone()
        }),
        _ => Err(generic(format!(
            "wrong number of args for default: want 1 or 2 got {}",
            args.len()
        ))),
    }
}

fn unary(name: &str, args: &[Value], f: impl Fn(&str) -> String) -> FuncResult {
    arity(name, args, 1)?;
    Ok(Value::String(f(&to_text(&args[0]))))
}

fn upper(args: &[Value]) -> FuncResult {
    unary("upper", args, str::to_uppercase)
}

fn lower(args: &[Value]) -> FuncResult {
    unary("lower", args, str::to_lowercase)
}

fn trim(args: &[Value]) -> FuncResult {
    unary("trim", args, |s| s.trim().to_string())
}

fn join(args: &[Value]) -> FuncResult {
    arity("join", args, 2)?;
    let sep = to_text(&args[0]);
    Ok(Value::String(match &args[1] {
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(&sep),
        other => to_text(other),
    }))
}

fn split(args: &[Value]) -> FuncResult {
    arity("split", args, 2)?;
    let sep = to_text(&args[0]);
    let subject = to_text(&args[1]);
    let parts: Vec<Value> = if sep.is_empty() {
        subject.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        subject.split(sep.as_str()).map(Value::from).collect()
    };
    Ok(Value::Array(parts))
}

fn contains(args: &[Value]) -> FuncResult {
    arity("contains", args, 2)?;
    let needle = to_text(&args[0]);
    Ok(Value::Bool(match &args[1] {
        Value::Array(items) => items.iter().any(|item| to_text(item) == needle),
        other => to_text(other).contains(needle.as_str()),
    }))
}

fn has_prefix(args: &[Value]) -> FuncResult {
    arity("hasPrefix", args, 2)?;
    Ok(Value::Bool(to_text(&args[1]).starts_with(to_text(&args[0]).as_str())))
}

fn has_suffix(args: &[Value]) -> FuncResult {
    arity("hasSuffix", args, 2)?;
    Ok(Value::Bool(to_text(&args[1]).ends_with(to_text(&args[0]).as_str())))
}

fn replace(args: &[Value]) -> FuncResult {
    arity("replace", args, 3)?;
    let from = to_text(&args[0]);
    let to = to_text(&args[1]);
    Ok(Value::String(to_text(&args[2]).replace(from.as_str(), &to)))
}

fn partial(args: &[Value]) -> FuncResult {
    arity(PARTIAL_FUNC, args, 1)?;
    let Value::String(name) = &args[0] else {
        return Err(generic("partial name must be a string"));
    };
    frame::with_current(|frame| frame.expand_partial(name))
        .unwrap_or_else(|| Err(generic(format!("partial \"{name}\" used outside a render"))))
}

/// `lookup RECEIVER "path" "label"`: the value at `path`, or a warning
fn lookup(args: &[Value]) -> FuncResult {
    resolve(args, true)
}

/// `peek RECEIVER "path" "label"`: the value at `path`, missing is silent
fn peek(args: &[Value]) -> FuncResult {
    resolve(args, false)
}

fn resolve(args: &[Value], warn: bool) -> FuncResult {
    let [base, Value::String(path), Value::String(label)] = args else {
        return Err(generic("malformed field reference"));
    };
    match resolve_path(base, path) {
        Some(found) => Ok(found.clone()),
        None => {
            if warn {
                frame::with_current(|frame| frame.unresolved(label));
            }
            Ok(Value::NoValue)
        }
    }
}

/// Final stage of every printing action: `P | emit "label"`
fn emit(args: &[Value]) -> FuncResult {
    let [label, value] = args else {
        return Err(generic("malformed print"));
    };
    let text = match value {
        Value::NoValue => frame::with_current(|frame| frame.placeholder())
            .unwrap_or_default()
            .to_string(),
        Value::Map(_) | Value::Object(_) => frame::with_current(|frame| {
            frame.unresolved(&to_text(label));
            frame.placeholder().to_string()
        })
        .unwrap_or_default(),
        other => to_text(other),
    };
    Ok(Value::String(text))
}

/// Keys to iterate: indices of a list, sorted keys of a map, `0..n` of a count
fn range_keys(args: &[Value]) -> FuncResult {
    arity(RANGE_KEYS, args, 1)?;
    let keys: Vec<Value> = match &args[0] {
        Value::NoValue | Value::Nil => Vec::new(),
        Value::Array(items) => (0..items.len()).map(Value::from).collect(),
        Value::Map(map) | Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter().map(Value::from).collect()
        }
        Value::Number(n) => {
            let count = n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| generic(format!("range can't iterate over {n}")))?;
            (0..count).map(Value::from).collect()
        }
        other => {
            return Err(generic(format!(
                "range can't iterate over {}",
                to_text(other)
            )));
        }
    };
    Ok(Value::Array(keys))
}

fn range_entry(args: &[Value]) -> FuncResult {
    let [collection, key] = args else {
        return Err(generic(format!("wrong number of args for {RANGE_ENTRY}")));
    };
    Ok(match (collection, key) {
        (Value::Array(items), Value::Number(n)) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::NoValue),
        (Value::Map(map) | Value::Object(map), Value::String(k)) => {
            map.get(k).cloned().unwrap_or(Value::NoValue)
        }
        _ => key.clone(),
    })
}

fn range_dot(args: &[Value]) -> FuncResult {
    arity(RANGE_DOT, args, 1)?;
    Ok(Value::Array(vec![args[0].clone()]))
}
