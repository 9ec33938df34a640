//! Variable context: a nested mapping whose leaves are scalar strings
//!
//! Every operation returns a new context; none mutates `self`.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

/// A node in the variable context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Map(Context),
}

impl Node {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            Node::Map(_) => None,
        }
    }
}

/// Resolved flux values used during rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entries: BTreeMap<String, Node>,
}

fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.entries.iter()
    }

    /// Look up a dotted path. `None` when any intermediate segment is missing or not a map.
    pub fn get_by_path(&self, path: &str) -> Option<&Node> {
        let segs = segments(path);
        let (last, parents) = segs.split_last()?;
        let mut current = self;
        for seg in parents {
            match current.entries.get(*seg)? {
                Node::Map(inner) => current = inner,
                Node::Scalar(_) => return None,
            }
        }
        current.entries.get(*last)
    }

    /// Scalar value at a dotted path
    pub fn get_scalar(&self, path: &str) -> Option<&str> {
        self.get_by_path(path).and_then(Node::as_scalar)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get_by_path(path).is_some()
    }

    /// Set a scalar at a dotted path, creating intermediate maps and replacing
    /// any scalar found at an intermediate segment.
    #[must_use]
    pub fn set_by_path(&self, path: &str, value: impl Into<String>) -> Context {
        let segs = segments(path);
        if segs.is_empty() {
            return self.clone();
        }
        let mut result = self.clone();
        result.insert_node(&segs, Node::Scalar(value.into()));
        result
    }

    fn insert_node(&mut self, segs: &[&str], node: Node) {
        let Some((first, rest)) = segs.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.entries.insert((*first).to_string(), node);
            return;
        }
        let child = self
            .entries
            .entry((*first).to_string())
            .or_insert_with(|| Node::Map(Context::new()));
        if let Node::Scalar(_) = child {
            *child = Node::Map(Context::new());
        }
        if let Node::Map(inner) = child {
            inner.insert_node(rest, node);
        }
    }

    /// Deep-merge `overlay` over `self`. Overlay scalars win; nested maps merge.
    #[must_use]
    pub fn apply_layer(&self, overlay: &Context) -> Context {
        let mut result = self.clone();
        for (key, over) in &overlay.entries {
            let merged = match (result.entries.get(key), over) {
                (Some(Node::Map(base)), Node::Map(over_map)) => {
                    Node::Map(base.apply_layer(over_map))
                }
                _ => over.clone(),
            };
            result.entries.insert(key.clone(), merged);
        }
        result
    }

    /// Build a context from a YAML mapping.
    ///
    /// Nested mappings become nested contexts, scalars keep their textual form,
    /// sequences collapse to a comma-joined scalar and nulls are skipped.
    pub fn from_yaml(value: &YamlValue) -> Context {
        let mut context = Context::new();
        let YamlValue::Mapping(mapping) = value else {
            return context;
        };
        for (key, value) in mapping {
            let Some(key) = yaml_scalar_text(key) else {
                continue;
            };
            let node = match value {
                YamlValue::Mapping(_) => Some(Node::Map(Context::from_yaml(value))),
                YamlValue::Tagged(tagged) => yaml_scalar_text(&tagged.value).map(Node::Scalar),
                other => yaml_scalar_text(other).map(Node::Scalar),
            };
            if let Some(node) = node {
                context.entries.insert(key, node);
            }
        }
        context
    }

    /// Plain JSON view of the context (all leaves are strings)
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .entries
            .iter()
            .map(|(key, node)| {
                let value = match node {
                    Node::Scalar(s) => JsonValue::String(s.clone()),
                    Node::Map(inner) => inner.to_json(),
                };
                (key.clone(), value)
            })
            .collect();
        JsonValue::Object(map)
    }
}

/// Textual form of a YAML scalar; sequences are joined with commas
pub fn yaml_scalar_text(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::Null | YamlValue::Mapping(_) => None,
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Sequence(items) => Some(
            items
                .iter()
                .filter_map(yaml_scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        YamlValue::Tagged(tagged) => yaml_scalar_text(&tagged.value),
    }
}
