//! Nested locale dictionaries and the static/dynamic merge.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::database::ContentItem;
use crate::i18n::Locale;

/// Nested mapping from dotted key paths to localized values.
///
/// Leaves are strings, or arrays/objects parsed from JSON-looking values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dictionary(Map<String, Value>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON document. Returns `None` unless the root is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Build a dictionary from flat content rows for one locale.
    ///
    /// Later rows overwrite earlier ones on the same path.
    pub fn from_rows(rows: &[ContentItem], locale: Locale) -> Self {
        let mut dictionary = Self::new();
        for row in rows {
            dictionary.set(&row.content_key, parse_content_value(row.value(locale)));
        }
        dictionary
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a string leaf by dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Set a value at a dotted path, creating (or replacing non-object)
    /// intermediate nodes as needed.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.0;
        for segment in parents {
            let node = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            current = match node {
                Value::Object(map) => map,
                _ => return,
            };
        }
        current.insert((*last).to_string(), value);
    }

    /// All leaves as `(dotted path, value)`, in document order.
    ///
    /// Arrays are leaves; objects are descended into.
    pub fn leaves(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        collect_leaves(&self.0, "", &mut out);
        out
    }

    /// Schema leaves that are absent or empty in this dictionary.
    pub fn missing_leaves(&self, schema: &Dictionary) -> Vec<String> {
        schema
            .leaves()
            .into_iter()
            .filter(|(path, _)| self.get(path).is_none_or(is_empty_value))
            .map(|(path, _)| path)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn collect_leaves<'a>(map: &'a Map<String, Value>, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(child) => collect_leaves(child, &path, out),
            _ => out.push((path, value)),
        }
    }
}

/// Blank strings and nulls never count as resolved content.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Turn a stored string into a dictionary value.
///
/// Values wrapped in `[...]` or `{...}` are parsed as JSON; anything that
/// fails to parse stays a plain string.
pub fn parse_content_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    let looks_structured = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));

    if looks_structured && let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
        return parsed;
    }

    Value::String(raw.to_string())
}

/// Overlay dynamic content onto the static dictionary.
///
/// The static dictionary is the base and defines the schema. Each dynamic
/// leaf replaces the value at its path unless it is empty, or unless it
/// would replace a static subtree with a scalar or descend through a static
/// leaf. Dynamic paths outside the schema are added.
pub fn merge(static_dict: &Dictionary, dynamic: &Dictionary) -> Dictionary {
    let mut merged = static_dict.clone();

    for (path, value) in dynamic.leaves() {
        if is_empty_value(value) {
            continue;
        }
        if conflicts_with_schema(static_dict, &path) {
            warn!("Ignoring content key '{}': conflicts with dictionary schema", path);
            continue;
        }
        merged.set(&path, value.clone());
    }

    merged
}

fn conflicts_with_schema(schema: &Dictionary, path: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = &schema.0;

    for (index, segment) in segments.iter().enumerate() {
        let is_last = index + 1 == segments.len();
        match current.get(*segment) {
            None => return false,
            Some(Value::Object(_)) if is_last => return true,
            Some(Value::Object(child)) => current = child,
            Some(_) if is_last => return false,
            Some(_) => return true,
        }
    }

    false
}
