//! Uniform lookup over the containers a report can be filled from.

use crate::error::SourceError;
use crate::value::{ObjectRef, Value};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Capability every data source offers to the placeholder resolver.
pub trait DataSource {
    /// Whether the (possibly dotted) member path resolves.
    fn has(&self, name: &str) -> bool;

    /// Value at the member path, `MissingMember` when [`DataSource::has`] is false.
    fn get(&self, name: &str) -> Result<Value, SourceError>;

    /// Top-level member names.
    fn members(&self) -> Vec<String>;

    /// The raw backing value.
    fn source(&self) -> Value;
}

/// A keyed mapping.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: BTreeMap<String, Value>,
}

impl MapSource {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    fn resolve(&self, name: &str) -> Option<Value> {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        let value = self.values.get(head)?;
        match rest {
            Some(rest) => value.lookup(rest),
            None => Some(value.clone()),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl DataSource for MapSource {
    fn has(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    fn get(&self, name: &str) -> Result<Value, SourceError> {
        self.resolve(name)
            .ok_or_else(|| SourceError::MissingMember(name.to_string()))
    }

    fn members(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn source(&self) -> Value {
        Value::Map(self.values.clone())
    }
}

/// An object with named properties and operations.
#[derive(Debug, Clone)]
pub struct ObjectSource {
    object: ObjectRef,
}

impl ObjectSource {
    pub fn new(object: ObjectRef) -> Self {
        Self { object }
    }
}

impl DataSource for ObjectSource {
    fn has(&self, name: &str) -> bool {
        Value::Object(self.object.clone()).lookup(name).is_some()
    }

    fn get(&self, name: &str) -> Result<Value, SourceError> {
        Value::Object(self.object.clone())
            .lookup(name)
            .ok_or_else(|| SourceError::MissingMember(name.to_string()))
    }

    fn members(&self) -> Vec<String> {
        self.object.0.property_names()
    }

    fn source(&self) -> Value {
        Value::Object(self.object.clone())
    }
}

/// A parsed JSON document.
#[derive(Debug, Clone)]
pub struct JsonSource {
    root: Value,
}

impl JsonSource {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_json(raw))
    }

    pub fn from_json(raw: serde_json::Value) -> Self {
        Self {
            root: Value::from(raw),
        }
    }
}

impl DataSource for JsonSource {
    fn has(&self, name: &str) -> bool {
        self.root.lookup(name).is_some()
    }

    fn get(&self, name: &str) -> Result<Value, SourceError> {
        self.root
            .lookup(name)
            .ok_or_else(|| SourceError::MissingMember(name.to_string()))
    }

    fn members(&self) -> Vec<String> {
        self.root.member_names()
    }

    fn source(&self) -> Value {
        self.root.clone()
    }
}

/// Stand-in when no data was supplied: knows nothing, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl DataSource for EmptySource {
    fn has(&self, _name: &str) -> bool {
        false
    }

    fn get(&self, _name: &str) -> Result<Value, SourceError> {
        Ok(Value::Null)
    }

    fn members(&self) -> Vec<String> {
        Vec::new()
    }

    fn source(&self) -> Value {
        Value::Null
    }
}

type Predicate = fn(&Value) -> bool;
type Constructor = fn(Value) -> Box<dyn DataSource>;

/// Ordered (predicate, constructor) table used by [`source_for`]. The first
/// matching predicate wins.
const FACTORIES: &[(Predicate, Constructor)] = &[
    (is_map, map_source),
    (is_object, object_source),
    (is_json_object_text, json_text_source),
    (Value::is_null, empty_source),
];

fn is_map(value: &Value) -> bool {
    matches!(value, Value::Map(_))
}

fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

fn is_json_object_text(value: &Value) -> bool {
    match value {
        Value::Text(text) => matches!(
            serde_json::from_str::<serde_json::Value>(text),
            Ok(serde_json::Value::Object(_))
        ),
        _ => false,
    }
}

fn map_source(value: Value) -> Box<dyn DataSource> {
    match value {
        Value::Map(values) => Box::new(MapSource::new(values)),
        _ => Box::new(EmptySource),
    }
}

fn object_source(value: Value) -> Box<dyn DataSource> {
    match value {
        Value::Object(object) => Box::new(ObjectSource::new(object)),
        _ => Box::new(EmptySource),
    }
}

fn json_text_source(value: Value) -> Box<dyn DataSource> {
    match value {
        Value::Text(text) => match JsonSource::parse(&text) {
            Ok(source) => Box::new(source),
            Err(_) => Box::new(EmptySource),
        },
        _ => Box::new(EmptySource),
    }
}

fn empty_source(_value: Value) -> Box<dyn DataSource> {
    Box::new(EmptySource)
}

/// Wraps a raw value in the data source that understands it.
pub fn source_for(value: Value) -> Box<dyn DataSource> {
    for (predicate, constructor) in FACTORIES {
        if predicate(&value) {
            return constructor(value);
        }
    }
    warn!(
        "No data source handles a {} value, using an empty source",
        value.kind_name()
    );
    Box::new(EmptySource)
}

/// Member name a scalar or list row is exposed under: `${row}`, `{{ row }}`.
pub const ROW_MEMBER: &str = "row";

/// Data source for one table or list row. Rows that no factory handles are
/// bound to [`ROW_MEMBER`] so placeholders can still reach them.
pub fn row_source(value: Value) -> Box<dyn DataSource> {
    if FACTORIES.iter().any(|(predicate, _)| predicate(&value)) {
        return source_for(value);
    }
    debug!("Binding {} row to '{}'", value.kind_name(), ROW_MEMBER);
    Box::new(MapSource::default().with(ROW_MEMBER, value))
}

/// Finds the first source in rank order that has `name`.
pub fn first_having<'a>(sources: &[&'a dyn DataSource], name: &str) -> Option<&'a dyn DataSource> {
    sources.iter().copied().find(|source| source.has(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_source() {
        let source = MapSource::default().with("name", "Solid Snake").with("score", 80);
        assert!(source.has("name"));
        assert!(!source.has("rank"));
        assert_eq!(source.get("score").unwrap(), Value::Int(80));
        assert_eq!(
            source.get("rank"),
            Err(SourceError::MissingMember("rank".into()))
        );
        assert_eq!(source.members(), vec!["name".to_string(), "score".to_string()]);
    }

    #[test]
    fn test_json_source_nested() {
        let source = JsonSource::parse(r#"{"invoice": {"no": "INV-1", "lines": []}}"#).unwrap();
        assert!(source.has("invoice.no"));
        assert!(source.has("invoice.lines.@is_empty"));
        assert_eq!(source.get("invoice.no").unwrap(), "INV-1".into());
        assert_eq!(source.members(), vec!["invoice".to_string()]);
    }

    #[test]
    fn test_empty_source_never_fails() {
        let source = EmptySource;
        assert!(!source.has("anything"));
        assert_eq!(source.get("anything").unwrap(), Value::Null);
    }

    #[test]
    fn test_source_for_picks_implementation() {
        let map = source_for(Value::from(json!({"a": 1})));
        assert!(map.has("a"));
        let text = source_for(Value::Text(r#"{"b": 2}"#.into()));
        assert!(text.has("b"));
        let scalar = source_for(Value::Int(5));
        assert!(scalar.members().is_empty());
    }

    #[test]
    fn test_row_source_binds_scalars() {
        let scalar = row_source(Value::from("a"));
        assert!(scalar.has(ROW_MEMBER));
        assert_eq!(scalar.get("row").unwrap(), "a".into());
        assert_eq!(scalar.members(), vec!["row".to_string()]);

        let map = row_source(Value::from(json!({"name": "emp1"})));
        assert!(map.has("name"));
        assert!(!map.has(ROW_MEMBER));
    }

    #[test]
    fn test_first_having_respects_rank() {
        let first = MapSource::default().with("name", "first");
        let second = MapSource::default().with("name", "second").with("extra", 1);
        let sources: Vec<&dyn DataSource> = vec![&first, &second];
        let found = first_having(&sources, "name").unwrap();
        assert_eq!(found.get("name").unwrap(), "first".into());
        let found = first_having(&sources, "extra").unwrap();
        assert_eq!(found.get("extra").unwrap(), Value::Int(1));
    }
}
