use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// An object exposing named properties and zero-argument operations.
///
/// There is no reflection to walk arbitrary structs, so callers that want to
/// fill a report from their own types implement this adapter.
pub trait PropertyBag: Send + Sync {
    /// Reads a property, `None` when the object has no such property.
    fn property(&self, name: &str) -> Option<Value>;

    /// Invokes a zero-argument operation (`@name` in a member path).
    fn invoke(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Names of every readable property.
    fn property_names(&self) -> Vec<String>;
}

/// Shared handle to a [`PropertyBag`].
#[derive(Clone)]
pub struct ObjectRef(pub Arc<dyn PropertyBag>);

impl ObjectRef {
    pub fn new<T: PropertyBag + 'static>(object: T) -> Self {
        Self(Arc::new(object))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("properties", &self.0.property_names())
            .finish()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDateTime),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    /// Reads one member of this value: map key, object property, or list
    /// projection. A leading `@` invokes an operation instead.
    pub fn member(&self, segment: &str) -> Option<Value> {
        if let Some(operation) = segment.strip_prefix('@') {
            return self.invoke(operation);
        }
        match self {
            Value::Map(map) => map.get(segment).cloned(),
            Value::Object(object) => object.0.property(segment),
            Value::List(items) => items
                .iter()
                .map(|item| item.member(segment))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            _ => None,
        }
    }

    /// Descends a dotted member path.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.member(first)?;
        for segment in segments {
            current = current.member(segment)?;
        }
        Some(current)
    }

    fn invoke(&self, operation: &str) -> Option<Value> {
        if let Value::Object(object) = self {
            return object.0.invoke(operation);
        }
        match (operation, self) {
            ("len", Value::List(items)) => Some(Value::Int(items.len() as i64)),
            ("len", Value::Map(map)) => Some(Value::Int(map.len() as i64)),
            ("len", Value::Text(text)) => Some(Value::Int(text.chars().count() as i64)),
            ("is_empty", Value::List(items)) => Some(Value::Bool(items.is_empty())),
            ("is_empty", Value::Map(map)) => Some(Value::Bool(map.is_empty())),
            ("is_empty", Value::Text(text)) => Some(Value::Bool(text.is_empty())),
            ("upper", Value::Text(text)) => Some(Value::Text(text.to_uppercase())),
            ("lower", Value::Text(text)) => Some(Value::Text(text.to_lowercase())),
            ("trim", Value::Text(text)) => Some(Value::Text(text.trim().to_string())),
            ("first", Value::List(items)) => items.first().cloned(),
            ("last", Value::List(items)) => items.last().cloned(),
            ("keys", Value::Map(map)) => Some(Value::List(
                map.keys().cloned().map(Value::Text).collect(),
            )),
            _ => None,
        }
    }

    /// Names reachable with [`Value::member`] without invoking anything.
    pub fn member_names(&self) -> Vec<String> {
        match self {
            Value::Map(map) => map.keys().cloned().collect(),
            Value::Object(object) => object.0.property_names(),
            _ => Vec::new(),
        }
    }

    /// Text coercion applied before width padding.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(text) => text.clone(),
            Value::Date(date) => {
                if date.time() == NaiveTime::MIN {
                    date.format("%Y-%m-%d").to_string()
                } else {
                    date.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_text).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_text()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Object(object) => {
                let parts: Vec<String> = object
                    .0
                    .property_names()
                    .into_iter()
                    .map(|name| {
                        let value = object.0.property(&name).unwrap_or_default();
                        format!("{}: {}", name, value.to_text())
                    })
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Date(_) => serializer.serialize_str(&self.to_text()),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Object(object) => {
                let names = object.0.property_names();
                let mut out = serializer.serialize_map(Some(names.len()))?;
                for name in names {
                    let value = object.0.property(&name).unwrap_or_default();
                    out.serialize_entry(&name, &value)?;
                }
                out.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Date(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(value: BTreeMap<String, T>) -> Self {
        Value::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(value: HashMap<String, T>) -> Self {
        Value::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Employee;

    impl PropertyBag for Employee {
        fn property(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some("emp1".into()),
                "rate" => Some(10.0.into()),
                _ => None,
            }
        }

        fn invoke(&self, name: &str) -> Option<Value> {
            (name == "describe").then(|| "emp1 @ 10".into())
        }

        fn property_names(&self) -> Vec<String> {
            vec!["name".into(), "rate".into()]
        }
    }

    #[test]
    fn test_lookup_dotted_path() {
        let value = Value::from(json!({"customer": {"address": {"city": "Osaka"}}}));
        assert_eq!(value.lookup("customer.address.city"), Some("Osaka".into()));
        assert_eq!(value.lookup("customer.phone"), None);
    }

    #[test]
    fn test_lookup_invokes_operations() {
        let value = Value::from(json!({"items": [1, 2, 3], "code": " ab "}));
        assert_eq!(value.lookup("items.@len"), Some(Value::Int(3)));
        assert_eq!(value.lookup("code.@trim.@upper"), Some("AB".into()));
        assert_eq!(value.lookup("code.@explode"), None);
    }

    #[test]
    fn test_lookup_projects_lists() {
        let value = Value::from(json!({"lines": [{"amount": 5}, {"amount": 7}]}));
        assert_eq!(
            value.lookup("lines.amount"),
            Some(Value::List(vec![Value::Int(5), Value::Int(7)]))
        );
    }

    #[test]
    fn test_object_properties_and_invocation() {
        let value = Value::Object(ObjectRef::new(Employee));
        assert_eq!(value.lookup("name"), Some("emp1".into()));
        assert_eq!(value.lookup("@describe"), Some("emp1 @ 10".into()));
        assert_eq!(value.to_text(), "{name: emp1, rate: 10}");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Float(2.5).to_text(), "2.5");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::from(date).to_text(), "2024-03-09");
        assert_eq!(Value::from(vec![1, 2]).to_text(), "[1, 2]");
    }

    #[test]
    fn test_serialize_object_as_map() {
        let value = Value::List(vec![Value::Object(ObjectRef::new(Employee))]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!([{"name": "emp1", "rate": 10.0}]));
    }
}
