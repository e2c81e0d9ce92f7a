use crate::error::EvalError;
use chrono::{DateTime, Utc};
use filter_model::Value;
use serde_json::Value as Json;
use std::collections::HashMap;

/// An in-memory set of named values that filters are evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Resolves a `/`-separated path. The first segment names a field, later
    /// segments descend into object values.
    pub fn resolve_path(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = self.get(segments.next()?)?;

        let mut current = match first {
            Value::Object(json) => json,
            other => {
                return if segments.next().is_none() {
                    Some(other.clone())
                } else {
                    None
                };
            }
        };
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(json_to_value(current))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Plain JSON to a literal. RFC 3339 strings become dates.
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Long(i),
            None => n.as_f64().map(Value::Double).unwrap_or(Value::Null),
        },
        Json::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(date) => Value::Date(date.with_timezone(&Utc)),
            Err(_) => Value::String(s.clone()),
        },
        other => Value::Object(other.clone()),
    }
}

impl TryFrom<Json> for Record {
    type Error = EvalError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        match json {
            Json::Object(map) => Ok(Self {
                fields: map
                    .iter()
                    .map(|(k, v)| (k.clone(), json_to_value(v)))
                    .collect(),
            }),
            other => Err(EvalError::InvalidRecord(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let record = Record::try_from(json!({
            "title": "FOO",
            "size": 3,
            "ratio": 0.5,
            "created": "2024-01-01T00:00:00Z",
            "meta": {"owner": {"name": "ann"}}
        }))
        .unwrap();
        assert_eq!(record.get("title"), Some(&Value::from("FOO")));
        assert_eq!(record.get("size"), Some(&Value::Long(3)));
        assert_eq!(record.get("ratio"), Some(&Value::Double(0.5)));
        assert!(matches!(record.get("created"), Some(Value::Date(_))));
        assert!(Record::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_resolve_path() {
        let record = Record::try_from(json!({
            "title": "FOO",
            "meta": {"owner": {"name": "ann"}}
        }))
        .unwrap();
        assert_eq!(record.resolve_path("/title"), Some(Value::from("FOO")));
        assert_eq!(
            record.resolve_path("/meta/owner/name"),
            Some(Value::from("ann"))
        );
        assert_eq!(record.resolve_path("/meta/missing"), None);
        assert_eq!(record.resolve_path("/title/deeper"), None);
    }
}
