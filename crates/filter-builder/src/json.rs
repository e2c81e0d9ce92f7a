//! JSON-tree target.
//!
//! Terminals become `{"type": TAG, "property": .., "value": ..}` objects and
//! logical nodes `{"type": "AND", "filters": [..]}`. Operands are tagged so a
//! property can be told apart from a string literal.

use crate::{
    error::BuildError,
    target::{Reducer, Terminal, TreeTarget},
};
use filter_model::{OperatorTag, Value};
use serde_json::{Map, Value as Json, json};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTarget;

/// Plain JSON form of a literal.
pub fn literal_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(v) => json!(v),
        Value::Short(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::Long(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::String(v) => json!(v),
        Value::Bytes(v) => json!(v.iter().map(|b| format!("{b:02x}")).collect::<String>()),
        Value::Date(v) => json!(v.to_rfc3339()),
        Value::DateRange(v) => json!({
            "start": v.start().to_rfc3339(),
            "end": v.end().to_rfc3339(),
        }),
        Value::Object(v) => v.clone(),
    }
}

impl TreeTarget for JsonTarget {
    type Node = Json;
    type Operand = Json;

    fn name(&self) -> &str {
        "JsonTarget"
    }

    fn property(&self, name: &str) -> Result<Json, BuildError> {
        Ok(json!({"type": "PROPERTY", "name": name}))
    }

    fn literal(&self, value: &Value) -> Result<Json, BuildError> {
        Ok(json!({"type": "LITERAL", "value": literal_json(value)}))
    }

    fn function(&self, name: &str, args: Vec<Json>) -> Result<Json, BuildError> {
        Ok(json!({"type": "FUNCTION", "name": name, "args": args}))
    }

    fn terminal(&self, terminal: Terminal<Json>) -> Result<Json, BuildError> {
        let Terminal {
            tag,
            match_case,
            property,
            values,
            distance,
        } = terminal;

        let mut node = Map::new();
        node.insert("type".to_string(), json!(tag.as_str()));
        node.insert("property".to_string(), property);

        let mut values = values.into_iter();
        match tag {
            OperatorTag::IsBetween => {
                node.insert("lower".to_string(), values.next().unwrap_or(Json::Null));
                node.insert("upper".to_string(), values.next().unwrap_or(Json::Null));
            }
            _ => {
                if let Some(value) = values.next() {
                    node.insert("value".to_string(), value);
                }
            }
        }

        if matches!(
            tag,
            OperatorTag::IsEqualTo
                | OperatorTag::IsNotEqualTo
                | OperatorTag::IsLike
                | OperatorTag::XPathIsLike
        ) {
            node.insert("matchCase".to_string(), json!(match_case));
        }

        if let Some(distance) = distance {
            node.insert("distance".to_string(), json!(distance.value));
            node.insert("units".to_string(), json!(distance.units.symbol()));
        }

        Ok(Json::Object(node))
    }

    fn logical_reducer(&self, tag: OperatorTag) -> Result<Reducer<Json>, BuildError> {
        match tag {
            OperatorTag::Not => Ok(Box::new(|mut children: Vec<Json>| {
                json!({"type": "NOT", "filter": children.pop().unwrap_or(Json::Null)})
            })),
            OperatorTag::And | OperatorTag::Or => Ok(Box::new(move |children: Vec<Json>| {
                json!({"type": tag.as_str(), "filters": children})
            })),
            other => Err(self.unsupported(other)),
        }
    }
}
