use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of a CBS table: field name to scalar value, in response order.
pub type Record = IndexMap<String, Value>;

/// A scalar field value.
///
/// Table schemas are only known once a response arrives, so every field is
/// carried as one of these variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.pad(""),
            Value::Bool(b) => fmt::Display::fmt(b, f),
            Value::Integer(i) => fmt::Display::fmt(i, f),
            Value::Float(x) => fmt::Display::fmt(x, f),
            Value::String(s) => f.pad(s),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                // u64 beyond i64::MAX and real numbers
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            // v3 feeds are flat; keep anything nested as its JSON text
            other => Value::String(other.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

pub(crate) fn record_from_json(fields: IndexMap<String, serde_json::Value>) -> Record {
    fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_json_scalars() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!(true)), Value::Bool(true));
        assert_eq!(Value::from(json!(42)), Value::Integer(42));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from(json!("2019JJ00")), Value::from("2019JJ00"));
    }

    #[test]
    fn nested_json_is_kept_as_text() {
        assert_eq!(Value::from(json!([1, 2])), Value::from("[1,2]"));
    }

    #[test]
    fn record_keeps_field_order() {
        let fields: IndexMap<String, serde_json::Value> =
            serde_json::from_str(r#"{"ID":0,"Periods":"2019JJ00","Amount":3.25}"#).unwrap();
        let record = record_from_json(fields);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["ID", "Periods", "Amount"]);
        assert_eq!(record["Amount"].as_f64(), Some(3.25));
    }

    #[test]
    fn display_honours_width() {
        assert_eq!(format!("{:<6}|", Value::from("2019")), "2019  |");
        assert_eq!(format!("{:>4}|", Value::Integer(7)), "   7|");
        assert_eq!(format!("{}", Value::Null), "");
    }

    #[test]
    fn serializes_back_to_plain_json() {
        let mut record = Record::new();
        record.insert("ID".into(), Value::Integer(1));
        record.insert("Title".into(), Value::from("Bevolking"));
        record.insert("Value".into(), Value::Null);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"ID":1,"Title":"Bevolking","Value":null}"#
        );
    }
}
