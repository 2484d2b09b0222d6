//! Typed values read from filter strings and entity documents.

use crate::schema::FieldType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::cmp::Ordering;
use std::fmt;

use super::coerce::{parse_date, parse_datetime};

/// A value whose variant matches a field's declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    /// Canonical symbol plus its declaration index
    Enum { symbol: String, ordinal: usize },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Read a typed value out of a document node, guided by the declared type.
    ///
    /// Returns `None` when the node cannot be read as that type; a JSON null
    /// always reads as [`Value::Null`].
    pub fn from_json(node: &Json, ty: &FieldType) -> Option<Value> {
        if node.is_null() {
            return Some(Value::Null);
        }

        match ty {
            FieldType::String => node.as_str().map(|s| Value::String(s.to_string())),
            FieldType::Int => node.as_i64().map(Value::Int),
            FieldType::Float => node.as_f64().map(Value::Float),
            FieldType::Bool => node.as_bool().map(Value::Bool),
            FieldType::DateTime => node.as_str().and_then(parse_datetime).map(Value::DateTime),
            FieldType::Date => node.as_str().and_then(parse_date).map(Value::Date),
            FieldType::Enum(enum_type) => {
                let ordinal = match node {
                    Json::String(symbol) => enum_type.lookup(symbol),
                    Json::Number(n) => n
                        .as_u64()
                        .map(|n| n as usize)
                        .filter(|n| *n < enum_type.variants.len()),
                    _ => None,
                }?;
                Some(Value::Enum {
                    symbol: enum_type.variants[ordinal].clone(),
                    ordinal,
                })
            }
            FieldType::Nullable(inner) => Value::from_json(node, inner),
            FieldType::List(_) | FieldType::Object(_) => None,
        }
    }

    /// Compare two values of the same kind; null and mixed kinds are unordered
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Enum { ordinal: a, .. }, Value::Enum { ordinal: b, .. }) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn equals(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Total order used for sorting: missing and null first, then by value
    pub fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let a = a.filter(|v| !v.is_null());
        let b = b.filter(|v| !v.is_null());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(Value::Float(x)), Some(Value::Float(y))) => x.total_cmp(y),
            (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Date(d) => write!(f, "{}", d),
            Value::Enum { symbol, .. } => write!(f, "{}", symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnumType;
    use serde_json::json;

    #[test]
    fn test_read_enum_by_symbol_or_ordinal() {
        let ty = FieldType::Enum(EnumType::new("Status", ["Active", "Retired"]));
        let expected = Some(Value::Enum {
            symbol: "Retired".to_string(),
            ordinal: 1,
        });
        assert_eq!(Value::from_json(&json!("retired"), &ty), expected);
        assert_eq!(Value::from_json(&json!(1), &ty), expected);
        assert_eq!(Value::from_json(&json!(7), &ty), None);
    }

    #[test]
    fn test_read_mismatched_kind_is_none() {
        assert_eq!(Value::from_json(&json!("12"), &FieldType::Int), None);
        assert_eq!(Value::from_json(&json!(1.5), &FieldType::Int), None);
        assert_eq!(
            Value::from_json(&json!(3), &FieldType::Float),
            Some(Value::Float(3.0))
        );
    }

    #[test]
    fn test_null_reads_as_null() {
        let ty = FieldType::nullable(FieldType::Int);
        assert_eq!(Value::from_json(&json!(null), &ty), Some(Value::Null));
        assert!(!Value::Null.equals(&Value::Null));
    }

    #[test]
    fn test_sort_cmp_puts_missing_first() {
        let one = Value::Int(1);
        assert_eq!(Value::sort_cmp(None, Some(&one)), Ordering::Less);
        assert_eq!(Value::sort_cmp(Some(&Value::Null), Some(&one)), Ordering::Less);
        assert_eq!(Value::sort_cmp(Some(&one), Some(&Value::Int(0))), Ordering::Greater);
    }
}
