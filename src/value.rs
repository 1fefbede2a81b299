use serde_json::Value;

use crate::dialect::Dialect;

/// A leaf operand of a comparison: either a literal payload or a
/// reference naming a field path to resolve against a record.
///
/// A raw string becomes a reference when it matches the dialect's
/// reference pattern at parse time; the stored path is the pattern's
/// captured inner content with the delimiters stripped. Everything else
/// is stored as a literal, unchanged.
///
/// References are resolved lazily: nothing is looked up until
/// [`get_value`](ItemValue::get_value) runs against a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    Literal(Value),
    Reference(String),
}

impl ItemValue {
    pub fn parse(raw: &Value, dialect: &Dialect) -> ItemValue {
        if let Value::String(text) = raw {
            if let Some(path) = dialect.match_reference(text) {
                return ItemValue::Reference(path);
            }
        }
        ItemValue::Literal(raw.clone())
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ItemValue::Reference(_))
    }

    /// Resolves against a record: a literal yields its payload, a
    /// reference performs a dialect-mediated field lookup (misses
    /// resolve to `Null`).
    pub fn get_value(&self, record: &Value, dialect: &Dialect) -> Value {
        match self {
            ItemValue::Literal(v) => v.clone(),
            ItemValue::Reference(path) => dialect.model_value(record, path),
        }
    }

    /// Canonical JSON form: a literal is its own JSON, a reference is
    /// its wrapped token so re-parsing keeps it a reference.
    pub fn to_json(&self, dialect: &Dialect) -> Value {
        match self {
            ItemValue::Literal(v) => v.clone(),
            ItemValue::Reference(path) => Value::String(dialect.wrap_reference(path)),
        }
    }
}
