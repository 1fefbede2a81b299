use std::fmt;

use serde_json::Value;

use crate::ParseOptions;
use crate::dialect::Dialect;
use crate::operator::Operator;
use crate::value::ItemValue;

/// One comparison: `left <operator> right`, each side an [`ItemValue`].
///
/// The operator is resolved from the dialect registry at construction,
/// so a constructed item always carries exactly one operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    left: ItemValue,
    right: ItemValue,
    operator: Operator,
}

/// Errors raised by direct [`Item`] construction. Lenient parsing via
/// [`Item::parse`] swallows these and yields nothing instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    UnknownOperator(String),
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::UnknownOperator(id) => write!(f, "Unknown operator: '{}'", id),
        }
    }
}

impl std::error::Error for ItemError {}

/// The closed set of raw shapes recognized as a single comparison.
enum ItemShape<'a> {
    /// `[left, right, op]`, or a pair with an embedded operator.
    Triple {
        left: &'a Value,
        right: &'a Value,
        operator: &'a str,
    },
    /// `[left, right]` — the operator defaults to `equal`.
    Pair {
        left: &'a Value,
        right: &'a Value,
    },
}

/// `[value, op]`: an array of exactly two elements whose second element
/// is a known operator id.
fn embedded_operator<'a>(raw: &'a Value, dialect: &Dialect) -> Option<(&'a Value, &'a str)> {
    let parts = raw.as_array()?;
    if let [value, Value::String(id)] = parts.as_slice() {
        if dialect.is_operator(id) {
            return Some((value, id));
        }
    }
    None
}

/// `{op: value}`: a single-key object keyed by a known operator id, the
/// `{age: {"greater": 18}}` shorthand.
fn operator_object<'a>(raw: &'a Value, dialect: &Dialect) -> Option<(&'a Value, &'a str)> {
    let map = raw.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    if dialect.is_operator(key) {
        Some((value, key))
    } else {
        None
    }
}

/// Simple scalar: anything but an array or an object.
fn is_simple(v: &Value) -> bool {
    !matches!(v, Value::Array(_) | Value::Object(_))
}

fn recognize<'a>(raw: &'a Value, dialect: &Dialect) -> Option<ItemShape<'a>> {
    let parts = raw.as_array()?;
    match parts.as_slice() {
        [left, right, op] => {
            // A null third element means "operator omitted"; an unknown
            // string fails the shape.
            let operator = match op {
                Value::String(id) if dialect.is_operator(id) => Some(id.as_str()),
                Value::Null => None,
                _ => return None,
            };
            if let Some((value, embedded)) = embedded_operator(right, dialect) {
                return Some(ItemShape::Triple {
                    left,
                    right: value,
                    operator: embedded,
                });
            }
            match operator {
                Some(id) => Some(ItemShape::Triple {
                    left,
                    right,
                    operator: id,
                }),
                None => Some(ItemShape::Pair { left, right }),
            }
        }
        [left, right] => {
            if let Some((value, operator)) = embedded_operator(right, dialect) {
                Some(ItemShape::Triple {
                    left,
                    right: value,
                    operator,
                })
            } else if let Some((value, operator)) = operator_object(right, dialect) {
                Some(ItemShape::Triple {
                    left,
                    right: value,
                    operator,
                })
            } else {
                Some(ItemShape::Pair { left, right })
            }
        }
        _ => None,
    }
}

impl Item {
    /// Direct construction; an unknown operator id is an error.
    pub fn new(
        left: &Value,
        right: &Value,
        operator: &str,
        dialect: &Dialect,
    ) -> Result<Item, ItemError> {
        let operator = dialect
            .get_operator(operator)
            .cloned()
            .ok_or_else(|| ItemError::UnknownOperator(operator.to_string()))?;
        Ok(Item {
            left: ItemValue::parse(left, dialect),
            right: ItemValue::parse(right, dialect),
            operator,
        })
    }

    /// Lenient shape recognition: any mismatch yields `None`, never an
    /// error. A null left side or two compound sides are not an item.
    pub fn parse(raw: &Value, options: &ParseOptions) -> Option<Item> {
        let dialect = &options.dialect;
        let (left, right, operator) = match recognize(raw, dialect)? {
            ItemShape::Triple {
                left,
                right,
                operator,
            } => (left, right, operator),
            ItemShape::Pair { left, right } => (left, right, "equal"),
        };
        if left.is_null() {
            return None;
        }
        if !is_simple(left) && !is_simple(right) {
            return None;
        }
        Item::new(left, right, operator, dialect).ok()
    }

    pub fn left(&self) -> &ItemValue {
        &self.left
    }

    pub fn right(&self) -> &ItemValue {
        &self.right
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Resolves both sides against the record and applies the operator.
    /// Never fails: reference misses resolve to `Null`.
    pub fn filter(&self, record: &Value, dialect: &Dialect) -> bool {
        let left = self.left.get_value(record, dialect);
        let right = self.right.get_value(record, dialect);
        self.operator.compare(&left, &right)
    }

    /// Canonical JSON form: the `[left, right, operatorId]` triple.
    pub fn to_json(&self, dialect: &Dialect) -> Value {
        Value::Array(vec![
            self.left.to_json(dialect),
            self.right.to_json(dialect),
            Value::String(self.operator.id.clone()),
        ])
    }

    /// Renders through the dialect with a throwaway parameter list.
    pub fn to_string_with(&self, dialect: &Dialect) -> String {
        let mut params = Vec::new();
        dialect.item_to_string(self, &mut params)
    }
}
