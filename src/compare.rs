use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde_json::Value;

/// Loose comparison semantics backing the built-in operators.
///
/// Values of differing representable types may compare equal: a numeric
/// string compares numerically against a number, and booleans coerce to
/// 0/1. Conversions go through `Decimal` so that `"0.1"` equals `0.1`
/// without floating-point round-off.

fn as_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from_i64(i)
            } else if let Some(u) = n.as_u64() {
                Decimal::from_u64(u)
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Bool(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        _ => None,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Loose equality: `1 == "1"`, `true == 1`, `1 == 1.0`, `null == null`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (as_decimal(a), as_decimal(b)) {
            (Some(dx), Some(dy)) => dx == dy,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(_), _)
        | (_, Value::Array(_))
        | (Value::Object(_), _)
        | (_, Value::Object(_)) => a == b,
        _ => match (as_decimal(a), as_decimal(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Loose total-order comparison for the ordering operators.
///
/// Two strings compare lexicographically; anything else that coerces to a
/// number compares numerically. Incomparable operands yield `None`, which
/// the ordering operators treat as "neither less nor greater".
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => match (as_decimal(a), as_decimal(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => {
                if let (Value::Number(x), Value::Number(y)) = (a, b) {
                    x.as_f64().partial_cmp(&y.as_f64())
                } else {
                    None
                }
            }
        },
    }
}

/// Equality used for membership tests: numbers compare numerically,
/// everything else structurally.
pub fn same_value(a: &Value, b: &Value) -> bool {
    if let (Value::Number(_), Value::Number(_)) = (a, b) {
        loose_eq(a, b)
    } else {
        a == b
    }
}

/// True when `a` is a string starting with the textual form of `b`.
/// Non-string left operands lack the capability and yield `false`.
pub fn starts_with(a: &Value, b: &Value) -> bool {
    match (a, as_text(b)) {
        (Value::String(s), Some(prefix)) => s.starts_with(&prefix),
        _ => false,
    }
}

pub fn ends_with(a: &Value, b: &Value) -> bool {
    match (a, as_text(b)) {
        (Value::String(s), Some(suffix)) => s.ends_with(&suffix),
        _ => false,
    }
}

/// Substring test for strings, membership test for arrays.
pub fn contains(a: &Value, b: &Value) -> bool {
    match a {
        Value::String(s) => as_text(b).map(|needle| s.contains(&needle)).unwrap_or(false),
        Value::Array(items) => items.iter().any(|item| same_value(item, b)),
        _ => false,
    }
}

/// True when the operand exposes the containment capability at all.
/// The `not*` operator variants fall back to `true` when it is absent.
pub fn can_contain(v: &Value) -> bool {
    matches!(v, Value::String(_) | Value::Array(_))
}

pub fn is_null(v: &Value) -> bool {
    matches!(v, Value::Null)
}
