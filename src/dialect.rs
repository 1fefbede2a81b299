use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::compare;
use crate::group::{Group, Node};
use crate::item::Item;
use crate::operator::{Arity, Operator, OperatorError, OperatorUpdate};
use crate::value::ItemValue;

/// Which side of a comparison a value is being rendered on.
///
/// Right-hand literals are parametrized (or JSON-escaped); left-hand
/// literals render as their natural text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Record-lookup hook: resolves a reference path against a record.
///
/// The default lookup is a direct property read; a dialect may install
/// its own hook to support nested paths or computed access.
pub type ModelLookup = Arc<dyn Fn(&Value, &str) -> Value + Send + Sync>;

/// Rendering configuration for a [`Dialect`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToStringOptions {
    /// Join group members across indented lines instead of single spaces.
    pub indentation: bool,
    /// Bracket pair wrapped around multi-member groups.
    pub group_wrapper: (String, String),
    pub or_sign: String,
    pub and_sign: String,
    /// Delimiter pair marking a string as a field reference, e.g. `[age]`.
    pub reference_wrapper: (String, String),
    /// Emit placeholders for right-hand literals and accumulate their
    /// values in a side list.
    pub parametrized: bool,
    pub parameter_sign: String,
    /// Suffix placeholders with a 1-based position (`$1`, `$2`, ...).
    pub indexed_parameter_sign: bool,
}

impl Default for ToStringOptions {
    fn default() -> Self {
        ToStringOptions {
            indentation: true,
            group_wrapper: ("(".to_string(), ")".to_string()),
            or_sign: "OR".to_string(),
            and_sign: "AND".to_string(),
            reference_wrapper: ("[".to_string(), "]".to_string()),
            parametrized: true,
            parameter_sign: "$".to_string(),
            indexed_parameter_sign: true,
        }
    }
}

/// Parse configuration for a [`Dialect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectParseOptions {
    /// Treat bare object keys in field→value maps as field references.
    pub left_side_as_reference: bool,
}

impl Default for DialectParseOptions {
    fn default() -> Self {
        DialectParseOptions {
            left_side_as_reference: true,
        }
    }
}

/// Registry policy for operator overrides passed to [`Dialect::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorsOptions {
    /// Discard the built-in table entirely.
    pub replace_all: bool,
    /// Field-level merge into an existing operator with the same id;
    /// when false, overrides replace wholesale.
    pub merge: bool,
}

impl Default for OperatorsOptions {
    fn default() -> Self {
        OperatorsOptions {
            replace_all: false,
            merge: true,
        }
    }
}

/// Construction input for [`Dialect::new`].
#[derive(Default)]
pub struct DialectConfig {
    /// Operator overrides, keyed by id.
    pub operators: Vec<(String, OperatorUpdate)>,
    pub operators_options: OperatorsOptions,
    pub to_string_options: ToStringOptions,
    pub parse_options: DialectParseOptions,
    pub model_lookup: Option<ModelLookup>,
}

/// Errors raised by [`Dialect`] construction.
#[derive(Debug)]
pub enum DialectError {
    /// Reference wrapper delimiters must both be non-empty.
    EmptyReferenceWrapper,
    /// The derived reference pattern failed to compile.
    Pattern(regex::Error),
    /// An operator override was invalid.
    Operator(OperatorError),
}

impl fmt::Display for DialectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectError::EmptyReferenceWrapper => {
                write!(f, "Reference wrapper delimiters must be non-empty")
            }
            DialectError::Pattern(e) => write!(f, "Invalid reference pattern: {}", e),
            DialectError::Operator(e) => write!(f, "Invalid operator: {}", e),
        }
    }
}

impl std::error::Error for DialectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DialectError::Pattern(e) => Some(e),
            DialectError::Operator(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OperatorError> for DialectError {
    fn from(e: OperatorError) -> Self {
        DialectError::Operator(e)
    }
}

/// The pluggable configuration bundle governing the operator registry,
/// rendering templates and reference syntax.
///
/// Dialects are immutable after construction; callers share them through
/// an `Arc` (see [`crate::ParseOptions`]). There is no process-wide
/// default instance — [`Dialect::default`] is a factory producing a
/// fresh built-in dialect.
#[derive(Clone)]
pub struct Dialect {
    operators: HashMap<String, Operator>,
    pub to_string_options: ToStringOptions,
    pub parse_options: DialectParseOptions,
    reference_pattern: Regex,
    model_lookup: Option<ModelLookup>,
}

impl Dialect {
    pub fn new(config: DialectConfig) -> Result<Dialect, DialectError> {
        let reference_pattern =
            Self::build_reference_pattern(&config.to_string_options.reference_wrapper)?;

        let mut operators = HashMap::new();
        if !config.operators_options.replace_all {
            for (id, def) in builtin_operators() {
                operators.insert(id.to_string(), Operator::new(id, def)?);
            }
        }
        for (id, def) in config.operators {
            if config.operators_options.merge && operators.contains_key(&id) {
                if let Some(existing) = operators.get_mut(&id) {
                    existing.update(def);
                }
            } else {
                operators.insert(id.clone(), Operator::new(id, def)?);
            }
        }

        Ok(Dialect {
            operators,
            to_string_options: config.to_string_options,
            parse_options: config.parse_options,
            reference_pattern,
            model_lookup: config.model_lookup,
        })
    }

    fn build_reference_pattern(wrapper: &(String, String)) -> Result<Regex, DialectError> {
        let (left, right) = wrapper;
        if left.is_empty() || right.is_empty() {
            return Err(DialectError::EmptyReferenceWrapper);
        }
        let pattern = format!(
            "^{}([^{}]+){}",
            regex::escape(left),
            regex::escape(right),
            regex::escape(right)
        );
        Regex::new(&pattern).map_err(DialectError::Pattern)
    }

    pub fn get_operator(&self, id: &str) -> Option<&Operator> {
        self.operators.get(id)
    }

    pub fn is_operator(&self, id: &str) -> bool {
        self.operators.contains_key(id)
    }

    /// Wraps a bare path in the reference delimiters: `age` → `[age]`.
    pub fn wrap_reference(&self, path: &str) -> String {
        let (left, right) = &self.to_string_options.reference_wrapper;
        format!("{}{}{}", left, path, right)
    }

    /// Strips the reference delimiters: `[age]` → `age`. Inverse of
    /// [`wrap_reference`](Self::wrap_reference) for any path free of the
    /// delimiter characters.
    pub fn unwrap_reference(&self, text: &str) -> String {
        self.reference_pattern.replace(text, "$1").into_owned()
    }

    /// Returns the captured path when the text matches the reference
    /// pattern, or nothing for a plain literal.
    pub fn match_reference(&self, text: &str) -> Option<String> {
        if self.reference_pattern.is_match(text) {
            Some(self.unwrap_reference(text))
        } else {
            None
        }
    }

    /// Resolves a reference path against a record. Lookup misses and
    /// non-object records resolve to `Null` rather than failing.
    pub fn model_value(&self, record: &Value, path: &str) -> Value {
        if let Some(lookup) = &self.model_lookup {
            return lookup(record, path);
        }
        record.get(path).cloned().unwrap_or(Value::Null)
    }

    /// Renders a group, threading one shared parameter accumulator
    /// through the whole subtree.
    pub fn group_to_string(&self, group: &Group, params: &mut Vec<Value>) -> String {
        let items = group.items();
        if items.is_empty() {
            return String::new();
        }
        if items.len() == 1 {
            return self.node_to_string(&items[0], params);
        }

        let texts: Vec<String> = items
            .iter()
            .map(|node| self.node_to_string(node, params))
            .collect();

        let opts = &self.to_string_options;
        let ws = if opts.indentation { "\n" } else { " " };
        let sign = if group.is_any() {
            &opts.or_sign
        } else {
            &opts.and_sign
        };
        let joiner = format!("{}{}{}", ws, sign, ws);

        let mut body = texts.join(&joiner);
        if opts.indentation {
            body = tabulate(&body, 1);
        }
        format!(
            "{}{}{}{}{}",
            opts.group_wrapper.0, ws, body, ws, opts.group_wrapper.1
        )
    }

    fn node_to_string(&self, node: &Node, params: &mut Vec<Value>) -> String {
        match node {
            Node::Item(item) => self.item_to_string(item, params),
            Node::Group(group) => self.group_to_string(group, params),
        }
    }

    /// Renders one comparison through its operator's template.
    pub fn item_to_string(&self, item: &Item, params: &mut Vec<Value>) -> String {
        let operator = item.operator();
        let left = self.item_value_to_string(item.left(), Side::Left, params);
        let right = if operator.is_unary() {
            String::new()
        } else {
            self.item_value_to_string(item.right(), Side::Right, params)
        };
        operator.render(&left, &right)
    }

    /// Renders a leaf value. References render wrapped regardless of
    /// side; right-hand literals become placeholders in parametrized
    /// mode, JSON-escaped text otherwise.
    pub fn item_value_to_string(
        &self,
        value: &ItemValue,
        side: Side,
        params: &mut Vec<Value>,
    ) -> String {
        match value {
            ItemValue::Reference(path) => self.wrap_reference(path),
            ItemValue::Literal(v) => match side {
                Side::Left => natural_text(v),
                Side::Right => {
                    let opts = &self.to_string_options;
                    if opts.parametrized {
                        params.push(v.clone());
                        let mut sign = opts.parameter_sign.clone();
                        if opts.indexed_parameter_sign {
                            sign.push_str(&params.len().to_string());
                        }
                        sign
                    } else {
                        serde_json::to_string(v).unwrap_or_default()
                    }
                }
            },
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::new(DialectConfig::default()).expect("built-in dialect configuration is valid")
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("Dialect")
            .field("operators", &ids)
            .field("to_string_options", &self.to_string_options)
            .field("parse_options", &self.parse_options)
            .finish()
    }
}

/// Left-side literals render as their natural text: strings unquoted,
/// everything else as compact JSON.
fn natural_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Prefixes every non-empty line with tabs.
fn tabulate(text: &str, tabs: usize) -> String {
    let prefix = "\t".repeat(tabs);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The 16 built-in operators shared by every dialect that does not
/// request `replace_all`.
fn builtin_operators() -> Vec<(&'static str, OperatorUpdate)> {
    vec![
        (
            "equal",
            OperatorUpdate::new().sign("=").compare(compare::loose_eq),
        ),
        (
            "notEqual",
            OperatorUpdate::new()
                .sign("!=")
                .compare(|a, b| !compare::loose_eq(a, b)),
        ),
        (
            "greater",
            OperatorUpdate::new()
                .sign(">")
                .compare(|a, b| compare::loose_cmp(a, b) == Some(Ordering::Greater)),
        ),
        (
            "greaterOrEqual",
            OperatorUpdate::new().sign(">=").compare(|a, b| {
                matches!(
                    compare::loose_cmp(a, b),
                    Some(Ordering::Greater) | Some(Ordering::Equal)
                )
            }),
        ),
        (
            "lesser",
            OperatorUpdate::new()
                .sign("<")
                .compare(|a, b| compare::loose_cmp(a, b) == Some(Ordering::Less)),
        ),
        (
            "lesserOrEqual",
            OperatorUpdate::new().sign("<=").compare(|a, b| {
                matches!(
                    compare::loose_cmp(a, b),
                    Some(Ordering::Less) | Some(Ordering::Equal)
                )
            }),
        ),
        (
            "startsWith",
            OperatorUpdate::new()
                .sign("starts with")
                .compare(compare::starts_with),
        ),
        (
            "endsWith",
            OperatorUpdate::new()
                .sign("ends with")
                .compare(compare::ends_with),
        ),
        // The not* variants fall back to true when the left operand
        // lacks the capability at all.
        (
            "notStartsWith",
            OperatorUpdate::new()
                .sign("not starts with")
                .compare(|a, b| match a {
                    Value::String(_) => !compare::starts_with(a, b),
                    _ => true,
                }),
        ),
        (
            "notEndsWith",
            OperatorUpdate::new()
                .sign("not ends with")
                .compare(|a, b| match a {
                    Value::String(_) => !compare::ends_with(a, b),
                    _ => true,
                }),
        ),
        (
            "contains",
            OperatorUpdate::new()
                .sign("contains")
                .compare(compare::contains),
        ),
        (
            "notContains",
            OperatorUpdate::new().sign("not contains").compare(|a, b| {
                if compare::can_contain(a) {
                    !compare::contains(a, b)
                } else {
                    true
                }
            }),
        ),
        // Membership tests look at the right operand.
        (
            "in",
            OperatorUpdate::new()
                .sign("in")
                .compare(|a, b| compare::contains(b, a)),
        ),
        (
            "notIn",
            OperatorUpdate::new().sign("not in").compare(|a, b| {
                if compare::can_contain(b) {
                    !compare::contains(b, a)
                } else {
                    true
                }
            }),
        ),
        (
            "null",
            OperatorUpdate::new()
                .sign("is null")
                .separator(" is null")
                .arity(Arity::Unary)
                .compare(|a, _| compare::is_null(a)),
        ),
        (
            "notNull",
            OperatorUpdate::new()
                .sign("is not null")
                .separator(" is not null")
                .arity(Arity::Unary)
                .compare(|a, _| !compare::is_null(a)),
        ),
    ]
}
