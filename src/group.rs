use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dialect::Dialect;
use crate::item::Item;
use crate::{DEFAULT_IS_ANY, ParseOptions};

/// A member of a group: one comparison or a nested group of the
/// opposite polarity (same-polarity groups are flattened away).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Item(Item),
    Group(Group),
}

/// An ordered boolean combination of items and nested groups.
///
/// `is_any = true` gives OR ("any") semantics, `false` gives AND
/// ("every") semantics. The item list is immutable after construction
/// except through the [`and`](Group::and)/[`or`](Group::or)
/// combinators.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    is_any: bool,
    items: Vec<Node>,
}

/// A rendered, parameterized expression: the text plus the values
/// accumulated for its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub text: String,
    pub values: Vec<Value>,
}

/// A compiled record predicate.
pub type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Options for the static [`Group::filter_fn`] helper.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub parse: ParseOptions,
    /// Turn unparseable input into an error instead of the lenient
    /// always-true predicate.
    pub throw_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// The input did not normalize to a group.
    Unparseable,
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::Unparseable => {
                write!(f, "Unable to parse a group from the provided data")
            }
        }
    }
}

impl std::error::Error for GroupError {}

impl Group {
    /// Direct construction from already-normalized nodes.
    pub fn new(items: Vec<Node>, is_any: bool) -> Group {
        Group { is_any, items }
    }

    pub fn is_any(&self) -> bool {
        self.is_any
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    /// Normalizes a loosely shaped condition description into a group.
    ///
    /// Accepted shapes, most specific first:
    /// - an array that is itself a single comparison (`["[a]", 1]`,
    ///   `["[a]", 1, "greater"]`) wraps into a singleton group;
    /// - any other array combines its elements, each normalized as an
    ///   item first and a nested group second; unrecognizable elements
    ///   are dropped silently;
    /// - a single-key object `{any: [...]}` / `{every: [...]}` recurses
    ///   into its array with the polarity set accordingly;
    /// - any other object is a field→value map, each pair becoming an
    ///   `equal` comparison (or the `{field: {op: value}}` shorthand);
    /// - everything else is not a group.
    pub fn parse(raw: &Value, options: &ParseOptions) -> Option<Group> {
        match raw {
            Value::Array(elements) => {
                if let Some(item) = Item::parse(raw, options) {
                    return Some(Group {
                        is_any: options.is_any,
                        items: vec![Node::Item(item)],
                    });
                }
                Some(Self::from_elements(elements, options.is_any, options))
            }
            Value::Object(map) => {
                if map.len() == 1 {
                    let (key, value) = map.iter().next()?;
                    let is_combinator = key == &options.any_word || key == &options.every_word;
                    if is_combinator && value.is_array() {
                        let mut inner = options.clone();
                        inner.is_any = key == &options.any_word;
                        return Group::parse(value, &inner);
                    }
                }
                let dialect = &options.dialect;
                let elements: Vec<Value> = map
                    .iter()
                    .map(|(key, value)| {
                        let left = if dialect.parse_options.left_side_as_reference {
                            dialect.wrap_reference(key)
                        } else {
                            key.clone()
                        };
                        Value::Array(vec![Value::String(left), value.clone()])
                    })
                    .collect();
                Some(Self::from_elements(&elements, options.is_any, options))
            }
            _ => None,
        }
    }

    fn from_elements(elements: &[Value], is_any: bool, options: &ParseOptions) -> Group {
        let mut items = Vec::new();
        for raw in elements {
            Self::normalize_into(&mut items, raw, is_any, options);
        }
        Self::finish(is_any, items)
    }

    /// Normalizes one element into the item list. A nested group of the
    /// same polarity is inlined; an unrecognizable element is dropped.
    fn normalize_into(items: &mut Vec<Node>, raw: &Value, is_any: bool, options: &ParseOptions) {
        if let Some(item) = Item::parse(raw, options) {
            items.push(Node::Item(item));
            return;
        }
        let mut inner = options.clone();
        inner.is_any = is_any;
        if let Some(group) = Group::parse(raw, &inner) {
            if group.is_any == is_any {
                items.extend(group.items);
            } else {
                items.push(Node::Group(group));
            }
        }
    }

    /// Applies the single-child elision: a list holding exactly one
    /// nested group collapses to that group's own items, keeping the
    /// parent's polarity.
    fn finish(is_any: bool, mut items: Vec<Node>) -> Group {
        if items.len() == 1 {
            if let Node::Group(_) = items[0] {
                if let Some(Node::Group(inner)) = items.pop() {
                    return Group {
                        is_any,
                        items: inner.items,
                    };
                }
            }
        }
        Group { is_any, items }
    }

    /// Short-circuiting ordered evaluation: AND stops at the first
    /// false member, OR at the first true one.
    ///
    /// An empty group yields `false` for both polarities — a preserved
    /// quirk of the normalization grammar, not the conventional
    /// empty-AND truth.
    pub fn filter(&self, record: &Value, dialect: &Dialect) -> bool {
        let mut result = false;
        for node in &self.items {
            result = match node {
                Node::Item(item) => item.filter(record, dialect),
                Node::Group(group) => group.filter(record, dialect),
            };
            if (result && self.is_any) || (!result && !self.is_any) {
                return result;
            }
        }
        result
    }

    /// Appends a condition with AND polarity. Matching polarity appends
    /// in place; opposite polarity builds a new parent group holding
    /// `[condition, self]`.
    pub fn and(self, raw: &Value, options: &ParseOptions) -> Group {
        self.join(raw, false, options)
    }

    /// Appends a condition with OR polarity.
    pub fn or(self, raw: &Value, options: &ParseOptions) -> Group {
        self.join(raw, true, options)
    }

    fn join(mut self, raw: &Value, is_any: bool, options: &ParseOptions) -> Group {
        if self.is_any == is_any {
            Self::normalize_into(&mut self.items, raw, is_any, options);
            self
        } else {
            let mut items = Vec::new();
            Self::normalize_into(&mut items, raw, is_any, options);
            items.push(Node::Group(self));
            Self::finish(is_any, items)
        }
    }

    /// Canonical JSON form.
    ///
    /// The top level is a bare array of member JSON under the default
    /// polarity, or `{word: [...]}` otherwise. Nested groups always
    /// carry their explicit combinator word so that polarity survives
    /// a round-trip through [`Group::parse`].
    pub fn to_json(&self, options: &ParseOptions) -> Value {
        self.json_level(options, true)
    }

    fn json_level(&self, options: &ParseOptions, top: bool) -> Value {
        let dialect = &options.dialect;
        let items: Vec<Value> = self
            .items
            .iter()
            .map(|node| match node {
                Node::Item(item) => item.to_json(dialect),
                Node::Group(group) => group.json_level(options, false),
            })
            .collect();
        if top && self.is_any == DEFAULT_IS_ANY {
            return Value::Array(items);
        }
        let word = if self.is_any {
            options.any_word.clone()
        } else {
            options.every_word.clone()
        };
        let mut map = serde_json::Map::new();
        map.insert(word, Value::Array(items));
        Value::Object(map)
    }

    /// Renders to text, discarding any accumulated parameter values.
    pub fn to_string_with(&self, dialect: &Dialect) -> String {
        let mut params = Vec::new();
        dialect.group_to_string(self, &mut params)
    }

    /// Renders to a parameterized expression with a fresh accumulator.
    pub fn to_sql(&self, dialect: &Dialect) -> Sql {
        let mut values = Vec::new();
        let text = dialect.group_to_string(self, &mut values);
        Sql { text, values }
    }

    /// Static-style predicate builder.
    ///
    /// Unlike [`crate::filter`], which fails closed, this helper is
    /// fail-OPEN by default: unparseable input yields an always-true
    /// predicate unless `throw_error` is set.
    pub fn filter_fn(raw: &Value, options: &FilterOptions) -> Result<Predicate, GroupError> {
        match Group::parse(raw, &options.parse) {
            Some(group) => {
                let dialect = Arc::clone(&options.parse.dialect);
                Ok(Box::new(move |record| group.filter(record, &dialect)))
            }
            None if options.throw_error => Err(GroupError::Unparseable),
            None => Ok(Box::new(|_| true)),
        }
    }
}
