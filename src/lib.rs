pub mod compare;
pub mod dialect;
pub mod group;
pub mod item;
pub mod operator;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

use std::sync::Arc;

use serde_json::Value;

pub use dialect::{
    Dialect, DialectConfig, DialectError, DialectParseOptions, ModelLookup, OperatorsOptions,
    Side, ToStringOptions,
};
pub use group::{FilterOptions, Group, GroupError, Node, Predicate, Sql};
pub use item::{Item, ItemError};
pub use operator::{Arity, CompareFn, Operator, OperatorError, OperatorUpdate};
pub use value::ItemValue;

/// Groups combine with AND ("every") semantics unless requested
/// otherwise.
pub const DEFAULT_IS_ANY: bool = false;

/// Options threaded through every parse, filter and serialize call.
///
/// There is no process-wide default dialect; the default here is a
/// fresh built-in [`Dialect`] behind an `Arc`, shared by clone.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub dialect: Arc<Dialect>,
    /// Default combinator polarity for groups that do not state one.
    pub is_any: bool,
    /// Key recognized as the OR combinator in object input.
    pub any_word: String,
    /// Key recognized as the AND combinator in object input.
    pub every_word: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            dialect: Arc::new(Dialect::default()),
            is_any: DEFAULT_IS_ANY,
            any_word: "any".to_string(),
            every_word: "every".to_string(),
        }
    }
}

impl ParseOptions {
    pub fn with_dialect(dialect: Dialect) -> Self {
        ParseOptions {
            dialect: Arc::new(dialect),
            ..ParseOptions::default()
        }
    }
}

/// Normalizes a loosely shaped condition description into a predicate
/// tree, or nothing when the input is unrecognizable.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sq_filter::{parse, ParseOptions};
///
/// let options = ParseOptions::default();
/// let group = parse(&json!({"age": {"greater": 18}}), &options).unwrap();
/// let sql = group.to_sql(&options.dialect);
/// assert_eq!(sql.text, "[age] > $1");
/// assert_eq!(sql.values, vec![json!(18)]);
/// ```
pub fn parse(input: &Value, options: &ParseOptions) -> Option<Group> {
    Group::parse(input, options)
}

/// Compiles a condition description into a record predicate.
///
/// Fails closed: when the input cannot be parsed the predicate rejects
/// every record. (The static [`Group::filter_fn`] helper is fail-open
/// instead.)
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sq_filter::{filter, ParseOptions};
///
/// let matches = filter(
///     &json!({"any": [{"name": "Alice"}, {"name": "Bob"}]}),
///     &ParseOptions::default(),
/// );
/// assert!(matches(&json!({"name": "Bob"})));
/// assert!(!matches(&json!({"name": "Carol"})));
/// ```
pub fn filter(input: &Value, options: &ParseOptions) -> Predicate {
    match Group::parse(input, options) {
        Some(group) => {
            let dialect = Arc::clone(&options.dialect);
            Box::new(move |record| group.filter(record, &dialect))
        }
        None => Box::new(|_| false),
    }
}
