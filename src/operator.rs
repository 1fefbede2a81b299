use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Comparison function carried by an [`Operator`].
///
/// Shared through an `Arc` so that parsed trees can move into
/// `Send + Sync` predicate closures.
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Whether an operator consumes both operands or only the left one.
///
/// Unary operators (`null`, `notNull`) ignore their right operand during
/// evaluation, render without a right side and never emit a parameter
/// for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
    #[default]
    Binary,
    Unary,
}

/// A named comparison with a display template and an evaluation function.
///
/// The render template is `prefix + left + separator + right + postfix`;
/// an unset `separator` defaults to `" <sign> "`.
#[derive(Clone)]
pub struct Operator {
    pub id: String,
    pub sign: String,
    pub prefix: Option<String>,
    pub separator: Option<String>,
    pub postfix: Option<String>,
    pub arity: Arity,
    compare: CompareFn,
}

/// Errors raised by direct [`Operator`] construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorError {
    /// Operator id must be non-empty (and unique within its dialect).
    EmptyId,
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::EmptyId => write!(f, "Operator id must be not empty"),
        }
    }
}

impl std::error::Error for OperatorError {}

/// A field-level update for an [`Operator`].
///
/// Each `Some` field overwrites the corresponding operator field, each
/// `None` field is kept. Also serves as the definition shape when
/// registering operators on a dialect: absent fields fall back to their
/// defaults (empty sign, binary arity, never-matching compare).
#[derive(Default, Clone)]
pub struct OperatorUpdate {
    pub sign: Option<String>,
    pub prefix: Option<String>,
    pub separator: Option<String>,
    pub postfix: Option<String>,
    pub arity: Option<Arity>,
    pub compare: Option<CompareFn>,
}

impl OperatorUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign(mut self, sign: &str) -> Self {
        self.sign = Some(sign.to_string());
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = Some(separator.to_string());
        self
    }

    pub fn postfix(mut self, postfix: &str) -> Self {
        self.postfix = Some(postfix.to_string());
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn compare(mut self, f: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        self.compare = Some(Arc::new(f));
        self
    }
}

impl Operator {
    /// Builds an operator from a definition. The id must be non-empty.
    pub fn new(id: impl Into<String>, def: OperatorUpdate) -> Result<Operator, OperatorError> {
        let id = id.into();
        if id.is_empty() {
            return Err(OperatorError::EmptyId);
        }
        let mut operator = Operator {
            id,
            sign: String::new(),
            prefix: None,
            separator: None,
            postfix: None,
            arity: Arity::Binary,
            compare: Arc::new(|_, _| false),
        };
        operator.update(def);
        Ok(operator)
    }

    /// Merges an update in: present fields overwrite, absent fields are
    /// kept, including the compare function.
    pub fn update(&mut self, def: OperatorUpdate) {
        if let Some(sign) = def.sign {
            self.sign = sign;
        }
        if let Some(prefix) = def.prefix {
            self.prefix = Some(prefix);
        }
        if let Some(separator) = def.separator {
            self.separator = Some(separator);
        }
        if let Some(postfix) = def.postfix {
            self.postfix = Some(postfix);
        }
        if let Some(arity) = def.arity {
            self.arity = arity;
        }
        if let Some(compare) = def.compare {
            self.compare = compare;
        }
    }

    pub fn is_unary(&self) -> bool {
        self.arity == Arity::Unary
    }

    /// Evaluates the operator against two resolved operands.
    pub fn compare(&self, left: &Value, right: &Value) -> bool {
        (self.compare)(left, right)
    }

    /// Renders two already-formatted operand texts through the template.
    pub fn render(&self, left: &str, right: &str) -> String {
        let default_separator;
        let separator = match &self.separator {
            Some(s) => s.as_str(),
            None if !self.sign.is_empty() => {
                default_separator = format!(" {} ", self.sign);
                default_separator.as_str()
            }
            None => "",
        };
        format!(
            "{}{}{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            left,
            separator,
            right,
            self.postfix.as_deref().unwrap_or(""),
        )
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("id", &self.id)
            .field("sign", &self.sign)
            .field("arity", &self.arity)
            .finish()
    }
}

// Equality ignores the compare function; two operators with the same id
// and template are the same operator for tree-equality purposes.
impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.sign == other.sign
            && self.prefix == other.prefix
            && self.separator == other.separator
            && self.postfix == other.postfix
            && self.arity == other.arity
    }
}
