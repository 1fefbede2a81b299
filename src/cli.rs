//! CLI support for sq-filter
//!
//! Provides programmatic access to the `sqf` CLI functionality for
//! embedding in other tools.

use std::io;

use serde_json::Value;

use crate::{Dialect, DialectConfig, DialectError, ParseOptions, Sql, ToStringOptions, parse};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// The condition did not normalize to a group
    Unparseable,
    /// Dialect construction error
    Dialect(DialectError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Unparseable => {
                write!(f, "Unable to parse a filter condition from the provided data")
            }
            CliError::Dialect(e) => write!(f, "Dialect error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Use --input or pipe JSON to stdin."),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Dialect(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<DialectError> for CliError {
    fn from(e: DialectError) -> Self {
        CliError::Dialect(e)
    }
}

/// Filters records through a condition.
///
/// An array input yields the matching elements; a single record yields
/// the record itself when it matches, `null` otherwise.
pub fn execute_match(condition: &str, input: &str) -> Result<Value, CliError> {
    let condition: Value = serde_json::from_str(condition)?;
    let records: Value = serde_json::from_str(input)?;

    let options = ParseOptions::default();
    let group = parse(&condition, &options).ok_or(CliError::Unparseable)?;
    let dialect = &options.dialect;

    match records {
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .filter(|record| group.filter(record, dialect))
                .collect(),
        )),
        record => {
            if group.filter(&record, dialect) {
                Ok(record)
            } else {
                Ok(Value::Null)
            }
        }
    }
}

/// Renders a condition as a WHERE expression.
///
/// `inline` disables parametrization and embeds literals as JSON text.
pub fn execute_sql(condition: &str, inline: bool) -> Result<Sql, CliError> {
    let condition: Value = serde_json::from_str(condition)?;

    let dialect = Dialect::new(DialectConfig {
        to_string_options: ToStringOptions {
            indentation: false,
            parametrized: !inline,
            ..ToStringOptions::default()
        },
        ..DialectConfig::default()
    })?;
    let options = ParseOptions::with_dialect(dialect);

    let group = parse(&condition, &options).ok_or(CliError::Unparseable)?;
    Ok(group.to_sql(&options.dialect))
}

/// Normalizes a condition and returns its canonical JSON form.
pub fn execute_parse(condition: &str) -> Result<Value, CliError> {
    let condition: Value = serde_json::from_str(condition)?;
    let options = ParseOptions::default();
    let group = parse(&condition, &options).ok_or(CliError::Unparseable)?;
    Ok(group.to_json(&options))
}
