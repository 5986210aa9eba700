//! Rule expression language
//!
//! A small boolean language over a record's string fields, with string,
//! regex and date helpers. Rules are written the way operators already
//! write them for CI status data:
//!
//! ```text
//! "{package}".startswith("r")
//! re.search(r"kali", "{version}")
//! "{status}" == "fail" and "{previous_status}" in ("unknown", "pass")
//! now() - date("{date}") > days(30)
//! ```
//!
//! `{field}` placeholders inside string literals and bare field names are
//! resolved when the expression is evaluated against a record.
//!
//! # Examples
//!
//! ```
//! use sort_by_priority::core::models::Record;
//! use sort_by_priority::expr::{self, Env};
//!
//! let record = Record::from_pairs([("package", "foo"), ("version", "1.0-kali1")]).unwrap();
//! let env = Env::local();
//! let rule = expr::compile(r#"re.search(r"kali", "{version}")"#).unwrap();
//! assert!(expr::verdict(&rule, &record, &env).unwrap());
//! ```

mod ast;
mod builtins;
mod eval;
mod lexer;
mod parser;
mod value;

use thiserror::Error;

pub use ast::{ArithOp, CmpOp, Expr, Segment, Template};
pub use builtins::parse_time;
pub use eval::{Env, evaluate};
pub use value::Value;

use crate::core::models::Record;

/// Default timestamp format of CI status records
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Syntax error in an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    /// Byte offset in the expression source
    pub offset: usize,
    /// What went wrong
    pub message: String,
}

impl ParseError {
    /// Create a parse error at `offset`
    #[must_use]
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Error while evaluating an expression against a record
#[derive(Debug, Error)]
pub enum EvalError {
    /// The expression could not be parsed
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    /// A referenced field is missing from the record
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// No helper function with this name
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A helper was called with the wrong number of arguments
    #[error("{function}() takes {expected} argument(s), got {got}")]
    Arity {
        /// Function name
        function: String,
        /// Accepted argument count(s)
        expected: String,
        /// Supplied argument count
        got: usize,
    },

    /// Operand or argument of the wrong type
    #[error("type error: {0}")]
    Type(String),

    /// A regex helper got an invalid pattern
    #[error("{function}(): invalid regular expression: {source}")]
    Regex {
        /// Function name
        function: String,
        /// Underlying regex error
        source: regex::Error,
    },

    /// A date helper could not parse its input
    #[error("cannot parse '{value}' as a date with format '{format}'")]
    Date {
        /// Text that failed to parse
        value: String,
        /// Format that was used
        format: String,
    },
}

/// Parse an expression
pub fn compile(source: &str) -> Result<Expr, ParseError> {
    parser::parse(source)
}

/// Evaluate an expression against a record and reduce it to a verdict
pub fn verdict(expr: &Expr, record: &Record, env: &Env) -> Result<bool, EvalError> {
    evaluate(expr, record, env).map(|value| value.is_truthy())
}
