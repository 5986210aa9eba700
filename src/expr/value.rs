//! Runtime values produced while evaluating an expression

use chrono::{NaiveDateTime, TimeDelta};

/// A value in a rule expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `true` / `false`
    Bool(bool),
    /// Any number
    Num(f64),
    /// Text, including every record field
    Str(String),
    /// A point in time (no timezone)
    Time(NaiveDateTime),
    /// A length of time
    Duration(TimeDelta),
    /// `(a, b)` / `[a, b]`
    List(Vec<Value>),
}

impl Value {
    /// Name of the value's type, used in error messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Num(_) => "number",
            Self::Str(_) => "string",
            Self::Time(_) => "timestamp",
            Self::Duration(_) => "duration",
            Self::List(_) => "list",
        }
    }

    /// Truthiness, used to turn the final result into a verdict
    ///
    /// `false`, `0`, `""`, `[]` and a zero duration are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Num(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Time(_) => true,
            Self::Duration(d) => !d.is_zero(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
