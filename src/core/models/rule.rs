//! Priority rules
//!
//! A rule pairs a priority with an expression. On the command line a rule is
//! written `<priority>=<expression>`; only the first `=` separates the two,
//! so the expression itself may contain `==`.
//!
//! # Examples
//!
//! ```
//! use sort_by_priority::core::models::{Priority, Rule};
//!
//! let rule = Rule::parse(r#"5="{status}" == "fail""#).unwrap();
//! assert_eq!(rule.priority(), Priority::new(5).unwrap());
//! assert_eq!(rule.source(), r#""{status}" == "fail""#);
//!
//! assert!(Rule::parse("11=true").is_err());
//! assert!(Rule::parse("no delimiter").is_err());
//! ```

use thiserror::Error;

use super::{Priority, PriorityError, Record};
use crate::expr::{self, Env, EvalError, Expr, ParseError};

/// Errors that can occur when building rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// No `=` between priority and expression
    #[error("invalid rule '{0}': expected '<priority>=<expression>'")]
    MissingDelimiter(String),

    /// The priority part is not a valid priority
    #[error("invalid rule '{rule}': {source}")]
    InvalidPriority {
        /// The rule as written
        rule: String,
        /// Why the priority was rejected
        source: PriorityError,
    },
}

/// A priority rule
#[derive(Debug, Clone)]
pub struct Rule {
    priority: Priority,
    source: String,
    compiled: Result<Expr, ParseError>,
}

impl Rule {
    /// Create a rule from an already validated priority
    ///
    /// A syntax error in `source` does not fail construction: the rule is
    /// kept and reports the error each time it is evaluated.
    #[must_use]
    pub fn new(priority: Priority, source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = expr::compile(&source);
        if let Err(err) = &compiled {
            log::warn!("rule '{source}' will never match: {err}");
        }
        Self {
            priority,
            source,
            compiled,
        }
    }

    /// Create a rule from a raw priority value, checking the range
    pub fn with_priority(priority: i64, source: impl Into<String>) -> Result<Self, RuleError> {
        let source = source.into();
        let priority = Priority::new(priority).map_err(|e| RuleError::InvalidPriority {
            rule: format!("{priority}={source}"),
            source: e,
        })?;
        Ok(Self::new(priority, source))
    }

    /// Parse a `<priority>=<expression>` string
    pub fn parse(spec: &str) -> Result<Self, RuleError> {
        let (priority, source) =
            spec.split_once('=').ok_or_else(|| RuleError::MissingDelimiter(spec.to_string()))?;
        let priority = priority.parse::<Priority>().map_err(|e| RuleError::InvalidPriority {
            rule: spec.to_string(),
            source: e,
        })?;
        Ok(Self::new(priority, source))
    }

    /// Priority given to matching records
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// The expression as written
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression, or the syntax error that prevents parsing
    pub fn compiled(&self) -> Result<&Expr, &ParseError> {
        self.compiled.as_ref()
    }

    /// Whether this rule matches `record`
    pub fn matches(&self, record: &Record, env: &Env) -> Result<bool, EvalError> {
        let compiled = self.compiled.as_ref().map_err(|e| EvalError::Syntax(e.clone()))?;
        expr::verdict(compiled, record, env)
    }
}

/// Rules ordered from highest to lowest priority
///
/// Rules sharing a priority keep the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, sorting rules by descending priority
    #[must_use]
    pub fn new(mut rules: Vec<Rule>) -> Self {
        // sort_by is stable
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// Parse `<priority>=<expression>` strings into a rule set
    ///
    /// Fails on the first malformed string.
    pub fn parse<I, S>(specs: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = specs.into_iter().map(|s| Rule::parse(s.as_ref())).collect::<Result<_, _>>()?;
        Ok(Self::new(rules))
    }

    /// Iterate rules from highest to lowest priority
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
