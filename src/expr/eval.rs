//! Tree-walking evaluator
//!
//! Placeholders are looked up in the record at evaluation time and bound as
//! string values, so a field value can never change the shape of the
//! expression it is used in.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use regex::Regex;

use super::ast::{ArithOp, CmpOp, Expr, Segment, Template};
use super::{DEFAULT_DATE_FORMAT, EvalError, Value, builtins};
use crate::core::models::Record;

/// Distinct patterns kept compiled before the cache is reset
const REGEX_CACHE_CAPACITY: usize = 256;

/// Evaluation environment shared by every record in a run
///
/// Also owns the compiled regex cache, so a pattern used by a rule is
/// compiled once per run rather than once per record.
#[derive(Debug, Clone)]
pub struct Env {
    now: NaiveDateTime,
    date_format: String,
    regexes: RefCell<HashMap<String, Result<Regex, regex::Error>>>,
}

impl Env {
    /// Environment with a fixed reference time and the default date format
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            regexes: RefCell::default(),
        }
    }

    /// Environment whose reference time is the local wall clock
    #[must_use]
    pub fn local() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }

    /// Set the default format used by date helpers
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Reference time returned by `now()`
    #[must_use]
    pub const fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Default format for `date()`, `age_days()` and friends
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Compile `pattern`, reusing an earlier compilation of the same text
    ///
    /// Invalid patterns are cached too. Patterns built from field values
    /// can be unique per record, so the cache is cleared when it fills up.
    pub fn regex(&self, pattern: &str) -> Result<Regex, regex::Error> {
        let mut cache = self.regexes.borrow_mut();
        if let Some(compiled) = cache.get(pattern) {
            return compiled.clone();
        }
        if cache.len() >= REGEX_CACHE_CAPACITY {
            cache.clear();
        }
        let compiled = Regex::new(pattern);
        cache.insert(pattern.to_string(), compiled.clone());
        compiled
    }

    /// Number of distinct patterns currently compiled
    #[must_use]
    pub fn compiled_patterns(&self) -> usize {
        self.regexes.borrow().len()
    }
}

/// Evaluate an expression against a record
pub fn evaluate(expr: &Expr, record: &Record, env: &Env) -> Result<Value, EvalError> {
    Evaluator { record, env }.eval(expr)
}

struct Evaluator<'a> {
    record: &'a Record,
    env: &'a Env,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Const(value) => Ok(value.clone()),
            Expr::Text(template) => self.render(template).map(Value::Str),
            Expr::Field(name) => self.field(name).map(|v| Value::Str(v.to_string())),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.is_truthy())),
            Expr::Neg(inner) => negate(self.eval(inner)?),
            Expr::And(left, right) => {
                let verdict = self.eval(left)?.is_truthy() && self.eval(right)?.is_truthy();
                Ok(Value::Bool(verdict))
            },
            Expr::Or(left, right) => {
                let verdict = self.eval(left)?.is_truthy() || self.eval(right)?.is_truthy();
                Ok(Value::Bool(verdict))
            },
            Expr::Compare(op, left, right) => {
                compare(*op, &self.eval(left)?, &self.eval(right)?).map(Value::Bool)
            },
            Expr::In {
                needle,
                haystack,
                negated,
            } => {
                let found = contains(&self.eval(needle)?, &self.eval(haystack)?)?;
                Ok(Value::Bool(found != *negated))
            },
            Expr::Arith(op, left, right) => arith(*op, self.eval(left)?, self.eval(right)?),
            Expr::Call {
                name,
                args,
                keywords,
            } => {
                let args = args.iter().map(|arg| self.eval(arg)).collect::<Result<Vec<_>, _>>()?;
                if keywords.is_empty() {
                    return builtins::call(name, args, self.env);
                }
                let keywords = keywords
                    .iter()
                    .map(|(key, arg)| Ok((key.clone(), self.eval(arg)?)))
                    .collect::<Result<Vec<_>, EvalError>>()?;
                builtins::call_with_keywords(name, args, keywords, self.env)
            },
        }
    }

    fn field(&self, name: &str) -> Result<&str, EvalError> {
        self.record.get(name).ok_or_else(|| EvalError::UnknownField(name.to_string()))
    }

    fn render(&self, template: &Template) -> Result<String, EvalError> {
        let mut out = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => out.push_str(self.field(name)?),
            }
        }
        Ok(out)
    }
}

fn negate(value: Value) -> Result<Value, EvalError> {
    match value {
        Value::Num(n) => Ok(Value::Num(-n)),
        Value::Duration(d) => Ok(Value::Duration(-d)),
        other => Err(EvalError::Type(format!("cannot negate a {}", other.type_name()))),
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    match op {
        CmpOp::Eq => return Ok(left == right),
        CmpOp::Ne => return Ok(left != right),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {},
    }

    let ordering = match (left, right) {
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
        _ => {
            return Err(EvalError::Type(format!(
                "cannot compare {} {op} {}",
                left.type_name(),
                right.type_name()
            )));
        },
    };

    // NaN never orders
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Le => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Ge => ordering.is_ge(),
        CmpOp::Eq => ordering.is_eq(),
        CmpOp::Ne => ordering.is_ne(),
    })
}

fn contains(needle: &Value, haystack: &Value) -> Result<bool, EvalError> {
    match (needle, haystack) {
        (Value::Str(n), Value::Str(h)) => Ok(h.contains(n.as_str())),
        (_, Value::List(items)) => Ok(items.contains(needle)),
        _ => Err(EvalError::Type(format!(
            "cannot test {} in {}",
            needle.type_name(),
            haystack.type_name()
        ))),
    }
}

fn arith(op: ArithOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let overflow = || EvalError::Type(format!("overflow in {op}"));
    match (op, left, right) {
        (ArithOp::Add, Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
        (ArithOp::Sub, Value::Num(a), Value::Num(b)) => Ok(Value::Num(a - b)),
        (ArithOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (ArithOp::Add, Value::Time(t), Value::Duration(d))
        | (ArithOp::Add, Value::Duration(d), Value::Time(t)) => {
            t.checked_add_signed(d).map(Value::Time).ok_or_else(overflow)
        },
        (ArithOp::Sub, Value::Time(t), Value::Duration(d)) => {
            t.checked_sub_signed(d).map(Value::Time).ok_or_else(overflow)
        },
        (ArithOp::Sub, Value::Time(a), Value::Time(b)) => {
            Ok(Value::Duration(a.signed_duration_since(b)))
        },
        (ArithOp::Add, Value::Duration(a), Value::Duration(b)) => {
            a.checked_add(&b).map(Value::Duration).ok_or_else(overflow)
        },
        (ArithOp::Sub, Value::Duration(a), Value::Duration(b)) => {
            a.checked_sub(&b).map(Value::Duration).ok_or_else(overflow)
        },
        (op, left, right) => Err(EvalError::Type(format!(
            "unsupported operands {} {op} {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}
