//! Helper functions callable from rule expressions
//!
//! | Function                              | Result    |
//! |---------------------------------------|-----------|
//! | `starts_with(s, prefix)`, `startswith`| bool      |
//! | `ends_with(s, suffix)`, `endswith`    | bool      |
//! | `contains(s, sub)`                    | bool      |
//! | `matches(s, pattern)`                 | bool      |
//! | `re.search(pattern, s)`               | bool      |
//! | `re.match(pattern, s)`                | bool      |
//! | `re.fullmatch(pattern, s)`            | bool      |
//! | `lower(s)`, `upper(s)`, `strip(s)`    | string    |
//! | `len(x)`, `int(s)`, `num(s)`          | number    |
//! | `date(s[, fmt])`, `strptime`, `now()` | timestamp |
//! | `weeks(n)` .. `seconds(n)`            | duration  |
//! | `timedelta(days=n, hours=n, ...)`     | duration  |
//! | `age_days(s[, fmt])`, `age_hours`     | number    |
//!
//! Prefix and suffix arguments may also be lists, matching any element.
//!
//! Rules written against Python's `datetime` module keep working:
//! `datetime.datetime.now()`, `datetime.datetime.strptime(s, fmt)` and
//! `datetime.timedelta(days=30)` are aliases of the helpers above.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::{Env, EvalError, Value};

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_WEEK: f64 = 604_800.0;

/// `timedelta` parameters in positional order, with their length in seconds
const TIMEDELTA_UNITS: [(&str, f64); 7] = [
    ("days", SECONDS_PER_DAY),
    ("seconds", 1.0),
    ("microseconds", 1e-6),
    ("milliseconds", 1e-3),
    ("minutes", SECONDS_PER_MINUTE),
    ("hours", SECONDS_PER_HOUR),
    ("weeks", SECONDS_PER_WEEK),
];

/// Whether `name` prefixes dotted function names (`re.search`)
#[must_use]
pub fn is_namespace(name: &str) -> bool {
    matches!(name, "re" | "datetime")
}

/// Call a helper function that was given keyword arguments
pub fn call_with_keywords(
    name: &str,
    args: Vec<Value>,
    keywords: Vec<(String, Value)>,
    env: &Env,
) -> Result<Value, EvalError> {
    if keywords.is_empty() {
        return call(name, args, env);
    }
    match name {
        "timedelta" | "datetime.timedelta" => timedelta(name, args, keywords),
        _ => Err(EvalError::Type(format!("{name}() takes no keyword arguments"))),
    }
}

/// Call a helper function by name
pub fn call(name: &str, args: Vec<Value>, env: &Env) -> Result<Value, EvalError> {
    match name {
        "starts_with" | "startswith" => {
            let [s, prefix] = exact::<2>(name, args)?;
            affix(name, s, prefix, |s, p| s.starts_with(p))
        },
        "ends_with" | "endswith" => {
            let [s, suffix] = exact::<2>(name, args)?;
            affix(name, s, suffix, |s, p| s.ends_with(p))
        },
        "contains" => {
            let [s, sub] = exact::<2>(name, args)?;
            Ok(Value::Bool(text(name, s)?.contains(&text(name, sub)?)))
        },
        "matches" => {
            let [s, pattern] = exact::<2>(name, args)?;
            search(name, &text(name, pattern)?, &text(name, s)?, Anchor::None, env)
        },
        "re.search" => {
            let [pattern, s] = exact::<2>(name, args)?;
            search(name, &text(name, pattern)?, &text(name, s)?, Anchor::None, env)
        },
        "re.match" => {
            let [pattern, s] = exact::<2>(name, args)?;
            search(name, &text(name, pattern)?, &text(name, s)?, Anchor::Start, env)
        },
        "re.fullmatch" => {
            let [pattern, s] = exact::<2>(name, args)?;
            search(name, &text(name, pattern)?, &text(name, s)?, Anchor::Both, env)
        },
        "lower" => {
            let [s] = exact::<1>(name, args)?;
            Ok(Value::Str(text(name, s)?.to_lowercase()))
        },
        "upper" => {
            let [s] = exact::<1>(name, args)?;
            Ok(Value::Str(text(name, s)?.to_uppercase()))
        },
        "strip" | "trim" => {
            let [s] = exact::<1>(name, args)?;
            Ok(Value::Str(text(name, s)?.trim().to_string()))
        },
        "len" => {
            let [x] = exact::<1>(name, args)?;
            length(name, &x)
        },
        "int" | "num" => {
            let [x] = exact::<1>(name, args)?;
            number(name, x).map(Value::Num)
        },
        "now" | "datetime.datetime.now" => {
            let [] = exact::<0>(name, args)?;
            Ok(Value::Time(env.now()))
        },
        "date" | "strptime" | "datetime.datetime.strptime" => {
            timestamp(name, args, env).map(Value::Time)
        },
        "timedelta" | "datetime.timedelta" => timedelta(name, args, Vec::new()),
        "weeks" => span(name, args, SECONDS_PER_WEEK),
        "days" => span(name, args, SECONDS_PER_DAY),
        "hours" => span(name, args, SECONDS_PER_HOUR),
        "minutes" => span(name, args, SECONDS_PER_MINUTE),
        "seconds" => span(name, args, 1.0),
        "age_days" => age(name, args, env, SECONDS_PER_DAY),
        "age_hours" => age(name, args, env, SECONDS_PER_HOUR),
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

/// Parse a timestamp, accepting date-only formats as midnight
pub fn parse_time(value: &str, format: &str) -> Result<NaiveDateTime, EvalError> {
    NaiveDateTime::parse_from_str(value, format)
        .or_else(|_| NaiveDate::parse_from_str(value, format).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| EvalError::Date {
            value: value.to_string(),
            format: format.to_string(),
        })
}

fn exact<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], EvalError> {
    args.try_into().map_err(|args: Vec<Value>| EvalError::Arity {
        function: name.to_string(),
        expected: N.to_string(),
        got: args.len(),
    })
}

/// One required argument plus an optional second one
fn one_or_two(name: &str, args: Vec<Value>) -> Result<(Value, Option<Value>), EvalError> {
    let got = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(first), second, None) => Ok((first, second)),
        _ => Err(EvalError::Arity {
            function: name.to_string(),
            expected: "1 or 2".to_string(),
            got,
        }),
    }
}

fn text(name: &str, value: Value) -> Result<String, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::Type(format!(
            "{name}() expects a string, got {}",
            other.type_name()
        ))),
    }
}

fn affix(
    name: &str,
    subject: Value,
    pattern: Value,
    test: impl Fn(&str, &str) -> bool,
) -> Result<Value, EvalError> {
    let subject = text(name, subject)?;
    let found = match pattern {
        Value::List(items) => {
            let mut any = false;
            for item in items {
                any |= test(&subject, &text(name, item)?);
            }
            any
        },
        other => test(&subject, &text(name, other)?),
    };
    Ok(Value::Bool(found))
}

#[derive(Clone, Copy)]
enum Anchor {
    None,
    Start,
    Both,
}

fn search(
    name: &str,
    pattern: &str,
    subject: &str,
    anchor: Anchor,
    env: &Env,
) -> Result<Value, EvalError> {
    let source = match anchor {
        Anchor::None => pattern.to_string(),
        Anchor::Start => format!("^(?:{pattern})"),
        Anchor::Both => format!("^(?:{pattern})$"),
    };
    let regex = env.regex(&source).map_err(|e| EvalError::Regex {
        function: name.to_string(),
        source: e,
    })?;
    Ok(Value::Bool(regex.is_match(subject)))
}

#[allow(clippy::cast_precision_loss)]
fn length(name: &str, value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Str(s) => Ok(Value::Num(s.chars().count() as f64)),
        Value::List(items) => Ok(Value::Num(items.len() as f64)),
        other => Err(EvalError::Type(format!(
            "{name}() expects a string or list, got {}",
            other.type_name()
        ))),
    }
}

fn number(name: &str, value: Value) -> Result<f64, EvalError> {
    match value {
        Value::Num(n) => Ok(n),
        Value::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| EvalError::Type(format!("{name}() cannot convert {s:?} to a number"))),
        other => Err(EvalError::Type(format!(
            "{name}() expects a string or number, got {}",
            other.type_name()
        ))),
    }
}

fn timestamp(name: &str, args: Vec<Value>, env: &Env) -> Result<NaiveDateTime, EvalError> {
    let (value, format) = one_or_two(name, args)?;
    let format = match format {
        Some(f) => text(name, f)?,
        None => env.date_format().to_string(),
    };
    match value {
        Value::Time(t) => Ok(t),
        other => parse_time(&text(name, other)?, &format),
    }
}

fn span(name: &str, args: Vec<Value>, unit_seconds: f64) -> Result<Value, EvalError> {
    let [amount] = exact::<1>(name, args)?;
    duration(name, number(name, amount)? * unit_seconds)
}

/// `timedelta(days, seconds, microseconds, milliseconds, minutes, hours, weeks)`
fn timedelta(
    name: &str,
    args: Vec<Value>,
    keywords: Vec<(String, Value)>,
) -> Result<Value, EvalError> {
    if args.len() > TIMEDELTA_UNITS.len() {
        return Err(EvalError::Arity {
            function: name.to_string(),
            expected: format!("at most {}", TIMEDELTA_UNITS.len()),
            got: args.len(),
        });
    }
    let positional = args.len();
    let mut seconds = 0.0;
    for ((_, unit), amount) in TIMEDELTA_UNITS.iter().zip(args) {
        seconds += number(name, amount)? * unit;
    }
    for (key, amount) in keywords {
        let Some(index) = TIMEDELTA_UNITS.iter().position(|(unit, _)| *unit == key) else {
            return Err(EvalError::Type(format!("{name}() got an unexpected keyword '{key}'")));
        };
        if index < positional {
            return Err(EvalError::Type(format!("{name}() got multiple values for '{key}'")));
        }
        seconds += number(name, amount)? * TIMEDELTA_UNITS[index].1;
    }
    duration(name, seconds)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn duration(name: &str, seconds: f64) -> Result<Value, EvalError> {
    let millis = seconds * 1000.0;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(EvalError::Type(format!("{name}() duration out of range")));
    }
    TimeDelta::try_milliseconds(millis.round() as i64)
        .map(Value::Duration)
        .ok_or_else(|| EvalError::Type(format!("{name}() duration out of range")))
}

#[allow(clippy::cast_precision_loss)]
fn age(name: &str, args: Vec<Value>, env: &Env, unit_seconds: f64) -> Result<Value, EvalError> {
    let then = timestamp(name, args, env)?;
    let elapsed = env.now().signed_duration_since(then);
    Ok(Value::Num(elapsed.num_milliseconds() as f64 / (unit_seconds * 1000.0)))
}
