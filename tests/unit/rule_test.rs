//! Tests for rule parsing and the rule set ordering

use sort_by_priority::core::models::{PriorityError, Rule, RuleError, RuleSet};

use crate::common::{env, record};

#[test]
fn test_splits_on_first_equals_only() {
    let rule = Rule::parse(r#"4="{status}" == "fail""#).unwrap();
    assert_eq!(rule.priority().value(), 4);
    assert_eq!(rule.source(), r#""{status}" == "fail""#);
    assert!(rule.compiled().is_ok());
}

#[test]
fn test_missing_delimiter_is_error() {
    let err = Rule::parse("5 package").unwrap_err();
    assert_eq!(err, RuleError::MissingDelimiter("5 package".to_string()));
}

#[test]
fn test_priority_11_is_error() {
    let err = Rule::parse("11=true").unwrap_err();
    assert!(matches!(
        err,
        RuleError::InvalidPriority {
            source: PriorityError::OutOfRange(11),
            ..
        }
    ));
}

#[test]
fn test_priority_minus_one_is_error() {
    let err = Rule::parse("-1=true").unwrap_err();
    assert!(matches!(
        err,
        RuleError::InvalidPriority {
            source: PriorityError::OutOfRange(-1),
            ..
        }
    ));
}

#[test]
fn test_non_integer_priority_is_error() {
    assert!(matches!(Rule::parse("high=true"), Err(RuleError::InvalidPriority { .. })));
}

#[test]
fn test_syntax_error_is_not_fatal() {
    let rule = Rule::parse("3=(((").unwrap();
    assert!(rule.compiled().is_err());
    let rec = record(&[("package", "foo")]);
    assert!(rule.matches(&rec, &env()).is_err());
}

#[test]
fn test_rule_set_sorted_descending_and_stable() {
    let rules = RuleSet::parse(["2=\"a\"", "9=\"b\"", "2=\"c\"", "5=\"d\"", "9=\"e\""]).unwrap();
    let order: Vec<_> = rules.iter().map(|r| (r.priority().value(), r.source())).collect();
    assert_eq!(
        order,
        vec![(9, "\"b\""), (9, "\"e\""), (5, "\"d\""), (2, "\"a\""), (2, "\"c\"")]
    );
}

#[test]
fn test_rule_set_fails_on_any_bad_rule() {
    assert!(RuleSet::parse(["1=true", "oops", "2=true"]).is_err());
}

#[test]
fn test_empty_rule_set() {
    let rules = RuleSet::parse(Vec::<String>::new()).unwrap();
    assert!(rules.is_empty());
    assert_eq!(rules.len(), 0);
}

#[test]
fn test_with_priority_checks_range() {
    assert!(Rule::with_priority(10, "true").is_ok());
    assert!(Rule::with_priority(42, "true").is_err());
}
