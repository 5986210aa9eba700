//! Prioritizer service - assigns a priority to each record
//!
//! Rules are tried from highest to lowest priority and the first match
//! wins. A rule that fails to evaluate counts as a non-match; the failure is
//! logged and reported back to the caller, and the walk goes on.

use crate::core::models::{Priority, Record, Rule, RuleSet};
use crate::expr::{Env, EvalError};

/// A rule that could not be evaluated for a record
#[derive(Debug)]
pub struct RuleFailure {
    /// Package of the record being evaluated
    pub package: String,
    /// Priority of the failing rule
    pub priority: Priority,
    /// Expression of the failing rule
    pub rule: String,
    /// What went wrong
    pub error: EvalError,
}

impl std::fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rule {}={} failed for package {}: {}",
            self.priority, self.rule, self.package, self.error
        )
    }
}

/// Failures kept in a report; later ones are only counted
pub const RETAINED_FAILURES: usize = 100;

/// Result of prioritizing a batch of records
#[derive(Debug, Default)]
pub struct PrioritizeReport {
    /// Number of records that matched a rule
    pub matched: usize,
    /// Number of rule evaluations that failed
    pub failed: usize,
    /// The first [`RETAINED_FAILURES`] failures, in the order they happened
    pub failures: Vec<RuleFailure>,
}

/// Assign a priority to one record
///
/// Returns the priority of the matching rule, or `None` when no rule
/// matched and the record got [`Priority::MIN`]. Matches and failures are
/// tallied in `report`.
pub fn assign_priority(
    record: &mut Record,
    rules: &RuleSet,
    env: &Env,
    report: &mut PrioritizeReport,
) -> Option<Priority> {
    let failed_before = report.failed;
    let matched = first_match(record, rules, env, report).map(Rule::priority);
    record.set_priority(matched.unwrap_or(Priority::MIN));
    if matched.is_some() {
        report.matched += 1;
    }
    log::debug!(
        "{} -> priority {} ({} failed rule(s))",
        record.package(),
        record.priority(),
        report.failed - failed_before
    );
    matched
}

/// Assign priorities to every record
pub fn prioritize(records: &mut [Record], rules: &RuleSet, env: &Env) -> PrioritizeReport {
    let mut report = PrioritizeReport::default();
    for record in records.iter_mut() {
        assign_priority(record, rules, env, &mut report);
    }
    report
}

fn first_match<'r>(
    record: &Record,
    rules: &'r RuleSet,
    env: &Env,
    report: &mut PrioritizeReport,
) -> Option<&'r Rule> {
    for rule in rules {
        match rule.matches(record, env) {
            Ok(true) => {
                log::debug!("{} matched {}={}", record.package(), rule.priority(), rule.source());
                return Some(rule);
            },
            Ok(false) => {},
            Err(error) => {
                log::error!(
                    "rule {}={} failed for package {}: {error}",
                    rule.priority(),
                    rule.source(),
                    record.package()
                );
                report.failed += 1;
                if report.failures.len() < RETAINED_FAILURES {
                    report.failures.push(RuleFailure {
                        package: record.package().to_string(),
                        priority: rule.priority(),
                        rule: rule.source().to_string(),
                        error,
                    });
                }
            },
        }
    }
    None
}
