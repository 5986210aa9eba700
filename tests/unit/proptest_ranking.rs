//! Property-based tests for ranking
//!
//! Uses proptest to verify properties that should hold for all inputs.

use proptest::prelude::*;
use sort_by_priority::core::models::Priority;

use crate::common::{packages, rank, record};

fn batch(names: &[String], statuses: &[bool]) -> Vec<sort_by_priority::core::models::Record> {
    names
        .iter()
        .zip(statuses)
        .map(|(name, fail)| {
            let status = if *fail { "fail" } else { "pass" };
            record(&[("package", name.as_str()), ("status", status)])
        })
        .collect()
}

proptest! {
    /// Every input record yields exactly one output line
    #[test]
    fn output_count_matches_input(
        statuses in prop::collection::vec(any::<bool>(), 0..30),
        priority in 0i64..=10
    ) {
        let names: Vec<String> = (0..statuses.len()).map(|i| format!("pkg{i}")).collect();
        let rule = format!(r#"{priority}="{{status}}" == "fail""#);
        let ranked = rank(&batch(&names, &statuses), &[rule.as_str()]);
        prop_assert_eq!(ranked.len(), names.len());
    }

    /// Output is non-increasing in priority and equal priorities keep input order
    #[test]
    fn ranking_is_stable_and_descending(
        statuses in prop::collection::vec(any::<bool>(), 0..30),
        priority in 1i64..=10
    ) {
        let names: Vec<String> = (0..statuses.len()).map(|i| format!("pkg{i:02}")).collect();
        let rule = format!(r#"{priority}="{{status}}" == "fail""#);
        let ranked = rank(&batch(&names, &statuses), &[rule.as_str()]);

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
            if pair[0].1 == pair[1].1 {
                // zero-padded names sort in input order
                prop_assert!(pair[0].0 < pair[1].0);
            }
        }
    }

    /// Assigned priorities stay in range and are either a rule's or the default
    #[test]
    fn priorities_come_from_rules(
        statuses in prop::collection::vec(any::<bool>(), 1..20),
        high in 0i64..=10,
        low in 0i64..=10
    ) {
        let names: Vec<String> = (0..statuses.len()).map(|i| format!("p{i}")).collect();
        let fail_rule = format!(r#"{high}=status == "fail""#);
        let pass_rule = format!(r#"{low}=status == "pass""#);
        let ranked = rank(&batch(&names, &statuses), &[fail_rule.as_str(), pass_rule.as_str()]);

        for (_, value) in ranked {
            prop_assert!(value <= Priority::MAX.value());
            prop_assert!(i64::from(value) == high || i64::from(value) == low);
        }
    }

    /// Without rules the input order is untouched
    #[test]
    fn no_rules_is_identity(count in 0usize..40) {
        let names: Vec<String> = (0..count).map(|i| format!("n{}", count - i)).collect();
        let input: Vec<_> = names.iter().map(|n| record(&[("package", n.as_str())])).collect();
        prop_assert_eq!(packages(&input), names.clone());
        let ranked: Vec<String> = rank(&input, &[]).into_iter().map(|(p, _)| p).collect();
        prop_assert_eq!(ranked, names);
    }

    /// Any integer outside 0..=10 is rejected
    #[test]
    fn out_of_range_priorities_rejected(value in prop_oneof![i64::MIN..0i64, 11i64..i64::MAX]) {
        prop_assert!(Priority::new(value).is_err());
    }
}
