//! Business logic services
//!
//! Pure orchestration logic that operates on domain models.
//! These services have no I/O dependencies - they operate on
//! data passed in and return results.
//!
//! - [`prioritizer`] - Assign each record the priority of its first matching rule
//! - [`sorter`] - Order records by priority

pub mod prioritizer;
pub mod sorter;

pub use prioritizer::{
    PrioritizeReport, RETAINED_FAILURES, RuleFailure, assign_priority, prioritize,
};
pub use sorter::sort_by_priority;
