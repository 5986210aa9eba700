//! Domain models for sort-by-priority
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Record`] - one package's status snapshot
//! - [`Rule`] - "packages matching this expression get this priority"
//! - [`RuleSet`] - all rules, highest priority first
//! - [`Priority`] - a ranking level in `0..=10`

mod priority;
mod record;
mod rule;

pub use priority::{Priority, PriorityError};
pub use record::{PACKAGE_FIELD, Record};
pub use rule::{Rule, RuleError, RuleSet};
