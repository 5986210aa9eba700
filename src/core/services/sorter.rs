//! Sorter service - orders records by priority
//!
//! This module contains pure ordering logic with no I/O dependencies.

use crate::core::models::Record;

/// Stable-sort records by descending priority
///
/// Records with equal priority keep their input order.
pub fn sort_by_priority(records: &mut [Record]) {
    records.sort_by(|a, b| b.priority().cmp(&a.priority()));
}
