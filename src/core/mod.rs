//! Core domain logic for sort-by-priority
//!
//! This module contains pure business logic with no I/O dependencies.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (Record, Rule, RuleSet, Priority)
//! - `services/` - Prioritizing and sorting

pub mod models;
pub mod services;
