//! Package status record
//!
//! A record is one package's status snapshot as reported by the CI status
//! query: a flat set of named string fields plus the priority assigned to it.

use std::collections::HashMap;

use super::Priority;

/// Name of the field that identifies the package
pub const PACKAGE_FIELD: &str = "package";

/// One package's status snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    package: String,
    fields: HashMap<String, String>,
    priority: Option<Priority>,
}

impl Record {
    /// Build a record from its fields
    ///
    /// Returns `None` when there is no `package` field.
    #[must_use]
    pub fn from_fields(fields: HashMap<String, String>) -> Option<Self> {
        let package = fields.get(PACKAGE_FIELD)?.clone();
        Some(Self {
            package,
            fields,
            priority: None,
        })
    }

    /// Build a record from `(name, value)` pairs
    ///
    /// Returns `None` when there is no `package` field.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_fields(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// The package identifier
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Look up a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The assigned priority, or [`Priority::MIN`] if none was assigned yet
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority.unwrap_or(Priority::MIN)
    }

    /// Whether a priority has been assigned
    #[must_use]
    pub const fn is_prioritized(&self) -> bool {
        self.priority.is_some()
    }

    /// Assign the priority
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = Some(priority);
    }
}
