//! Rules file
//!
//! Rules that are used on every run can live in a TOML file instead of
//! being repeated on the command line:
//!
//! ```toml
//! date_format = "%Y-%m-%d %H:%M:%S"
//!
//! [[rule]]
//! priority = 5
//! expr = 're.search(r"kali", "{version}")'
//!
//! [[rule]]
//! priority = 8
//! expr = 'age_days("{date}") > 30'
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::{Rule, RuleError};

/// Errors that can occur when loading a rules file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path of the rules file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The file is not valid TOML for a rules file
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path of the rules file
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// A rule in the file is invalid
    #[error("{}: {source}", .path.display())]
    Rule {
        /// Path of the rules file
        path: PathBuf,
        /// Why the rule was rejected
        source: RuleError,
    },
}

/// Contents of a rules file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Default format for date helpers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    /// Rules, in the order they appear in the file
    #[serde(default, rename = "rule", skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleEntry>,
}

/// One `[[rule]]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Priority given to matching packages (`0..=10`)
    pub priority: i64,
    /// Expression to evaluate
    pub expr: String,
}

impl RulesConfig {
    /// Load a rules file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse rules file content
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build the rules, in file order
    pub fn build_rules(&self) -> Result<Vec<Rule>, RuleError> {
        self.rules.iter().map(|entry| Rule::with_priority(entry.priority, &entry.expr)).collect()
    }

    /// Build the rules, attributing errors to `path`
    pub fn build_rules_from(&self, path: &Path) -> Result<Vec<Rule>, ConfigError> {
        self.build_rules().map_err(|source| ConfigError::Rule {
            path: path.to_path_buf(),
            source,
        })
    }
}
