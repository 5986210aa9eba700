//! Output formatting for human and JSON modes
//!
//! This module provides the ranked package list that can be rendered either
//! as plain lines (one package per line) or machine-parseable JSON.

use std::io::{self, Write};

use serde::Serialize;

use crate::core::models::{Priority, Record};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One package per line (default)
    #[default]
    Human,
    /// JSON array (machine-readable)
    Json,
}

/// A package and the priority it was given
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPackage {
    /// Package identifier
    pub package: String,
    /// Assigned priority
    pub priority: Priority,
}

/// Packages in output order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    /// Ranked packages, highest priority first
    pub packages: Vec<RankedPackage>,
}

impl Ranking {
    /// Build a ranking from records that are already sorted
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            packages: records
                .iter()
                .map(|r| RankedPackage {
                    package: r.package().to_string(),
                    priority: r.priority(),
                })
                .collect(),
        }
    }

    /// Human-readable lines: the package, optionally followed by its priority
    #[must_use]
    pub fn lines(&self, show_priority: bool) -> Vec<String> {
        self.packages
            .iter()
            .map(|p| {
                if show_priority {
                    format!("{} {}", p.package, p.priority)
                } else {
                    p.package.clone()
                }
            })
            .collect()
    }

    /// Write the ranking to `out`
    pub fn write_to<W: Write>(
        &self,
        out: &mut W,
        mode: OutputMode,
        show_priority: bool,
    ) -> io::Result<()> {
        match mode {
            OutputMode::Human => {
                for line in self.lines(show_priority) {
                    writeln!(out, "{line}")?;
                }
            },
            OutputMode::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            },
        }
        Ok(())
    }

    /// Render the ranking on stdout
    pub fn render(&self, mode: OutputMode, show_priority: bool) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_to(&mut out, mode, show_priority)?;
        out.flush()
    }
}
