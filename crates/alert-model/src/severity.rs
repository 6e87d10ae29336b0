//! Alert Severity Scale

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Alert severity, ordered by rank (critical highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Warning,
    Info,
    Low,
}

/// (severity, canonical name, rank)
const SCALE: [(Severity, &str, u8); 5] = [
    (Severity::Critical, "critical", 5),
    (Severity::High, "high", 4),
    (Severity::Warning, "warning", 3),
    (Severity::Info, "info", 2),
    (Severity::Low, "low", 1),
];

impl Severity {
    /// All severities, highest rank first
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Warning,
        Severity::Info,
        Severity::Low,
    ];

    /// Look up the severity whose rank equals `rank`
    pub fn from_rank(rank: i64) -> Result<Self, ModelError> {
        SCALE
            .iter()
            .find(|(_, _, r)| i64::from(*r) == rank)
            .map(|(severity, _, _)| *severity)
            .ok_or_else(|| ModelError::InvalidSeverity(format!("no severity with rank {rank}")))
    }

    /// Look up the severity by its canonical lowercase name (case-sensitive)
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        SCALE
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(severity, _, _)| *severity)
            .ok_or_else(|| ModelError::InvalidSeverity(name.to_string()))
    }

    /// Numeric rank, 1 (low) to 5 (critical)
    pub fn rank(self) -> u8 {
        self.entry().2
    }

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        self.entry().1
    }

    fn entry(self) -> &'static (Severity, &'static str, u8) {
        // SCALE covers every variant in declaration order
        &SCALE[self as usize]
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
