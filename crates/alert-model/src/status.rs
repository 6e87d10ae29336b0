//! Alert Lifecycle Status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Lifecycle state of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Active alert
    Firing,
    /// Alert has been resolved
    Resolved,
    /// Acknowledged but not resolved
    Acknowledged,
    /// Hidden from active attention, e.g. dismissed
    Suppressed,
    /// No data yet
    Pending,
}

impl Status {
    /// Every status, in declaration order
    pub const ALL: [Status; 5] = [
        Status::Firing,
        Status::Resolved,
        Status::Acknowledged,
        Status::Suppressed,
        Status::Pending,
    ];

    /// Exact match against the canonical names
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == name)
            .ok_or_else(|| ModelError::InvalidStatus(name.to_string()))
    }

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Firing => "firing",
            Status::Resolved => "resolved",
            Status::Acknowledged => "acknowledged",
            Status::Suppressed => "suppressed",
            Status::Pending => "pending",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
