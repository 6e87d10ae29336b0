//! Canonical Alert Record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

use crate::error::ModelError;
use crate::severity::Severity;
use crate::status::Status;

/// Environment assigned when a payload does not name one
pub const DEFAULT_ENVIRONMENT: &str = "undefined";

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

/// A normalized alert.
///
/// Built by [`crate::Normalizer`]; treat it as immutable value data. Fields
/// the model does not know about are kept in `extra` and rendered at the same
/// level as the declared ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub severity: Severity,
    /// ISO-8601 timestamp of the latest delivery
    pub last_received: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub is_duplicate: Option<bool>,
    #[serde(default)]
    pub duplicate_reason: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub api_key_ref: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the source pushed the alert rather than it being pulled
    #[serde(default)]
    pub pushed: bool,
    /// Id of the row this alert was loaded from, if any
    #[serde(default, rename = "event_id")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub labels: Map<String, Value>,
    /// Deduplication key
    pub fingerprint: String,
    #[serde(default)]
    pub deleted: bool,
    /// Expiry of the dismissal, or `"forever"`
    #[serde(default)]
    pub dismiss_until: Option<String>,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub provider_type: Option<String>,
    #[serde(default)]
    pub group: bool,
    #[serde(default)]
    pub note: Option<String>,
    /// First trigger time when the alert fired repeatedly
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub is_noisy: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlertRecord {
    /// Full JSON rendering, defaults included
    pub fn to_json(&self) -> Result<Value, ModelError> {
        serde_json::to_value(self).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// Look up a field that was not part of the declared schema
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Equality ignores `lastReceived`, `startedAt` and `event_id`; they vary with
/// the backing store rather than with the alert itself.
impl PartialEq for AlertRecord {
    fn eq(&self, other: &Self) -> bool {
        let AlertRecord {
            id,
            name,
            status,
            severity,
            last_received: _,
            environment,
            is_duplicate,
            duplicate_reason,
            service,
            source,
            api_key_ref,
            message,
            description,
            pushed,
            event_id: _,
            url,
            labels,
            fingerprint,
            deleted,
            dismiss_until,
            dismissed,
            assignee,
            provider_id,
            provider_type,
            group,
            note,
            started_at: _,
            is_noisy,
            extra,
        } = self;

        *id == other.id
            && *name == other.name
            && *status == other.status
            && *severity == other.severity
            && *environment == other.environment
            && *is_duplicate == other.is_duplicate
            && *duplicate_reason == other.duplicate_reason
            && *service == other.service
            && *source == other.source
            && *api_key_ref == other.api_key_ref
            && *message == other.message
            && *description == other.description
            && *pushed == other.pushed
            && *url == other.url
            && *labels == other.labels
            && *fingerprint == other.fingerprint
            && *deleted == other.deleted
            && *dismiss_until == other.dismiss_until
            && *dismissed == other.dismissed
            && *assignee == other.assignee
            && *provider_id == other.provider_id
            && *provider_type == other.provider_type
            && *group == other.group
            && *note == other.note
            && *is_noisy == other.is_noisy
            && *extra == other.extra
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
