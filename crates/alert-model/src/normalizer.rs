//! Alert Normalization Pipeline
//!
//! Turns a raw payload into an [`AlertRecord`] in four stages, always in this
//! order:
//!
//! 1. `coerce_root`: severity/status coercion, assignee lookup, legacy keys
//! 2. `normalize_fields`: fingerprint, deleted, lastReceived, dismissed
//! 3. `construct`: typed record, unknown fields kept verbatim
//! 4. `enforce_dismissal`: a dismissed alert is always suppressed
//!
//! Later stages read values produced by earlier ones, so the order is part of
//! the contract.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::NormalizerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::dismissal::{self, DismissedFlag};
use crate::error::ModelError;
use crate::fingerprint::{FingerprintResolver, MAX_FINGERPRINT_LEN};
use crate::record::AlertRecord;
use crate::severity::Severity;
use crate::status::Status;

/// Raw field mapping as decoded from a JSON payload
pub type RawAlert = Map<String, Value>;

const ASSIGNEES_KEY: &str = "assignees";
const LEGACY_DELETED_AT_KEY: &str = "deletedAt";

/// Fields whose `null` means "use the default"
const NULL_DEFAULTED: [&str; 5] = ["source", "labels", "pushed", "group", "isNoisy"];

#[derive(Debug, Clone, Copy)]
enum Shape {
    Text,
    Flag,
    TextList,
    Object,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Shape::Text => value.is_string(),
            Shape::Flag => value.is_boolean(),
            Shape::TextList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Shape::Object => value.is_object(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Text => "expected a string",
            Shape::Flag => "expected a boolean",
            Shape::TextList => "expected a list of strings",
            Shape::Object => "expected an object",
        }
    }
}

/// Declared fields checked before typed construction; `null` is always allowed
const DECLARED_SHAPES: [(&str, Shape); 21] = [
    ("id", Shape::Text),
    ("name", Shape::Text),
    ("lastReceived", Shape::Text),
    ("environment", Shape::Text),
    ("isDuplicate", Shape::Flag),
    ("duplicateReason", Shape::Text),
    ("service", Shape::Text),
    ("source", Shape::TextList),
    ("apiKeyRef", Shape::Text),
    ("message", Shape::Text),
    ("description", Shape::Text),
    ("pushed", Shape::Flag),
    ("event_id", Shape::Text),
    ("labels", Shape::Object),
    ("dismissUntil", Shape::Text),
    ("assignee", Shape::Text),
    ("providerId", Shape::Text),
    ("providerType", Shape::Text),
    ("group", Shape::Flag),
    ("note", Shape::Text),
    ("startedAt", Shape::Text),
];

/// Builds canonical alert records from raw payloads
#[derive(Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    fingerprints: FingerprintResolver,
    sink: Arc<dyn DiagnosticSink>,
}

impl Normalizer {
    /// Create a normalizer reporting degraded defaults to `sink`
    pub fn new(config: NormalizerConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let fingerprints =
            FingerprintResolver::new(config.fingerprint_max_len.min(MAX_FINGERPRINT_LEN));
        Self {
            config,
            fingerprints,
            sink,
        }
    }

    /// Configuration this normalizer was built with
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize against the current UTC time
    pub fn normalize(&self, raw: RawAlert) -> Result<AlertRecord, ModelError> {
        self.normalize_at(raw, Utc::now())
    }

    /// Normalize a JSON value, which must be an object
    pub fn normalize_value(&self, raw: Value) -> Result<AlertRecord, ModelError> {
        match raw {
            Value::Object(map) => self.normalize(map),
            other => Err(ModelError::InvalidField {
                field: "payload".to_string(),
                value: other.to_string(),
                reason: "expected a JSON object".to_string(),
            }),
        }
    }

    /// Normalize with `now` as the reference instant for defaults and dismissal expiry
    pub fn normalize_at(
        &self,
        mut raw: RawAlert,
        now: DateTime<Utc>,
    ) -> Result<AlertRecord, ModelError> {
        let last_received = self.coerce_root(&mut raw, now)?;
        self.normalize_fields(&mut raw, &last_received, now)?;
        let record = self.construct(raw)?;
        Ok(enforce_dismissal(record))
    }

    /// Stage 1: degrade bad severity/status to defaults, resolve the assignee,
    /// drop legacy keys. Returns the effective `lastReceived`.
    fn coerce_root(&self, raw: &mut RawAlert, now: DateTime<Utc>) -> Result<String, ModelError> {
        let severity = match raw.get("severity").map(coerce_severity) {
            Some(Ok(severity)) => severity,
            failed => {
                if let Some(Err(err)) = failed {
                    debug!("Severity rejected: {}", err);
                }
                self.sink.observe(Diagnostic::InvalidSeverity {
                    raw: raw.get("severity").cloned().unwrap_or(Value::Null),
                    payload: Value::Object(raw.clone()),
                });
                Severity::Info
            }
        };
        raw.insert("severity".into(), Value::String(severity.as_str().into()));

        let status = match raw.get("status").and_then(Value::as_str).map(Status::from_name) {
            Some(Ok(status)) => status,
            _ => {
                self.sink.observe(Diagnostic::InvalidStatus {
                    raw: raw.get("status").cloned().unwrap_or(Value::Null),
                    payload: Value::Object(raw.clone()),
                });
                Status::Firing
            }
        };
        raw.insert("status".into(), Value::String(status.as_str().into()));

        let last_received = resolve_last_received(raw.get("lastReceived"), now)?;

        match raw.remove(ASSIGNEES_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Object(table)) if table.is_empty() => {}
            Some(Value::Object(table)) => {
                let assignee = lookup_assignee(&table, &last_received);
                debug!(last_received = %last_received, hit = assignee.is_some(), "Assignee lookup");
                raw.insert("assignee".into(), assignee.unwrap_or(Value::Null));
            }
            Some(other) => {
                return Err(ModelError::InvalidField {
                    field: ASSIGNEES_KEY.to_string(),
                    value: other.to_string(),
                    reason: "expected an object keyed by lastReceived".to_string(),
                });
            }
        }

        raw.remove(LEGACY_DELETED_AT_KEY);
        Ok(last_received)
    }

    /// Stage 2: per-field derivation from the coerced mapping
    fn normalize_fields(
        &self,
        raw: &mut RawAlert,
        last_received: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ModelError> {
        // Fingerprint first: it hashes the mapping as delivered, before any
        // defaults below are written into it.
        let explicit = match raw.get("fingerprint") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => return Err(invalid("fingerprint", other, "expected a string")),
        };
        let name = raw.get("name").and_then(Value::as_str);
        let fingerprint = self
            .fingerprints
            .resolve(explicit.as_deref(), name, raw, self.sink.as_ref());

        let deleted = match raw.get("deleted") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            // Legacy encoding: the lastReceived values for which the alert was deleted
            Some(Value::Array(deleted_at)) => {
                deleted_at.iter().any(|v| v.as_str() == Some(last_received))
            }
            Some(other) => {
                return Err(invalid("deleted", other, "expected a boolean or a list of timestamps"))
            }
        };

        let dismiss_until = match raw.get("dismissUntil") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => return Err(invalid("dismissUntil", other, "expected a string")),
        };
        let flag = DismissedFlag::from_value(raw.get("dismissed").unwrap_or(&Value::Null))?;
        let dismissed = dismissal::resolve(flag, dismiss_until, now)?;

        raw.insert("fingerprint".into(), Value::String(fingerprint));
        raw.insert("deleted".into(), Value::Bool(deleted));
        raw.insert("lastReceived".into(), Value::String(last_received.to_string()));
        raw.insert("dismissed".into(), Value::Bool(dismissed));

        if raw.get("environment").map_or(true, Value::is_null) {
            raw.insert(
                "environment".into(),
                Value::String(self.config.default_environment.clone()),
            );
        }
        for key in NULL_DEFAULTED {
            if raw.get(key).is_some_and(Value::is_null) {
                raw.remove(key);
            }
        }
        normalize_url(raw)?;

        let fingerprint = raw
            .get("fingerprint")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        debug!(
            fingerprint,
            deleted,
            dismissed,
            "Fields normalized"
        );
        Ok(())
    }

    /// Stage 3: typed construction
    fn construct(&self, raw: RawAlert) -> Result<AlertRecord, ModelError> {
        for required in ["id", "name"] {
            if raw.get(required).map_or(true, Value::is_null) {
                return Err(ModelError::MissingField(required));
            }
        }

        for (field, shape) in DECLARED_SHAPES {
            if let Some(value) = raw.get(field) {
                if !value.is_null() && !shape.accepts(value) {
                    return Err(invalid(field, value, shape.describe()));
                }
            }
        }

        serde_json::from_value(Value::Object(raw)).map_err(|e| ModelError::InvalidField {
            field: "record".to_string(),
            value: "<payload>".to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default(), Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Stage 4: dismissal is the final authority on status
fn enforce_dismissal(mut record: AlertRecord) -> AlertRecord {
    if record.dismissed {
        if record.status != Status::Suppressed {
            debug!(from = %record.status, "Dismissed alert, forcing status to suppressed");
        }
        record.status = Status::Suppressed;
    }
    record
}

/// Integers resolve by rank, strings by name; anything else is rejected
fn coerce_severity(value: &Value) -> Result<Severity, ModelError> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(rank) => Severity::from_rank(rank),
            None => Err(ModelError::InvalidSeverity(n.to_string())),
        },
        Value::String(name) => Severity::from_name(name),
        other => Err(ModelError::InvalidSeverity(other.to_string())),
    }
}

fn resolve_last_received(value: Option<&Value>, now: DateTime<Utc>) -> Result<String, ModelError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(default_last_received(now)),
        Some(other) => Err(invalid("lastReceived", other, "expected an ISO-8601 string")),
    }
}

/// ISO-8601 with microseconds and an explicit `+00:00` offset
fn default_last_received(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Try the raw timestamp first, then its `...Z` millisecond and `+00:00` renderings
fn lookup_assignee(table: &Map<String, Value>, last_received: &str) -> Option<Value> {
    let mut keys = vec![last_received.to_string()];
    if let Ok(parsed) = DateTime::parse_from_rfc3339(last_received) {
        let utc = parsed.with_timezone(&Utc);
        keys.push(utc.to_rfc3339_opts(SecondsFormat::Millis, true));
        keys.push(utc.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }

    keys.iter()
        .find_map(|key| table.get(key))
        .filter(|v| !v.is_null())
        .cloned()
}

/// Only absolute http(s) URLs are accepted; an empty string means no URL
fn normalize_url(raw: &mut RawAlert) -> Result<(), ModelError> {
    if raw.get("url").and_then(Value::as_str) == Some("") {
        raw.insert("url".into(), Value::Null);
    }

    match raw.get("url") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) => match Url::parse(s) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
            Ok(_) => Err(invalid("url", &raw["url"], "expected an absolute http(s) URL")),
            Err(e) => Err(invalid("url", &raw["url"], &e.to_string())),
        },
        Some(other) => Err(invalid("url", other, "expected a string")),
    }
}

fn invalid(field: &str, value: &Value, reason: &str) -> ModelError {
    ModelError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
