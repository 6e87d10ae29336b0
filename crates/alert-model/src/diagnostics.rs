//! Diagnostic Side-Channel
//!
//! Degraded-default paths report what they substituted through a
//! [`DiagnosticSink`] handed to the normalizer. Sinks are fire-and-forget:
//! nothing they do can change the record being built.

use serde_json::Value;
use std::sync::Mutex;
use tracing::warn;

/// Observation emitted when untrusted input was replaced or worked around
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Severity failed to resolve and was defaulted
    InvalidSeverity { raw: Value, payload: Value },
    /// Status failed to resolve and was defaulted
    InvalidStatus { raw: Value, payload: Value },
    /// No alert name; fingerprint computed from the whole payload
    FingerprintFromPayload,
}

/// Receiver for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn observe(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn observe(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::InvalidSeverity { raw, payload } => {
                warn!(raw = %raw, payload = %payload, "Invalid severity value, setting default");
            }
            Diagnostic::InvalidStatus { raw, payload } => {
                warn!(raw = %raw, payload = %payload, "Invalid status value, setting default");
            }
            Diagnostic::FingerprintFromPayload => {
                warn!("No name to alert, using the entire payload");
            }
        }
    }
}

/// Drops every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn observe(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything observed so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn observe(&self, diagnostic: Diagnostic) {
        // A poisoned lock only means another observer panicked; keep recording.
        let mut seen = match self.seen.lock() {
            Ok(seen) => seen,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.observe(Diagnostic::FingerprintFromPayload);
        sink.observe(Diagnostic::InvalidStatus {
            raw: json!("bogus"),
            payload: json!({"status": "bogus"}),
        });

        let seen = sink.diagnostics();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Diagnostic::FingerprintFromPayload);
        assert!(matches!(seen[1], Diagnostic::InvalidStatus { .. }));
    }

    #[test]
    fn test_tracing_and_null_sinks_accept_everything() {
        TracingSink.observe(Diagnostic::FingerprintFromPayload);
        NullSink.observe(Diagnostic::InvalidSeverity {
            raw: Value::Null,
            payload: json!({}),
        });
    }
}
