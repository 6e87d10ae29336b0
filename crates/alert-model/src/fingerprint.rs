//! Fingerprint Resolution
//!
//! The fingerprint is the deduplication key for an alert: every delivery of
//! the same logical alert must resolve to the same string.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Longest fingerprint kept on a record
pub const MAX_FINGERPRINT_LEN: usize = 255;

/// Derives fingerprints from explicit values, alert names, or whole payloads
#[derive(Debug, Clone, Copy)]
pub struct FingerprintResolver {
    max_len: usize,
}

impl FingerprintResolver {
    /// Create a resolver that truncates explicit fingerprints to `max_len` characters
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Truncation limit for explicit fingerprints
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Resolve the fingerprint for a payload.
    ///
    /// An explicit, non-empty fingerprint is truncated and returned unhashed.
    /// Otherwise the SHA-256 of the alert name is used, falling back to the
    /// SHA-256 of the serialized payload when there is no name.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        name: Option<&str>,
        payload: &Map<String, Value>,
        sink: &dyn DiagnosticSink,
    ) -> String {
        if let Some(fingerprint) = explicit.filter(|f| !f.is_empty()) {
            return truncate_chars(fingerprint, self.max_len);
        }

        match name.filter(|n| !n.is_empty()) {
            Some(name) => sha256_hex(name.as_bytes()),
            None => {
                sink.observe(Diagnostic::FingerprintFromPayload);
                let serialized = canonical_payload(payload);
                debug!(len = serialized.len(), "Fingerprinting full payload");
                sha256_hex(serialized.as_bytes())
            }
        }
    }
}

impl Default for FingerprintResolver {
    fn default() -> Self {
        Self::new(MAX_FINGERPRINT_LEN)
    }
}

/// Hex-encoded SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compact JSON with keys in sorted order at every level
fn canonical_payload(payload: &Map<String, Value>) -> String {
    Value::Object(sorted_map(payload)).to_string()
}

fn sorted_map(map: &Map<String, Value>) -> Map<String, Value> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|k| (k.clone(), sorted_value(&map[k.as_str()])))
        .collect()
}

fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sorted_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        leaf => leaf.clone(),
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, NullSink};
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_name_hash() {
        let resolver = FingerprintResolver::default();
        let fp = resolver.resolve(None, Some("Disk full"), &Map::new(), &NullSink);
        assert_eq!(fp, sha256_hex(b"Disk full"));
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_explicit_fingerprint_truncated_not_hashed() {
        let resolver = FingerprintResolver::default();
        let long = "f".repeat(300);
        let fp = resolver.resolve(Some(&long), Some("ignored"), &Map::new(), &NullSink);
        assert_eq!(fp.len(), MAX_FINGERPRINT_LEN);
        assert_eq!(fp, "f".repeat(255));

        let short = resolver.resolve(Some("1234"), Some("ignored"), &Map::new(), &NullSink);
        assert_eq!(short, "1234");
    }

    #[test]
    fn test_truncation_counts_characters() {
        let resolver = FingerprintResolver::new(3);
        let fp = resolver.resolve(Some("ééééé"), None, &Map::new(), &NullSink);
        assert_eq!(fp, "ééé");
    }

    #[test]
    fn test_payload_fallback_emits_diagnostic() {
        let sink = CollectingSink::new();
        let resolver = FingerprintResolver::default();
        let raw = payload(json!({"id": "1", "status": "firing", "count": 3}));

        let fp = resolver.resolve(None, None, &raw, &sink);
        assert_eq!(fp.len(), 64);
        assert_eq!(sink.diagnostics(), vec![Diagnostic::FingerprintFromPayload]);
    }

    #[test]
    fn test_payload_fallback_deterministic_across_key_order() {
        let resolver = FingerprintResolver::default();
        let a = payload(json!({"id": "1", "labels": {"a": 1, "b": [true, null]}}));
        let mut b = Map::new();
        b.insert("labels".into(), json!({"b": [true, null], "a": 1}));
        b.insert("id".into(), json!("1"));

        assert_eq!(
            resolver.resolve(None, Some(""), &a, &NullSink),
            resolver.resolve(None, None, &b, &NullSink)
        );
    }

    #[test]
    fn test_empty_explicit_falls_back_to_name() {
        let resolver = FingerprintResolver::default();
        let fp = resolver.resolve(Some(""), Some("x"), &Map::new(), &NullSink);
        assert_eq!(fp, sha256_hex(b"x"));
    }
}
