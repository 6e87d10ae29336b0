//! Alert Normalization and Identity Resolution
//!
//! Turns loosely-structured alert payloads into canonical records with a
//! stable fingerprint, validated severity/status, and resolved dismissal state.

mod config;
mod diagnostics;
mod dismissal;
mod error;
mod fingerprint;
mod normalizer;
mod record;
mod requests;
mod severity;
mod status;

pub use self::config::{NormalizerConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, NullSink, TracingSink};
pub use dismissal::{parse_dismiss_until, resolve as resolve_dismissed, DismissedFlag, DISMISS_FOREVER};
pub use error::{ModelError, Result};
pub use fingerprint::{sha256_hex, FingerprintResolver, MAX_FINGERPRINT_LEN};
pub use normalizer::{Normalizer, RawAlert};
pub use record::{AlertRecord, DEFAULT_ENVIRONMENT};
pub use requests::{DeleteRequest, DismissRequest, EnrichRequest};
pub use severity::Severity;
pub use status::Status;
