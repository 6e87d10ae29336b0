//! Delete / dismiss / enrich request bodies
//!
//! Plain pass-through shapes: serde enforces required fields and primitive
//! types, nothing is derived.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub fingerprint: String,
    pub last_received: String,
    #[serde(default)]
    pub restore: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissRequest {
    pub fingerprint: String,
    pub dismiss_until: String,
    pub dismiss_comment: String,
    #[serde(default)]
    pub restore: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichRequest {
    pub fingerprint: String,
    /// Enrichment key to string value
    pub enrichments: BTreeMap<String, String>,
}
