//! Deterministic cache keys
//!
//! The key is SHA-256 over a canonical JSON payload of the intent, the
//! context, and the intent kind. Canonical means object keys sorted and no
//! whitespace, which `serde_json::Value` gives for free: its map is a
//! `BTreeMap`, so `to_string` on a `Value` is already order-normalized.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::context::QueryContext;
use super::intent::QueryIntent;

/// Derives the cache key for an intent under a context.
pub fn cache_key(intent: &QueryIntent, context: &QueryContext) -> String {
    let intent_value = match intent {
        QueryIntent::Matchup(i) => serde_json::to_value(i),
        QueryIntent::Fantasy(i) => serde_json::to_value(i),
        QueryIntent::WinProb(i) => serde_json::to_value(i),
    }
    .expect("intent serialization is infallible");
    let context_value =
        serde_json::to_value(context).expect("context serialization is infallible");

    let payload: Value = json!({
        "context": context_value,
        "intent": intent_value,
        "query_kind": intent.kind_name(),
    });
    let canonical = payload.to_string();

    let digest = Sha256::digest(canonical.as_bytes());
    to_hex(&digest)
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
