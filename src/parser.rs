// Guarded JSON ingestion for captured response bodies
//
// Malformed, oversized or irrelevant payloads are expected traffic, not
// errors: every failure collapses to None and nothing crosses this boundary.

use crate::config::{HarvestConfig, PrefilterConfig};
use serde_json::Value;

/// Anti-hijacking prefix some services prepend to JSON responses
const ANTI_HIJACK_PREFIX: &str = ")]}'";

/// Attempt to parse one response body under the configured limits.
pub fn try_parse(raw: &str, config: &HarvestConfig) -> Option<Value> {
    if raw.is_empty() || raw.len() > config.body_limit_bytes {
        return None;
    }
    if let Some(prefilter) = &config.prefilter {
        if !passes_prefilter(raw, prefilter) {
            return None;
        }
    }
    serde_json::from_str(strip_anti_hijack(raw.trim())).ok()
}

fn strip_anti_hijack(text: &str) -> &str {
    match text.strip_prefix(ANTI_HIJACK_PREFIX) {
        Some(rest) => rest.strip_prefix(',').unwrap_or(rest),
        None => text,
    }
}

// Inspects only the leading window so irrelevant traffic is dropped without
// scanning (or parsing) the whole body.
fn passes_prefilter(text: &str, prefilter: &PrefilterConfig) -> bool {
    if prefilter.needles.is_empty() {
        return true;
    }
    let window: String = text.chars().take(prefilter.window).collect();
    let window = window.to_lowercase();
    prefilter
        .needles
        .iter()
        .any(|needle| window.contains(&needle.to_lowercase()))
}
