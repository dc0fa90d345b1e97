//! Structural validation of artifact payload shapes.
//!
//! Shape and type only; semantics (rank contiguity, provenance binding,
//! count policy) belong to the consistency checker. Field checks run in a
//! fixed order and stop at the first violation so error output is
//! reproducible.

use crate::digest::is_sha256_hex;
use crate::finding::Finding;
use crate::types::{FinalistsPayload, PromotionReceipt, RankedRunsPayload};
use serde_json::Value;

/// Artifact kind labels used in `SchemaInvalid` findings.
pub const KIND_RANKED: &str = "ranked_json";
pub const KIND_FINALISTS: &str = "finalists_json";
pub const KIND_PROMOTION: &str = "bundle_json";

fn invalid(kind: &str, field: &str, expected: &str) -> Finding {
    Finding::schema_invalid(kind, format!("field '{field}' must be {expected}"))
}

fn require_object<'a>(
    kind: &str,
    value: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, Finding> {
    value
        .as_object()
        .ok_or_else(|| Finding::schema_invalid(kind, "payload must be a JSON object"))
}

fn require_non_empty_str(
    kind: &str,
    object: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<(), Finding> {
    match object.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(invalid(kind, field, "a non-empty string")),
    }
}

fn require_positive_int(
    kind: &str,
    object: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<(), Finding> {
    match object.get(field).and_then(Value::as_u64) {
        Some(v) if v > 0 => Ok(()),
        _ => Err(invalid(kind, field, "a positive integer")),
    }
}

fn require_bool(
    kind: &str,
    object: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<(), Finding> {
    match object.get(field) {
        Some(Value::Bool(_)) => Ok(()),
        _ => Err(invalid(kind, field, "a boolean")),
    }
}

/// Validate one ranked-run row. `field_prefix` names the row in findings,
/// e.g. `ranked_runs[3]`.
fn validate_row(kind: &str, field_prefix: &str, value: &Value) -> Result<(), Finding> {
    let row = value
        .as_object()
        .ok_or_else(|| invalid(kind, field_prefix, "a JSON object"))?;

    let field = |name: &str| format!("{field_prefix}.{name}");

    match row.get("config").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => {}
        _ => return Err(invalid(kind, &field("config"), "a non-empty string")),
    }
    for name in ["depth", "n_branches", "aspect_ratio"] {
        match row.get(name).and_then(Value::as_u64) {
            Some(v) if v > 0 => {}
            _ => return Err(invalid(kind, &field(name), "a positive integer")),
        }
    }
    let tok_per_sec = row
        .get("selected_tok_per_sec")
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(kind, &field("selected_tok_per_sec"), "a number"))?;
    if tok_per_sec < 0.0 {
        return Err(invalid(kind, &field("selected_tok_per_sec"), "a number >= 0"));
    }
    if row.get("min_val_bpb").and_then(Value::as_f64).is_none() {
        return Err(invalid(kind, &field("min_val_bpb"), "a number"));
    }
    match row.get("token_budget").and_then(Value::as_u64) {
        Some(v) if v > 0 => {}
        _ => return Err(invalid(kind, &field("token_budget"), "a positive integer")),
    }
    if !matches!(row.get("qualified"), Some(Value::Bool(_))) {
        return Err(invalid(kind, &field("qualified"), "a boolean"));
    }
    match row.get("rank") {
        None | Some(Value::Null) => {}
        Some(value) => match value.as_u64() {
            Some(v) if v > 0 => {}
            _ => return Err(invalid(kind, &field("rank"), "null or a positive integer")),
        },
    }
    match row.get("disqualify_reason") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(_) => {
            return Err(invalid(
                kind,
                &field("disqualify_reason"),
                "null or a non-empty string",
            ))
        }
    }
    Ok(())
}

/// Validate the ranked-runs artifact shape, then decode it.
pub fn validate_ranked_payload(value: &Value) -> Result<RankedRunsPayload, Finding> {
    let kind = KIND_RANKED;
    let object = require_object(kind, value)?;

    if let Some(version) = object.get("schema_version") {
        match version.as_u64() {
            Some(v) if v > 0 => {}
            _ => return Err(invalid(kind, "schema_version", "a positive integer")),
        }
    }
    if let Some(marker) = object.get("is_sample") {
        if !marker.is_boolean() {
            return Err(invalid(kind, "is_sample", "a boolean"));
        }
    }
    if let Some(commit) = object.get("generated_by") {
        if !commit.is_string() {
            return Err(invalid(kind, "generated_by", "a string"));
        }
    }
    let rows = object
        .get("ranked_runs")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(kind, "ranked_runs", "a list of run records"))?;
    if rows.is_empty() {
        return Err(invalid(kind, "ranked_runs", "a non-empty list"));
    }
    for (index, row) in rows.iter().enumerate() {
        validate_row(kind, &format!("ranked_runs[{index}]"), row)?;
    }

    serde_json::from_value(value.clone())
        .map_err(|e| Finding::schema_invalid(kind, format!("failed to decode payload: {e}")))
}

/// Validate the finalists artifact shape, then decode it.
pub fn validate_finalists_payload(value: &Value) -> Result<FinalistsPayload, Finding> {
    let kind = KIND_FINALISTS;
    let object = require_object(kind, value)?;

    require_non_empty_str(kind, object, "source")?;
    match object.get("source_sha256").and_then(Value::as_str) {
        Some(digest) if is_sha256_hex(digest) => {}
        _ => {
            return Err(invalid(
                kind,
                "source_sha256",
                "a 64-character lowercase hex digest",
            ))
        }
    }
    require_positive_int(kind, object, "max_finalists")?;
    let finalists = object
        .get("selected_finalists")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(kind, "selected_finalists", "a list of run records"))?;
    for (index, row) in finalists.iter().enumerate() {
        validate_row(kind, &format!("selected_finalists[{index}]"), row)?;
    }

    serde_json::from_value(value.clone())
        .map_err(|e| Finding::schema_invalid(kind, format!("failed to decode payload: {e}")))
}

/// Validate the optional promotion-bundle receipt shape, then decode it.
pub fn validate_promotion_receipt(value: &Value) -> Result<PromotionReceipt, Finding> {
    let kind = KIND_PROMOTION;
    let object = require_object(kind, value)?;

    require_non_empty_str(kind, object, "status")?;
    require_bool(kind, object, "run_check_in")?;
    match object.get("source_sha256").and_then(Value::as_str) {
        Some(digest) if is_sha256_hex(digest) => {}
        _ => {
            return Err(invalid(
                kind,
                "source_sha256",
                "a 64-character lowercase hex digest",
            ))
        }
    }
    for field in ["input_json", "finalists_json", "finalists_md"] {
        require_non_empty_str(kind, object, field)?;
    }
    if object.get("finalists_count").and_then(Value::as_u64).is_none() {
        return Err(invalid(kind, "finalists_count", "a non-negative integer"));
    }
    let digests = object
        .get("artifact_sha256")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(kind, "artifact_sha256", "an object of hex digests"))?;
    for (name, digest) in digests {
        match digest.as_str() {
            Some(s) if is_sha256_hex(s) => {}
            _ => {
                return Err(invalid(
                    kind,
                    &format!("artifact_sha256.{name}"),
                    "a 64-character lowercase hex digest",
                ))
            }
        }
    }
    match object.get("check_json") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => return Err(invalid(kind, "check_json", "null or a string path")),
    }

    serde_json::from_value(value.clone())
        .map_err(|e| Finding::schema_invalid(kind, format!("failed to decode payload: {e}")))
}
