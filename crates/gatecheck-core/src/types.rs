//! Artifact payload types, bundle layout names, and the canonical pilot grid.

use crate::classify::{classify, Provenance};
use crate::digest::sha256_hex;
use crate::finding::Finding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fixed logical filenames within a promotion bundle directory.
pub const RANKED_RUNS_FILE: &str = "pilot_ranked_runs.json";
pub const FINALISTS_FILE: &str = "stage2_finalists.json";
pub const FINALISTS_SUMMARY_FILE: &str = "stage2_finalists.md";
pub const PROMOTION_BUNDLE_FILE: &str = "stage2_promotion_bundle.json";

/// Default receipt filename for strict check-in.
pub const CHECK_RECEIPT_FILE: &str = "pilot_bundle_check.json";
/// Default blocked-report filename emitted on failure.
pub const BLOCKED_REPORT_FILE: &str = "pilot_bundle_check_blocked.md";

/// Default receipt filename for preflight runs.
pub const PREFLIGHT_RECEIPT_FILE: &str = "pilot_bundle_preflight.json";
/// Default blocked-report filename for failing preflight runs.
pub const PREFLIGHT_BLOCKED_FILE: &str = "pilot_bundle_preflight_blocked.md";

/// Finalist count policy defaults.
pub const DEFAULT_MIN_FINALISTS: usize = 2;
pub const DEFAULT_MAX_FINALISTS: usize = 3;

/// One depth x branch configuration in the canonical pilot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTarget {
    pub label: &'static str,
    pub depth: u64,
    pub n_branches: u64,
    pub aspect_ratio: u64,
}

/// The full canonical configuration grid evaluated by the pilot stage.
pub const PILOT_GRID: &[GridTarget] = &[
    GridTarget { label: "12x1", depth: 12, n_branches: 1, aspect_ratio: 64 },
    GridTarget { label: "6x2", depth: 6, n_branches: 2, aspect_ratio: 128 },
    GridTarget { label: "4x3", depth: 4, n_branches: 3, aspect_ratio: 192 },
    GridTarget { label: "3x4", depth: 3, n_branches: 4, aspect_ratio: 256 },
    GridTarget { label: "2x5", depth: 2, n_branches: 5, aspect_ratio: 384 },
    GridTarget { label: "2x6", depth: 2, n_branches: 6, aspect_ratio: 384 },
    GridTarget { label: "1x10", depth: 1, n_branches: 10, aspect_ratio: 768 },
];

/// One evaluated configuration row inside a ranked-runs artifact.
///
/// Invariant: exactly one of `rank` / `disqualify_reason` is set, matching
/// the `qualified` flag. Enforced by the consistency checker, not serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRun {
    pub config: String,
    pub depth: u64,
    pub n_branches: u64,
    pub aspect_ratio: u64,
    /// Throughput metric selected by the sweep.
    pub selected_tok_per_sec: f64,
    /// Quality metric: minimum validation bits-per-byte.
    pub min_val_bpb: f64,
    pub token_budget: u64,
    pub qualified: bool,
    pub rank: Option<u64>,
    pub disqualify_reason: Option<String>,
}

/// Payload of `pilot_ranked_runs.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRunsPayload {
    /// Optional payload schema version stamped by the sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u64>,
    /// Explicit fixture marker. Never inferred from the filename.
    #[serde(default)]
    pub is_sample: bool,
    /// Upstream provenance: commit of the sweep that generated this artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    pub ranked_runs: Vec<RankedRun>,
}

/// Payload of `stage2_finalists.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalistsPayload {
    /// Path of the ranked-runs artifact this selection was derived from.
    pub source: String,
    /// Digest of the source artifact's bytes at selection time.
    pub source_sha256: String,
    pub max_finalists: u64,
    pub selected_finalists: Vec<RankedRun>,
}

/// Payload of the optional `stage2_promotion_bundle.json` receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionReceipt {
    pub status: String,
    pub run_check_in: bool,
    pub source_sha256: String,
    pub input_json: String,
    pub finalists_json: String,
    pub finalists_md: String,
    pub finalists_count: u64,
    /// Recorded digests keyed by logical artifact name.
    pub artifact_sha256: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_json: Option<String>,
}

/// One loaded artifact, bound to the bytes read by this validation run.
///
/// Owned by the run that produced it and never mutated; re-validation loads
/// a fresh descriptor.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    /// Logical name within the bundle (e.g. "ranked_json").
    pub name: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    /// Parsed payload for JSON artifacts, `None` for documents.
    pub payload: Option<serde_json::Value>,
    pub sha256: String,
    pub is_sample: bool,
}

impl ArtifactDescriptor {
    /// Read, digest, optionally parse, and classify one artifact file.
    pub fn load(name: &str, path: &Path, parse_json: bool) -> Result<Self, Finding> {
        let bytes = std::fs::read(path).map_err(|e| {
            Finding::missing_artifact(name, format!("missing {} file: {} ({e})", name, path.display()))
        })?;
        let payload = if parse_json {
            let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                Finding::schema_invalid(name, format!("malformed JSON in {}: {e}", path.display()))
            })?;
            Some(value)
        } else {
            None
        };
        let is_sample = payload
            .as_ref()
            .map(|value| classify(value) == Provenance::Sample)
            .unwrap_or(false);
        let sha256 = sha256_hex(&bytes);
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            bytes,
            payload,
            sha256,
            is_sample,
        })
    }

    /// Document body as UTF-8, lossy for non-UTF-8 bytes.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Look up a canonical grid target by its config label.
pub fn grid_target(label: &str) -> Option<&'static GridTarget> {
    PILOT_GRID.iter().find(|target| target.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn grid_has_seven_unique_labels() {
        let mut labels: Vec<&str> = PILOT_GRID.iter().map(|t| t.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 7);
        assert_eq!(grid_target("12x1").unwrap().depth, 12);
        assert!(grid_target("9x9").is_none());
    }

    #[test]
    fn descriptor_load_binds_digest_and_sample_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(RANKED_RUNS_FILE);
        fs::write(&path, br#"{"is_sample": true, "ranked_runs": []}"#).unwrap();

        let descriptor = ArtifactDescriptor::load("ranked_json", &path, true).unwrap();
        assert!(descriptor.is_sample);
        assert_eq!(descriptor.sha256, crate::digest::sha256_hex(&descriptor.bytes));
        assert!(descriptor.payload.is_some());
    }

    #[test]
    fn descriptor_load_reports_missing_file_as_finding() {
        let temp = TempDir::new().unwrap();
        let err = ArtifactDescriptor::load(
            "finalists_json",
            &temp.path().join("absent.json"),
            true,
        )
        .unwrap_err();
        assert_eq!(err.kind, crate::finding::FindingKind::MissingArtifact);
        assert_eq!(err.artifact.as_deref(), Some("finalists_json"));
    }

    #[test]
    fn descriptor_load_reports_parse_error_as_finding() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FINALISTS_FILE);
        fs::write(&path, b"{not json").unwrap();
        let err = ArtifactDescriptor::load("finalists_json", &path, true).unwrap_err();
        assert_eq!(err.kind, crate::finding::FindingKind::SchemaInvalid);
    }
}
