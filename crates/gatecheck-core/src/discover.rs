//! Candidate bundle discovery over a filesystem root.
//!
//! Discovery is a pure function of current filesystem state: no cursor, no
//! cache. Candidates are visited in lexicographic path order and the first
//! one passing every gate (required files present, JSON parses, not sample,
//! not stale) is selected. Finding nothing is a normal, reportable outcome.

use crate::classify::{classify, Provenance};
use crate::digest::sha256_hex;
use crate::error::GateError;
use crate::types::{FINALISTS_FILE, FINALISTS_SUMMARY_FILE, RANKED_RUNS_FILE};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Filenames a candidate directory must carry to count as a bundle.
#[derive(Debug, Clone)]
pub struct BundleLayout {
    pub ranked_json: String,
    pub finalists_json: String,
    pub finalists_md: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            ranked_json: RANKED_RUNS_FILE.to_string(),
            finalists_json: FINALISTS_FILE.to_string(),
            finalists_md: FINALISTS_SUMMARY_FILE.to_string(),
        }
    }
}

impl BundleLayout {
    fn required(&self) -> [&str; 3] {
        [&self.ranked_json, &self.finalists_json, &self.finalists_md]
    }
}

/// Why a candidate directory was not selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingFiles(Vec<String>),
    MalformedJson { file: String, error: String },
    Sample,
    Stale,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFiles(names) => write!(f, "missing files: {}", names.join(", ")),
            Self::MalformedJson { file, error } => {
                write!(f, "malformed json in {file}: {error}")
            }
            Self::Sample => write!(f, "sample"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One rejected candidate with its specific failure reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    pub path: PathBuf,
    pub reason: RejectReason,
}

/// Outcome of one discovery invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DiscoveryResult {
    pub selected: Option<PathBuf>,
    pub rejected: Vec<RejectedCandidate>,
}

fn truncate_error(error: impl ToString) -> String {
    let mut text = error.to_string();
    if text.len() > 160 {
        let mut cut = 160;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

/// Recursively collect directories containing the target ranked filename.
fn collect_candidates(
    root: &Path,
    target: &str,
    candidates: &mut BTreeSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %root.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_candidates(&path, target, candidates);
        } else if path.file_name().and_then(|n| n.to_str()) == Some(target) {
            if let Some(parent) = path.parent() {
                candidates.insert(parent.to_path_buf());
            }
        }
    }
}

fn parse_json_file(dir: &Path, name: &str) -> Result<(Vec<u8>, Value), RejectReason> {
    let path = dir.join(name);
    let bytes = std::fs::read(&path).map_err(|e| RejectReason::MalformedJson {
        file: name.to_string(),
        error: truncate_error(e),
    })?;
    let value = serde_json::from_slice(&bytes).map_err(|e| RejectReason::MalformedJson {
        file: name.to_string(),
        error: truncate_error(e),
    })?;
    Ok((bytes, value))
}

/// Gate one candidate directory; `Ok(())` means it is selectable.
fn classify_candidate(dir: &Path, layout: &BundleLayout) -> Result<(), RejectReason> {
    let missing: Vec<String> = layout
        .required()
        .iter()
        .filter(|name| !dir.join(name).is_file())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(RejectReason::MissingFiles(missing));
    }

    let (ranked_bytes, ranked) = parse_json_file(dir, &layout.ranked_json)?;
    let (_, finalists) = parse_json_file(dir, &layout.finalists_json)?;

    if classify(&ranked) == Provenance::Sample || classify(&finalists) == Provenance::Sample {
        return Err(RejectReason::Sample);
    }

    // Staleness: the finalists were derived from some bytes; if the recorded
    // digest no longer matches the ranked file, the bundle has drifted.
    if let Some(recorded) = finalists.get("source_sha256").and_then(Value::as_str) {
        if recorded != sha256_hex(&ranked_bytes) {
            return Err(RejectReason::Stale);
        }
    }

    Ok(())
}

/// Enumerate candidate bundles under `root` and select the first acceptable
/// one in lexicographic path order.
///
/// A missing root is a configuration error; an existing root with no
/// candidates yields `selected = None` with an empty rejection list.
pub fn discover(root: &Path, layout: &BundleLayout) -> Result<DiscoveryResult, GateError> {
    if !root.is_dir() {
        return Err(GateError::InvalidRoot(root.display().to_string()));
    }

    let mut candidates = BTreeSet::new();
    collect_candidates(root, &layout.ranked_json, &mut candidates);

    let mut result = DiscoveryResult::default();
    for candidate in candidates {
        if result.selected.is_some() {
            // Later candidates are still classified so the rejection list is
            // complete, but a passing one cannot displace the selection.
            if let Err(reason) = classify_candidate(&candidate, layout) {
                result.rejected.push(RejectedCandidate { path: candidate, reason });
            }
            continue;
        }
        match classify_candidate(&candidate, layout) {
            Ok(()) => {
                tracing::debug!(path = %candidate.display(), "selected candidate bundle");
                result.selected = Some(candidate);
            }
            Err(reason) => {
                tracing::debug!(path = %candidate.display(), reason = %reason, "rejected candidate bundle");
                result.rejected.push(RejectedCandidate { path: candidate, reason });
            }
        }
    }

    Ok(result)
}
