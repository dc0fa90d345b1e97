//! Check-in receipts: the durable, machine-readable output of every run.
//!
//! A receipt is immutable once written; a re-run writes a new file. Two runs
//! over unchanged inputs produce receipts identical in every field except
//! `checked_at`.

use crate::discover::DiscoveryResult;
use crate::error::GateError;
use crate::finding::Finding;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Overall run outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Pass,
    Fail,
}

/// One artifact bound into the receipt by content digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// The check-in-able validation receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReceipt {
    pub status: ReceiptStatus,
    /// Operating mode that produced this receipt ("preflight" | "check-in").
    pub mode: String,
    pub checked_at: DateTime<Utc>,
    /// Exact invocation, for audit reproduction.
    pub command: Vec<String>,
    pub require_real_bundle: bool,
    pub findings: Vec<Finding>,
    pub artifacts: Vec<ArtifactRecord>,
    /// Present when the bundle was resolved via discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryResult>,
    /// Upstream provenance recorded in the ranked payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
}

impl ValidationReceipt {
    pub fn passed(&self) -> bool {
        self.status == ReceiptStatus::Pass
    }
}

/// Serialize a receipt to pretty JSON with a trailing newline.
pub fn render_receipt(receipt: &ValidationReceipt) -> Result<String, GateError> {
    let mut text = serde_json::to_string_pretty(receipt)?;
    text.push('\n');
    Ok(text)
}

/// Write a receipt, creating missing parent directories.
///
/// Same-path writes are last-writer-wins; callers choose distinct output
/// paths per run when historical receipts must be preserved.
pub fn write_receipt(path: &Path, receipt: &ValidationReceipt) -> Result<(), GateError> {
    let text = render_receipt(receipt)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| GateError::write(path, e))?;
        }
    }
    std::fs::write(path, text).map_err(|e| GateError::write(path, e))
}
