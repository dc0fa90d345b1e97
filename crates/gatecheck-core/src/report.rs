//! Human-readable evidence and blocked reports.
//!
//! When a run fails, the blocked report is itself checked-in-able evidence:
//! it records what was attempted, with which inputs, and exactly why it was
//! blocked. Console output alone is never the audit trail.

use crate::error::GateError;
use crate::receipt::ValidationReceipt;
use std::path::Path;

/// Render a markdown report for a receipt. Failing receipts render as a
/// blocked report, passing receipts as evidence.
pub fn render_report(receipt: &ValidationReceipt) -> String {
    let title = if receipt.passed() {
        "# Promotion Gate Evidence"
    } else {
        "# Promotion Gate Blocked"
    };
    let status = if receipt.passed() { "pass" } else { "fail" };

    let mut lines = vec![
        title.to_string(),
        String::new(),
        format!("- status: `{status}`"),
        format!("- mode: `{}`", receipt.mode),
        format!("- checked_at: `{}`", receipt.checked_at.to_rfc3339()),
        format!("- require_real_bundle: `{}`", receipt.require_real_bundle),
    ];
    if let Some(commit) = &receipt.generated_by {
        lines.push(format!("- generated_by: `{commit}`"));
    }

    lines.push(String::new());
    lines.push("## Invocation".to_string());
    lines.push(String::new());
    lines.push("```".to_string());
    lines.push(receipt.command.join(" "));
    lines.push("```".to_string());

    if !receipt.findings.is_empty() {
        lines.push(String::new());
        lines.push("## Blocking findings".to_string());
        lines.push(String::new());
        for finding in &receipt.findings {
            match &finding.artifact {
                Some(artifact) => lines.push(format!(
                    "- **{}** (`{artifact}`): {}",
                    finding.kind, finding.message
                )),
                None => lines.push(format!("- **{}**: {}", finding.kind, finding.message)),
            }
        }
    }

    if !receipt.artifacts.is_empty() {
        lines.push(String::new());
        lines.push("## Artifacts".to_string());
        lines.push(String::new());
        for artifact in &receipt.artifacts {
            lines.push(format!(
                "- `{}`: `{}` (sha256 `{}`)",
                artifact.name,
                artifact.path.display(),
                artifact.sha256
            ));
        }
    }

    if let Some(discovery) = &receipt.discovery {
        lines.push(String::new());
        lines.push("## Discovery".to_string());
        lines.push(String::new());
        match &discovery.selected {
            Some(path) => lines.push(format!("- selected: `{}`", path.display())),
            None => lines.push("- selected: none".to_string()),
        }
        for rejected in &discovery.rejected {
            lines.push(format!(
                "- rejected `{}`: {}",
                rejected.path.display(),
                rejected.reason
            ));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Write the report, creating missing parent directories.
pub fn write_report(path: &Path, receipt: &ValidationReceipt) -> Result<(), GateError> {
    let text = render_report(receipt);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| GateError::write(path, e))?;
        }
    }
    std::fs::write(path, text).map_err(|e| GateError::write(path, e))
}
