//! Check-in orchestration: dry-run, preflight, and strict modes over the
//! same validator components.
//!
//! All modes share path resolution (explicit, directory, or discovery) so no
//! entry point grows its own validation logic. Per-artifact problems become
//! receipt findings; only configuration errors abort before I/O.

use crate::consistency::{
    check_finalists, check_grid, check_promotion_receipt, check_ranked_rows,
    check_source_binding, check_summary_markdown, ReceiptContext,
};
use crate::discover::{discover, BundleLayout, DiscoveryResult};
use crate::error::GateError;
use crate::finding::{Finding, FindingKind};
use crate::receipt::{write_receipt, ArtifactRecord, ReceiptStatus, ValidationReceipt};
use crate::report::write_report;
use crate::schema::{
    validate_finalists_payload, validate_promotion_receipt, validate_ranked_payload,
};
use crate::types::{ArtifactDescriptor, DEFAULT_MIN_FINALISTS, PILOT_GRID, PROMOTION_BUNDLE_FILE};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Operating mode for a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Existence and parseability only; cheap early-exit diagnostics.
    Preflight,
    /// Full schema + consistency + sample + digest binding.
    CheckIn,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::CheckIn => "check-in",
        }
    }
}

/// How the bundle's artifact paths are obtained.
#[derive(Debug, Clone)]
pub enum BundleSource {
    /// All three artifact paths supplied explicitly.
    Explicit {
        ranked_json: PathBuf,
        finalists_json: PathBuf,
        finalists_md: PathBuf,
    },
    /// A bundle directory; artifact names come from the layout.
    Directory(PathBuf),
    /// Discover the bundle under a search root.
    Auto { root: PathBuf },
}

/// Promotion-bundle receipt location.
#[derive(Debug, Clone)]
pub enum BundleJsonSpec {
    /// Default filename next to the ranked artifact.
    Auto,
    Path(PathBuf),
}

/// One validation invocation, fully described.
#[derive(Debug, Clone)]
pub struct CheckInConfig {
    pub source: BundleSource,
    pub layout: BundleLayout,
    pub bundle_json: Option<BundleJsonSpec>,
    /// Reject sample/fixture artifacts. Default for all check-in paths;
    /// disabled only for fixture-based regression testing.
    pub require_real_bundle: bool,
    pub min_finalists: usize,
    /// When set, the finalists payload must record exactly this value.
    pub max_finalists: Option<usize>,
    /// Require the full canonical grid to appear exactly once.
    pub require_full_grid: bool,
    /// Exact invocation recorded on the receipt.
    pub command: Vec<String>,
}

impl CheckInConfig {
    pub fn new(source: BundleSource) -> Self {
        Self {
            source,
            layout: BundleLayout::default(),
            bundle_json: None,
            require_real_bundle: true,
            min_finalists: DEFAULT_MIN_FINALISTS,
            max_finalists: None,
            require_full_grid: false,
            command: Vec::new(),
        }
    }

    /// Flag combinations that make the invocation meaningless.
    fn validate(&self) -> Result<(), GateError> {
        if let Some(max) = self.max_finalists {
            if self.min_finalists > max {
                return Err(GateError::ConflictingFlags(format!(
                    "min_finalists ({}) must be <= max_finalists ({max})",
                    self.min_finalists
                )));
            }
        }
        if self.min_finalists == 0 {
            return Err(GateError::ConflictingFlags(
                "min_finalists must be >= 1".to_string(),
            ));
        }
        if matches!(self.bundle_json, Some(BundleJsonSpec::Auto))
            && matches!(self.source, BundleSource::Explicit { .. })
        {
            return Err(GateError::ConflictingFlags(
                "bundle_json=auto requires a bundle directory or discovery root".to_string(),
            ));
        }
        Ok(())
    }
}

/// Concrete artifact paths after resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBundle {
    pub ranked_json: PathBuf,
    pub finalists_json: PathBuf,
    pub finalists_md: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_json: Option<PathBuf>,
}

/// Outcome of path resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    Bundle {
        bundle: ResolvedBundle,
        discovery: Option<DiscoveryResult>,
    },
    /// Discovery ran and found nothing acceptable.
    Empty {
        root: PathBuf,
        discovery: DiscoveryResult,
    },
}

fn resolve_bundle_json(
    spec: &Option<BundleJsonSpec>,
    bundle_dir: &Path,
) -> Option<PathBuf> {
    match spec {
        None => None,
        Some(BundleJsonSpec::Auto) => Some(bundle_dir.join(PROMOTION_BUNDLE_FILE)),
        Some(BundleJsonSpec::Path(path)) => {
            if path.is_absolute() {
                Some(path.clone())
            } else {
                Some(bundle_dir.join(path))
            }
        }
    }
}

/// Resolve artifact paths from the configured source.
pub fn resolve(config: &CheckInConfig) -> Result<Resolution, GateError> {
    config.validate()?;
    match &config.source {
        BundleSource::Explicit {
            ranked_json,
            finalists_json,
            finalists_md,
        } => {
            let bundle_json = match &config.bundle_json {
                Some(BundleJsonSpec::Path(path)) => Some(path.clone()),
                // validate() already rejected Auto for explicit sources.
                _ => None,
            };
            Ok(Resolution::Bundle {
                bundle: ResolvedBundle {
                    ranked_json: ranked_json.clone(),
                    finalists_json: finalists_json.clone(),
                    finalists_md: finalists_md.clone(),
                    bundle_json,
                },
                discovery: None,
            })
        }
        BundleSource::Directory(dir) => Ok(Resolution::Bundle {
            bundle: ResolvedBundle {
                ranked_json: dir.join(&config.layout.ranked_json),
                finalists_json: dir.join(&config.layout.finalists_json),
                finalists_md: dir.join(&config.layout.finalists_md),
                bundle_json: resolve_bundle_json(&config.bundle_json, dir),
            },
            discovery: None,
        }),
        BundleSource::Auto { root } => {
            let discovery = discover(root, &config.layout)?;
            match discovery.selected.clone() {
                None => Ok(Resolution::Empty {
                    root: root.clone(),
                    discovery,
                }),
                Some(dir) => Ok(Resolution::Bundle {
                    bundle: ResolvedBundle {
                        ranked_json: dir.join(&config.layout.ranked_json),
                        finalists_json: dir.join(&config.layout.finalists_json),
                        finalists_md: dir.join(&config.layout.finalists_md),
                        bundle_json: resolve_bundle_json(&config.bundle_json, &dir),
                    },
                    discovery: Some(discovery),
                }),
            }
        }
    }
}

/// Resolved invocation plan, reported without validating bundle contents.
#[derive(Debug, Serialize)]
pub struct DryRunPlan {
    pub mode: String,
    pub require_real_bundle: bool,
    pub min_finalists: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_finalists: Option<usize>,
    pub require_full_grid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryResult>,
}

/// Resolve paths and settings without reading the selected bundle.
pub fn dry_run(config: &CheckInConfig, mode: Mode) -> Result<DryRunPlan, GateError> {
    let (resolved, discovery) = match resolve(config)? {
        Resolution::Bundle { bundle, discovery } => (Some(bundle), discovery),
        Resolution::Empty { discovery, .. } => (None, Some(discovery)),
    };
    Ok(DryRunPlan {
        mode: mode.as_str().to_string(),
        require_real_bundle: config.require_real_bundle,
        min_finalists: config.min_finalists,
        max_finalists: config.max_finalists,
        require_full_grid: config.require_full_grid,
        resolved,
        discovery,
    })
}

fn load_artifact(
    name: &str,
    path: &Path,
    parse_json: bool,
    findings: &mut Vec<Finding>,
    artifacts: &mut Vec<ArtifactRecord>,
) -> Option<ArtifactDescriptor> {
    match ArtifactDescriptor::load(name, path, parse_json) {
        Ok(descriptor) => {
            artifacts.push(ArtifactRecord {
                name: descriptor.name.clone(),
                path: descriptor.path.clone(),
                sha256: descriptor.sha256.clone(),
            });
            Some(descriptor)
        }
        Err(finding) => {
            findings.push(finding);
            None
        }
    }
}

/// Run one validation pass and assemble the receipt. Pure with respect to
/// outputs: nothing is written; see [`run_with_outputs`].
pub fn run_check(config: &CheckInConfig, mode: Mode) -> Result<ValidationReceipt, GateError> {
    let mut findings: Vec<Finding> = Vec::new();
    let mut artifacts: Vec<ArtifactRecord> = Vec::new();
    let discovery_out: Option<DiscoveryResult>;
    let mut generated_by: Option<String> = None;

    match resolve(config)? {
        Resolution::Empty { root, discovery } => {
            findings.push(Finding::new(
                FindingKind::DiscoveryEmpty,
                format!(
                    "no acceptable bundle found under {}; discovery rejected {} candidate(s)",
                    root.display(),
                    discovery.rejected.len()
                ),
            ));
            discovery_out = Some(discovery);
        }
        Resolution::Bundle { bundle, discovery } => {
            discovery_out = discovery;

            let ranked = load_artifact(
                "ranked_json",
                &bundle.ranked_json,
                true,
                &mut findings,
                &mut artifacts,
            );
            let finalists = load_artifact(
                "finalists_json",
                &bundle.finalists_json,
                true,
                &mut findings,
                &mut artifacts,
            );
            let summary = load_artifact(
                "finalists_md",
                &bundle.finalists_md,
                false,
                &mut findings,
                &mut artifacts,
            );
            let promotion = bundle.bundle_json.as_ref().and_then(|path| {
                load_artifact("bundle_json", path, true, &mut findings, &mut artifacts)
            });

            // Sample gating applies to every mode that loads payloads: a
            // fixture must never be silently accepted as real evidence.
            if config.require_real_bundle {
                for descriptor in [&ranked, &finalists, &promotion].into_iter().flatten() {
                    if descriptor.is_sample {
                        findings.push(Finding::sample_rejected(descriptor.name.clone()));
                    }
                }
            }

            if mode == Mode::CheckIn {
                let ranked_payload = ranked.as_ref().and_then(|descriptor| {
                    let value = descriptor.payload.as_ref()?;
                    match validate_ranked_payload(value) {
                        Ok(payload) => Some(payload),
                        Err(finding) => {
                            findings.push(finding);
                            None
                        }
                    }
                });
                let finalists_payload = finalists.as_ref().and_then(|descriptor| {
                    let value = descriptor.payload.as_ref()?;
                    match validate_finalists_payload(value) {
                        Ok(payload) => Some(payload),
                        Err(finding) => {
                            findings.push(finding);
                            None
                        }
                    }
                });

                if let Some(payload) = &ranked_payload {
                    generated_by = payload.generated_by.clone();
                    findings.extend(check_ranked_rows(&payload.ranked_runs));
                    if config.require_full_grid {
                        findings.extend(check_grid(&payload.ranked_runs, PILOT_GRID));
                    }
                }

                if let Some(payload) = &finalists_payload {
                    if let Some(max) = config.max_finalists {
                        if payload.max_finalists != max as u64 {
                            findings.push(Finding::consistency(format!(
                                "finalists payload records max_finalists={}, expected {max}",
                                payload.max_finalists
                            )));
                        }
                    }
                    if let Some(descriptor) = &ranked {
                        findings.extend(check_source_binding(
                            payload,
                            &bundle.ranked_json,
                            &descriptor.sha256,
                        ));
                    }
                    if let Some(ranked_payload) = &ranked_payload {
                        findings.extend(check_finalists(
                            payload,
                            &ranked_payload.ranked_runs,
                            config.min_finalists,
                        ));
                    }
                    if let Some(descriptor) = &summary {
                        findings.extend(check_summary_markdown(
                            &descriptor.text(),
                            &payload.selected_finalists,
                        ));
                    }
                }

                if let Some(descriptor) = &promotion {
                    let decoded = descriptor
                        .payload
                        .as_ref()
                        .map(|value| validate_promotion_receipt(value));
                    match decoded {
                        Some(Ok(receipt)) => {
                            if let (Some(ranked_desc), Some(finalists_desc), Some(summary_desc), Some(payload)) =
                                (&ranked, &finalists, &summary, &finalists_payload)
                            {
                                let ctx = ReceiptContext {
                                    ranked_path: &bundle.ranked_json,
                                    finalists_path: &bundle.finalists_json,
                                    summary_path: &bundle.finalists_md,
                                    ranked_sha256: &ranked_desc.sha256,
                                    finalists_sha256: &finalists_desc.sha256,
                                    summary_sha256: &summary_desc.sha256,
                                    finalists_count: payload.selected_finalists.len(),
                                    strict: true,
                                };
                                findings.extend(check_promotion_receipt(&receipt, &ctx));
                            }
                        }
                        Some(Err(finding)) => findings.push(finding),
                        None => {}
                    }
                }
            }
        }
    }

    let status = if findings.is_empty() {
        ReceiptStatus::Pass
    } else {
        ReceiptStatus::Fail
    };
    tracing::info!(
        mode = mode.as_str(),
        status = ?status,
        findings = findings.len(),
        "validation run complete"
    );

    Ok(ValidationReceipt {
        status,
        mode: mode.as_str().to_string(),
        checked_at: Utc::now(),
        command: config.command.clone(),
        require_real_bundle: config.require_real_bundle,
        findings,
        artifacts,
        discovery: discovery_out,
        generated_by,
    })
}

/// Where a run's durable outputs go.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub receipt_json: Option<PathBuf>,
    /// Blocked-report markdown, written only when the run fails.
    pub blocked_md: Option<PathBuf>,
}

/// Run a validation pass and emit the configured receipt/report files.
pub fn run_with_outputs(
    config: &CheckInConfig,
    mode: Mode,
    outputs: &OutputPaths,
) -> Result<ValidationReceipt, GateError> {
    let receipt = run_check(config, mode)?;
    if let Some(path) = &outputs.receipt_json {
        write_receipt(path, &receipt)?;
    }
    if !receipt.passed() {
        if let Some(path) = &outputs.blocked_md {
            write_report(path, &receipt)?;
        }
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha256_hex;
    use crate::types::{
        FinalistsPayload, RankedRun, RankedRunsPayload, FINALISTS_FILE, FINALISTS_SUMMARY_FILE,
        RANKED_RUNS_FILE,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn run(config: &str, depth: u64, branches: u64, aspect: u64, rank: Option<u64>) -> RankedRun {
        RankedRun {
            config: config.to_string(),
            depth,
            n_branches: branches,
            aspect_ratio: aspect,
            selected_tok_per_sec: 1_500_000.0 - depth as f64 * 1000.0,
            min_val_bpb: 0.91 + depth as f64 / 1000.0,
            token_budget: 200_000_000,
            qualified: rank.is_some(),
            rank,
            disqualify_reason: rank.map_or(Some("too slow".to_string()), |_| None),
        }
    }

    fn scenario_rows() -> Vec<RankedRun> {
        vec![
            run("12x1", 12, 1, 64, Some(1)),
            run("2x5", 2, 5, 384, Some(2)),
            run("1x10", 1, 10, 768, None),
        ]
    }

    fn summary_for(finalists: &[RankedRun]) -> String {
        let mut lines = vec![
            "## Stage 2 Finalists".to_string(),
            String::new(),
            "Selected finalists:".to_string(),
            String::new(),
            "## Stage 2 depth/branch flags".to_string(),
            String::new(),
        ];
        for row in finalists {
            lines.push(format!(
                "- `{}`: `--depth {} --n-branches {} --aspect-ratio {}`",
                row.config, row.depth, row.n_branches, row.aspect_ratio
            ));
        }
        lines.join("\n")
    }

    /// Write a complete valid bundle; returns the bundle directory.
    fn write_valid_bundle(dir: &Path, is_sample: bool) {
        fs::create_dir_all(dir).unwrap();
        let payload = RankedRunsPayload {
            schema_version: Some(1),
            is_sample,
            generated_by: Some("3f2a9cd".to_string()),
            ranked_runs: scenario_rows(),
        };
        let ranked_path = dir.join(RANKED_RUNS_FILE);
        fs::write(&ranked_path, serde_json::to_vec_pretty(&payload).unwrap()).unwrap();

        let ranked_bytes = fs::read(&ranked_path).unwrap();
        let finalists: Vec<RankedRun> = payload
            .ranked_runs
            .iter()
            .filter(|row| row.qualified)
            .cloned()
            .collect();
        let finalists_payload = FinalistsPayload {
            source: ranked_path.display().to_string(),
            source_sha256: sha256_hex(&ranked_bytes),
            max_finalists: 3,
            selected_finalists: finalists.clone(),
        };
        fs::write(
            dir.join(FINALISTS_FILE),
            serde_json::to_vec_pretty(&finalists_payload).unwrap(),
        )
        .unwrap();
        fs::write(dir.join(FINALISTS_SUMMARY_FILE), summary_for(&finalists)).unwrap();
    }

    fn dir_config(dir: &Path) -> CheckInConfig {
        let mut config = CheckInConfig::new(BundleSource::Directory(dir.to_path_buf()));
        config.command = vec!["gatecheck".to_string(), "check-in".to_string()];
        config
    }

    #[test]
    fn strict_check_in_passes_for_a_valid_bundle() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        let receipt = run_check(&dir_config(temp.path()), Mode::CheckIn).unwrap();
        assert!(receipt.passed(), "findings: {:?}", receipt.findings);
        assert_eq!(receipt.artifacts.len(), 3);
        assert_eq!(receipt.generated_by.as_deref(), Some("3f2a9cd"));
    }

    #[test]
    fn stale_source_digest_fails_with_provenance_mismatch() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        // Rewrite the ranked artifact with different bytes but valid content.
        let ranked_path = temp.path().join(RANKED_RUNS_FILE);
        let payload: serde_json::Value =
            serde_json::from_slice(&fs::read(&ranked_path).unwrap()).unwrap();
        fs::write(&ranked_path, serde_json::to_vec(&payload).unwrap()).unwrap();

        let receipt = run_check(&dir_config(temp.path()), Mode::CheckIn).unwrap();
        assert!(!receipt.passed());
        assert!(receipt
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::ProvenanceMismatch));
    }

    #[test]
    fn fabricated_finalist_fails_naming_the_identity() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        let finalists_path = temp.path().join(FINALISTS_FILE);
        let mut payload: FinalistsPayload =
            serde_json::from_slice(&fs::read(&finalists_path).unwrap()).unwrap();
        payload.selected_finalists[1] = run("3x4", 3, 4, 256, Some(2));
        fs::write(&finalists_path, serde_json::to_vec_pretty(&payload).unwrap()).unwrap();

        let receipt = run_check(&dir_config(temp.path()), Mode::CheckIn).unwrap();
        assert!(!receipt.passed());
        assert!(receipt
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::ConsistencyViolation && f.message.contains("'3x4'")));
    }

    #[test]
    fn sample_bundle_is_rejected_unless_overridden() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), true);

        let receipt = run_check(&dir_config(temp.path()), Mode::CheckIn).unwrap();
        assert!(receipt
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::SampleRejected
                && f.artifact.as_deref() == Some("ranked_json")));

        let mut override_config = dir_config(temp.path());
        override_config.require_real_bundle = false;
        let receipt = run_check(&override_config, Mode::CheckIn).unwrap();
        assert!(receipt.passed(), "findings: {:?}", receipt.findings);
        assert!(!receipt.require_real_bundle);
    }

    #[test]
    fn rerun_is_idempotent_modulo_timestamp() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        let config = dir_config(temp.path());

        let first = run_check(&config, Mode::CheckIn).unwrap();
        let second = run_check(&config, Mode::CheckIn).unwrap();

        let mut a = serde_json::to_value(&first).unwrap();
        let mut b = serde_json::to_value(&second).unwrap();
        a.as_object_mut().unwrap().remove("checked_at");
        b.as_object_mut().unwrap().remove("checked_at");
        assert_eq!(a, b);
    }

    #[test]
    fn preflight_reports_missing_artifacts_without_semantics() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        fs::remove_file(temp.path().join(FINALISTS_SUMMARY_FILE)).unwrap();

        let receipt = run_check(&dir_config(temp.path()), Mode::Preflight).unwrap();
        assert!(!receipt.passed());
        assert!(receipt
            .findings
            .iter()
            .all(|f| f.kind == FindingKind::MissingArtifact));
        assert_eq!(receipt.mode, "preflight");
    }

    #[test]
    fn preflight_passes_on_a_parseable_bundle() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        let receipt = run_check(&dir_config(temp.path()), Mode::Preflight).unwrap();
        assert!(receipt.passed());
    }

    #[test]
    fn auto_mode_attaches_discovery_to_the_receipt() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(&temp.path().join("run_a"), false);
        let mut config = CheckInConfig::new(BundleSource::Auto {
            root: temp.path().to_path_buf(),
        });
        config.command = vec!["gatecheck".to_string(), "check-in".to_string()];

        let receipt = run_check(&config, Mode::CheckIn).unwrap();
        assert!(receipt.passed(), "findings: {:?}", receipt.findings);
        let discovery = receipt.discovery.unwrap();
        assert_eq!(discovery.selected.unwrap(), temp.path().join("run_a"));
    }

    #[test]
    fn empty_discovery_root_fails_with_discovery_empty() {
        let temp = TempDir::new().unwrap();
        let config = CheckInConfig::new(BundleSource::Auto {
            root: temp.path().to_path_buf(),
        });
        let receipt = run_check(&config, Mode::CheckIn).unwrap();
        assert!(!receipt.passed());
        assert_eq!(receipt.findings.len(), 1);
        assert_eq!(receipt.findings[0].kind, FindingKind::DiscoveryEmpty);
        assert!(receipt.discovery.unwrap().rejected.is_empty());
    }

    #[test]
    fn full_grid_requirement_flags_partial_sweeps() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        let mut config = dir_config(temp.path());
        config.require_full_grid = true;
        let receipt = run_check(&config, Mode::CheckIn).unwrap();
        assert!(!receipt.passed());
        assert!(receipt
            .findings
            .iter()
            .any(|f| f.message.contains("incomplete grid")));
    }

    #[test]
    fn conflicting_flags_abort_before_io() {
        let mut config = CheckInConfig::new(BundleSource::Explicit {
            ranked_json: "a.json".into(),
            finalists_json: "b.json".into(),
            finalists_md: "c.md".into(),
        });
        config.bundle_json = Some(BundleJsonSpec::Auto);
        assert!(matches!(
            run_check(&config, Mode::CheckIn),
            Err(GateError::ConflictingFlags(_))
        ));

        let mut config = CheckInConfig::new(BundleSource::Directory("x".into()));
        config.min_finalists = 5;
        config.max_finalists = Some(3);
        assert!(matches!(
            run_check(&config, Mode::CheckIn),
            Err(GateError::ConflictingFlags(_))
        ));
    }

    #[test]
    fn dry_run_resolves_paths_without_validating() {
        let temp = TempDir::new().unwrap();
        // No files exist; dry-run must still resolve.
        let config = dir_config(&temp.path().join("pending"));
        let plan = dry_run(&config, Mode::CheckIn).unwrap();
        let resolved = plan.resolved.unwrap();
        assert_eq!(
            resolved.ranked_json,
            temp.path().join("pending").join(RANKED_RUNS_FILE)
        );
        assert!(plan.discovery.is_none());
    }

    #[test]
    fn failing_run_emits_receipt_and_blocked_report() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), true);
        let out = TempDir::new().unwrap();
        let outputs = OutputPaths {
            receipt_json: Some(out.path().join("check.json")),
            blocked_md: Some(out.path().join("blocked.md")),
        };
        let receipt =
            run_with_outputs(&dir_config(temp.path()), Mode::CheckIn, &outputs).unwrap();
        assert!(!receipt.passed());
        assert!(out.path().join("check.json").is_file());
        let blocked = fs::read_to_string(out.path().join("blocked.md")).unwrap();
        assert!(blocked.starts_with("# Promotion Gate Blocked"));
        assert!(blocked.contains("SampleRejected"));
    }

    #[test]
    fn passing_run_skips_the_blocked_report() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);
        let out = TempDir::new().unwrap();
        let outputs = OutputPaths {
            receipt_json: Some(out.path().join("check.json")),
            blocked_md: Some(out.path().join("blocked.md")),
        };
        let receipt =
            run_with_outputs(&dir_config(temp.path()), Mode::CheckIn, &outputs).unwrap();
        assert!(receipt.passed());
        assert!(out.path().join("check.json").is_file());
        assert!(!out.path().join("blocked.md").exists());
    }

    #[test]
    fn promotion_receipt_cross_check_catches_drifted_digests() {
        let temp = TempDir::new().unwrap();
        write_valid_bundle(temp.path(), false);

        let ranked_path = temp.path().join(RANKED_RUNS_FILE);
        let finalists_path = temp.path().join(FINALISTS_FILE);
        let summary_path = temp.path().join(FINALISTS_SUMMARY_FILE);
        let promotion = serde_json::json!({
            "status": "ok",
            "run_check_in": false,
            "source_sha256": sha256_hex(&fs::read(&ranked_path).unwrap()),
            "input_json": ranked_path.display().to_string(),
            "finalists_json": finalists_path.display().to_string(),
            "finalists_md": summary_path.display().to_string(),
            "finalists_count": 2,
            "artifact_sha256": {
                "finalists_json": sha256_hex(&fs::read(&finalists_path).unwrap()),
                // Wrong digest for the summary document.
                "finalists_md": "0".repeat(64),
            },
        });
        fs::write(
            temp.path().join(PROMOTION_BUNDLE_FILE),
            serde_json::to_vec_pretty(&promotion).unwrap(),
        )
        .unwrap();

        let mut config = dir_config(temp.path());
        config.bundle_json = Some(BundleJsonSpec::Auto);
        let receipt = run_check(&config, Mode::CheckIn).unwrap();
        assert!(!receipt.passed());
        assert!(receipt
            .findings
            .iter()
            .any(|f| f.message.contains("artifact_sha256.finalists_md")));
        // The strict-mode run_check_in requirement is also flagged.
        assert!(receipt
            .findings
            .iter()
            .any(|f| f.message.contains("run_check_in=true")));
    }
}
