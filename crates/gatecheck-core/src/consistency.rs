//! Semantic checks spanning fields and artifacts within one bundle.
//!
//! Unlike the schema validator, every check here collects all violations it
//! finds instead of stopping at the first, so a single run reports the full
//! set of problems.

use crate::digest::digest_file;
use crate::finding::Finding;
use crate::types::{FinalistsPayload, GridTarget, PromotionReceipt, RankedRun};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Rank/disqualify exclusivity and contiguous 1..K ranks over qualified rows.
pub fn check_ranked_rows(rows: &[RankedRun]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen_configs: BTreeMap<&str, usize> = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        *seen_configs.entry(row.config.as_str()).or_insert(0) += 1;

        if row.qualified {
            if row.rank.is_none() {
                findings.push(Finding::consistency(format!(
                    "ranked_runs[{index}] ('{}'): qualified row must carry a rank",
                    row.config
                )));
            }
            if row.disqualify_reason.is_some() {
                findings.push(Finding::consistency(format!(
                    "ranked_runs[{index}] ('{}'): qualified row must not carry a disqualify_reason",
                    row.config
                )));
            }
        } else {
            if row.rank.is_some() {
                findings.push(Finding::consistency(format!(
                    "ranked_runs[{index}] ('{}'): disqualified row must not carry a rank",
                    row.config
                )));
            }
            if row.disqualify_reason.is_none() {
                findings.push(Finding::consistency(format!(
                    "ranked_runs[{index}] ('{}'): disqualified row must carry a disqualify_reason",
                    row.config
                )));
            }
        }
    }

    for (config, count) in &seen_configs {
        if *count > 1 {
            findings.push(Finding::consistency(format!(
                "config '{config}' appears {count} times in ranked_runs"
            )));
        }
    }

    let mut ranks: Vec<u64> = rows
        .iter()
        .filter(|row| row.qualified)
        .filter_map(|row| row.rank)
        .collect();
    ranks.sort_unstable();
    let expected: Vec<u64> = (1..=ranks.len() as u64).collect();
    if ranks != expected {
        findings.push(Finding::consistency(format!(
            "qualified ranks must form a contiguous 1..{} sequence, got {:?}",
            ranks.len(),
            ranks
        )));
    }

    findings
}

/// Grid completeness: every canonical configuration appears exactly once.
pub fn check_grid(rows: &[RankedRun], grid: &[GridTarget]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.config.as_str()).or_insert(0) += 1;
    }

    let missing: Vec<&str> = grid
        .iter()
        .map(|target| target.label)
        .filter(|label| !counts.contains_key(label))
        .collect();
    let duplicated: Vec<&str> = grid
        .iter()
        .map(|target| target.label)
        .filter(|label| counts.get(label).copied().unwrap_or(0) > 1)
        .collect();
    if !missing.is_empty() || !duplicated.is_empty() {
        findings.push(Finding::consistency(format!(
            "incomplete grid: missing={missing:?} duplicated={duplicated:?}"
        )));
    }

    let known: Vec<&str> = grid.iter().map(|target| target.label).collect();
    for config in counts.keys() {
        if !known.contains(config) {
            findings.push(Finding::consistency(format!(
                "config '{config}' is not part of the canonical grid"
            )));
        }
    }

    for row in rows {
        if let Some(target) = grid.iter().find(|t| t.label == row.config) {
            if row.depth != target.depth
                || row.n_branches != target.n_branches
                || row.aspect_ratio != target.aspect_ratio
            {
                findings.push(Finding::consistency(format!(
                    "config '{}' shape {}x{}@{} does not match grid target {}x{}@{}",
                    row.config,
                    row.depth,
                    row.n_branches,
                    row.aspect_ratio,
                    target.depth,
                    target.n_branches,
                    target.aspect_ratio
                )));
            }
        }
    }

    findings
}

fn fields_agree(finalist: &RankedRun, source: &RankedRun) -> Vec<&'static str> {
    let mut drifted = Vec::new();
    if finalist.depth != source.depth {
        drifted.push("depth");
    }
    if finalist.n_branches != source.n_branches {
        drifted.push("n_branches");
    }
    if finalist.aspect_ratio != source.aspect_ratio {
        drifted.push("aspect_ratio");
    }
    if finalist.selected_tok_per_sec != source.selected_tok_per_sec {
        drifted.push("selected_tok_per_sec");
    }
    if finalist.min_val_bpb != source.min_val_bpb {
        drifted.push("min_val_bpb");
    }
    if finalist.token_budget != source.token_budget {
        drifted.push("token_budget");
    }
    drifted
}

/// Finalists are a faithful, policy-compliant subset of the ranked rows.
///
/// Checks count policy, identity membership, exact field agreement, and the
/// selection rule (qualified rows in rank order, truncated to max_finalists).
pub fn check_finalists(
    finalists: &FinalistsPayload,
    rows: &[RankedRun],
    min_finalists: usize,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let count = finalists.selected_finalists.len();

    if count < min_finalists {
        findings.push(Finding::consistency(format!(
            "expected at least {min_finalists} finalists, found {count}"
        )));
    }
    if count as u64 > finalists.max_finalists {
        findings.push(Finding::consistency(format!(
            "expected at most {} finalists, found {count}",
            finalists.max_finalists
        )));
    }

    for finalist in &finalists.selected_finalists {
        match rows.iter().find(|row| row.config == finalist.config) {
            None => {
                findings.push(Finding::consistency(format!(
                    "finalist config '{}' is not present in the ranked runs",
                    finalist.config
                )));
            }
            Some(source) => {
                let drifted = fields_agree(finalist, source);
                if !drifted.is_empty() {
                    findings.push(Finding::consistency(format!(
                        "finalist '{}' drifted from its source row in fields: {}",
                        finalist.config,
                        drifted.join(", ")
                    )));
                }
            }
        }
    }

    // Selection rule: qualified rows in rank order, truncated to the recorded
    // max_finalists.
    let mut qualified: Vec<&RankedRun> = rows.iter().filter(|row| row.qualified).collect();
    qualified.sort_by_key(|row| row.rank.unwrap_or(u64::MAX));
    let expected: Vec<&str> = qualified
        .iter()
        .take(finalists.max_finalists as usize)
        .map(|row| row.config.as_str())
        .collect();
    let actual: Vec<&str> = finalists
        .selected_finalists
        .iter()
        .map(|row| row.config.as_str())
        .collect();
    if expected != actual {
        findings.push(Finding::consistency(format!(
            "selected_finalists {:?} does not match the qualified ranking order {:?}",
            actual, expected
        )));
    }

    findings
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Provenance binding: the finalists' recorded source must be the ranked
/// artifact supplied to this validation, byte-for-byte.
pub fn check_source_binding(
    finalists: &FinalistsPayload,
    ranked_path: &Path,
    ranked_sha256: &str,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let recorded = resolve(Path::new(&finalists.source));
    let supplied = resolve(ranked_path);
    if recorded != supplied {
        findings.push(Finding::provenance(format!(
            "finalists source does not match the ranked artifact path: source={} ranked={}",
            finalists.source,
            ranked_path.display()
        )));
    }

    if finalists.source_sha256 != ranked_sha256 {
        findings.push(Finding::provenance(format!(
            "finalists source_sha256 does not match the ranked artifact contents: recorded={} computed={}",
            finalists.source_sha256, ranked_sha256
        )));
    }

    findings
}

/// Required sections and per-finalist flag lines in the summary document.
pub fn check_summary_markdown(markdown: &str, finalists: &[RankedRun]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for snippet in ["## Stage 2 Finalists", "## Stage 2 depth/branch flags"] {
        if !markdown.contains(snippet) {
            findings.push(Finding::consistency(format!(
                "finalists summary missing section: {snippet}"
            )));
        }
    }

    for row in finalists {
        let flag_line = format!(
            "`--depth {} --n-branches {} --aspect-ratio {}`",
            row.depth, row.n_branches, row.aspect_ratio
        );
        if !markdown.contains(&flag_line) {
            findings.push(Finding::consistency(format!(
                "finalists summary missing depth/branch flag line for '{}'",
                row.config
            )));
        }
    }

    findings
}

/// Context the promotion-bundle receipt is verified against.
pub struct ReceiptContext<'a> {
    pub ranked_path: &'a Path,
    pub finalists_path: &'a Path,
    pub summary_path: &'a Path,
    pub ranked_sha256: &'a str,
    pub finalists_sha256: &'a str,
    pub summary_sha256: &'a str,
    pub finalists_count: usize,
    pub strict: bool,
}

/// Cross-verify an optional promotion-bundle receipt against the bundle it
/// claims to describe.
pub fn check_promotion_receipt(receipt: &PromotionReceipt, ctx: &ReceiptContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    if receipt.status != "ok" {
        findings.push(Finding::consistency(format!(
            "bundle receipt status must be 'ok', got '{}'",
            receipt.status
        )));
    }
    if ctx.strict && !receipt.run_check_in {
        findings.push(Finding::consistency(
            "bundle receipt must record run_check_in=true for strict check-in",
        ));
    }

    if receipt.source_sha256 != ctx.ranked_sha256 {
        findings.push(Finding::provenance(format!(
            "bundle receipt source_sha256 does not match the ranked artifact contents: recorded={} computed={}",
            receipt.source_sha256, ctx.ranked_sha256
        )));
    }

    let recorded_paths = [
        ("input_json", receipt.input_json.as_str(), ctx.ranked_path),
        ("finalists_json", receipt.finalists_json.as_str(), ctx.finalists_path),
        ("finalists_md", receipt.finalists_md.as_str(), ctx.summary_path),
    ];
    for (key, recorded, expected) in recorded_paths {
        if resolve(Path::new(recorded)) != resolve(expected) {
            findings.push(Finding::provenance(format!(
                "bundle receipt {key} does not match the validated artifact: recorded={recorded} expected={}",
                expected.display()
            )));
        }
    }

    if receipt.finalists_count != ctx.finalists_count as u64 {
        findings.push(Finding::consistency(format!(
            "bundle receipt finalists_count does not match validated finalists: recorded={} validated={}",
            receipt.finalists_count, ctx.finalists_count
        )));
    }

    let expected_digests = [
        ("finalists_json", ctx.finalists_sha256),
        ("finalists_md", ctx.summary_sha256),
    ];
    for (key, expected) in expected_digests {
        match receipt.artifact_sha256.get(key) {
            Some(recorded) if recorded == expected => {}
            Some(recorded) => findings.push(Finding::provenance(format!(
                "bundle receipt artifact_sha256.{key} does not match file contents: recorded={recorded} computed={expected}"
            ))),
            None => findings.push(Finding::consistency(format!(
                "bundle receipt missing artifact_sha256.{key}"
            ))),
        }
    }

    if receipt.run_check_in {
        match &receipt.check_json {
            None => findings.push(Finding::consistency(
                "bundle receipt missing check_json for run_check_in=true",
            )),
            Some(check_json) => {
                let check_path = Path::new(check_json);
                match receipt.artifact_sha256.get("check_json") {
                    None => findings.push(Finding::consistency(
                        "bundle receipt missing artifact_sha256.check_json",
                    )),
                    Some(recorded) => match digest_file(check_path) {
                        Err(_) => findings.push(Finding::missing_artifact(
                            "check_json",
                            format!("bundle receipt check_json file does not exist: {check_json}"),
                        )),
                        Ok(computed) if &computed != recorded => {
                            findings.push(Finding::provenance(format!(
                                "bundle receipt artifact_sha256.check_json does not match file contents: recorded={recorded} computed={computed}"
                            )));
                        }
                        Ok(_) => {}
                    },
                }
            }
        }
    }

    findings
}
