use clap::{Args, Parser, Subcommand};
use gatecheck_core::types::{
    BLOCKED_REPORT_FILE, CHECK_RECEIPT_FILE, DEFAULT_MIN_FINALISTS, PREFLIGHT_BLOCKED_FILE,
    PREFLIGHT_RECEIPT_FILE,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gatecheck",
    version,
    about = "Verify and check in staged promotion bundles: schema, consistency, sample gating, and digest binding"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Strict check-in: full validation plus a durable receipt
    CheckIn(CheckInArgs),
    /// Existence and parseability checks only
    Preflight(PreflightArgs),
    /// Enumerate candidate bundles under a search root
    Discover(DiscoverArgs),
}

/// Bundle location flags shared by check-in and preflight.
#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    /// Bundle directory, or "auto" to discover one under --artifacts-root
    #[arg(long)]
    pub artifacts_dir: Option<String>,

    /// Search root for discovery (used when --artifacts-dir is absent or "auto")
    #[arg(long, default_value = "artifacts/pilot")]
    pub artifacts_root: PathBuf,

    /// Explicit ranked-runs artifact path (requires the other two explicit paths)
    #[arg(long)]
    pub ranked_json: Option<PathBuf>,

    /// Explicit finalists artifact path
    #[arg(long)]
    pub finalists_json: Option<PathBuf>,

    /// Explicit finalists summary document path
    #[arg(long)]
    pub finalists_md: Option<PathBuf>,

    /// Accept artifacts marked is_sample=true (fixture regression testing only)
    #[arg(long)]
    pub allow_sample_input: bool,
}

#[derive(Args)]
pub struct CheckInArgs {
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Promotion-bundle receipt path, or "auto" for the default name in the bundle dir
    #[arg(long)]
    pub bundle_json: Option<String>,

    /// Minimum acceptable finalist count
    #[arg(long, default_value_t = DEFAULT_MIN_FINALISTS)]
    pub min_finalists: usize,

    /// Require the finalists payload to record exactly this max_finalists
    #[arg(long)]
    pub max_finalists: Option<usize>,

    /// Require every canonical grid configuration to appear exactly once
    #[arg(long)]
    pub require_full_grid: bool,

    /// Print the resolved plan as JSON without reading the bundle
    #[arg(long)]
    pub dry_run: bool,

    /// Receipt output path
    #[arg(long, default_value = CHECK_RECEIPT_FILE)]
    pub output_check_json: PathBuf,

    /// Blocked-report output path, written only on failure
    #[arg(long, default_value = BLOCKED_REPORT_FILE)]
    pub output_blocked_md: PathBuf,
}

#[derive(Args)]
pub struct PreflightArgs {
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Receipt output path
    #[arg(long, default_value = PREFLIGHT_RECEIPT_FILE)]
    pub output_check_json: PathBuf,

    /// Blocked-report output path, written only on failure
    #[arg(long, default_value = PREFLIGHT_BLOCKED_FILE)]
    pub output_blocked_md: PathBuf,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Search root to enumerate
    #[arg(long, default_value = "artifacts/pilot")]
    pub root: PathBuf,

    /// Write the discovery result as JSON to this path
    #[arg(long)]
    pub output_json: Option<PathBuf>,
}
