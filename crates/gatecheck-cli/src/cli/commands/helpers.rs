use crate::cli::args::BundleArgs;
use crate::exit_codes;
use gatecheck_core::{BundleSource, CheckInConfig, GateError, ValidationReceipt};
use std::path::Path;

/// Turn the shared location flags into a bundle source.
///
/// Explicit artifact paths are all-or-nothing and exclude --artifacts-dir.
/// With no location flags at all, discovery under --artifacts-root is the
/// default, matching unattended CI invocations.
pub fn resolve_source(args: &BundleArgs) -> Result<BundleSource, GateError> {
    let explicit_given = [&args.ranked_json, &args.finalists_json, &args.finalists_md];
    if explicit_given.iter().any(|path| path.is_some()) {
        if args.artifacts_dir.is_some() {
            return Err(GateError::ConflictingFlags(
                "--artifacts-dir cannot be combined with explicit artifact paths".to_string(),
            ));
        }
        let (Some(ranked_json), Some(finalists_json), Some(finalists_md)) = (
            args.ranked_json.clone(),
            args.finalists_json.clone(),
            args.finalists_md.clone(),
        ) else {
            return Err(GateError::MissingPaths(
                "explicit mode requires --ranked-json, --finalists-json, and --finalists-md"
                    .to_string(),
            ));
        };
        return Ok(BundleSource::Explicit {
            ranked_json,
            finalists_json,
            finalists_md,
        });
    }

    match args.artifacts_dir.as_deref() {
        None | Some("auto") => Ok(BundleSource::Auto {
            root: args.artifacts_root.clone(),
        }),
        Some(dir) => Ok(BundleSource::Directory(dir.into())),
    }
}

/// Shared config assembly for check-in and preflight.
pub fn base_config(bundle: &BundleArgs) -> Result<CheckInConfig, GateError> {
    let mut config = CheckInConfig::new(resolve_source(bundle)?);
    config.require_real_bundle = !bundle.allow_sample_input;
    config.command = std::env::args().collect();
    Ok(config)
}

/// Print the run outcome and map it to an exit code.
pub fn report_outcome(
    tag: &str,
    receipt: &ValidationReceipt,
    receipt_path: Option<&Path>,
) -> i32 {
    if receipt.passed() {
        match receipt_path {
            Some(path) => println!(
                "{tag}_ok artifacts={} receipt={}",
                receipt.artifacts.len(),
                path.display()
            ),
            None => println!("{tag}_ok artifacts={}", receipt.artifacts.len()),
        }
        exit_codes::SUCCESS
    } else {
        for finding in &receipt.findings {
            eprintln!("{finding}");
        }
        match receipt_path {
            Some(path) => eprintln!(
                "{tag}_blocked findings={} receipt={}",
                receipt.findings.len(),
                path.display()
            ),
            None => eprintln!("{tag}_blocked findings={}", receipt.findings.len()),
        }
        exit_codes::BLOCKED
    }
}
