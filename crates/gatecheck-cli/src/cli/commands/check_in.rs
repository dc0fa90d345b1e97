use crate::cli::args::CheckInArgs;
use crate::cli::commands::helpers::{base_config, report_outcome};
use crate::exit_codes;
use gatecheck_core::{dry_run, run_with_outputs, BundleJsonSpec, Mode, OutputPaths};

pub fn run(args: CheckInArgs) -> anyhow::Result<i32> {
    let mut config = base_config(&args.bundle)?;
    config.min_finalists = args.min_finalists;
    config.max_finalists = args.max_finalists;
    config.require_full_grid = args.require_full_grid;
    config.bundle_json = match args.bundle_json.as_deref() {
        None => None,
        Some("auto") => Some(BundleJsonSpec::Auto),
        Some(path) => Some(BundleJsonSpec::Path(path.into())),
    };

    tracing::debug!(dry_run = args.dry_run, "check-in invocation resolved");

    if args.dry_run {
        let plan = dry_run(&config, Mode::CheckIn)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(exit_codes::SUCCESS);
    }

    let outputs = OutputPaths {
        receipt_json: Some(args.output_check_json.clone()),
        blocked_md: Some(args.output_blocked_md),
    };
    let receipt = run_with_outputs(&config, Mode::CheckIn, &outputs)?;
    Ok(report_outcome(
        "check_in",
        &receipt,
        Some(args.output_check_json.as_path()),
    ))
}
