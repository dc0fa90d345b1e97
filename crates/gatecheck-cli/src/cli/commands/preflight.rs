use crate::cli::args::PreflightArgs;
use crate::cli::commands::helpers::{base_config, report_outcome};
use gatecheck_core::{run_with_outputs, Mode, OutputPaths};

pub fn run(args: PreflightArgs) -> anyhow::Result<i32> {
    let config = base_config(&args.bundle)?;
    let outputs = OutputPaths {
        receipt_json: Some(args.output_check_json.clone()),
        blocked_md: Some(args.output_blocked_md),
    };
    let receipt = run_with_outputs(&config, Mode::Preflight, &outputs)?;
    Ok(report_outcome(
        "preflight",
        &receipt,
        Some(args.output_check_json.as_path()),
    ))
}
