use crate::cli::args::DiscoverArgs;
use crate::exit_codes;
use gatecheck_core::{discover, BundleLayout, GateError};

/// Enumerate candidates and report them. Finding nothing is a normal outcome
/// and still exits zero; only a missing root is an error.
pub fn run(args: DiscoverArgs) -> anyhow::Result<i32> {
    let result = discover(&args.root, &BundleLayout::default())?;

    match &result.selected {
        Some(path) => println!("selected {}", path.display()),
        None => println!("selected none"),
    }
    for rejected in &result.rejected {
        println!("rejected {}: {}", rejected.path.display(), rejected.reason);
    }

    if let Some(path) = &args.output_json {
        let mut text = serde_json::to_string_pretty(&result)?;
        text.push('\n');
        std::fs::write(path, text).map_err(|e| GateError::write(path, e))?;
    }

    Ok(exit_codes::SUCCESS)
}
