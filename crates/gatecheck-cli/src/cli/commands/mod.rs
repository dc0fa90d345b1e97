use super::args::{Cli, Command};

pub mod check_in;
pub mod discover;
pub mod helpers;
pub mod preflight;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::CheckIn(args) => check_in::run(args),
        Command::Preflight(args) => preflight::run(args),
        Command::Discover(args) => discover::run(args),
    }
}
