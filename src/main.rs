use clap::Parser;
use quantrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
