//! concrete: a tool to implement Go interfaces

use clap::Parser;
use concrete_cli::cli::Cli;
use concrete_cli::output::{init_logging, resolve_color_choice};
use std::process::ExitCode;
use termcolor::StandardStream;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = std::io::stdout().lock();
    let mut stderr = StandardStream::stderr(resolve_color_choice(cli.color));
    ExitCode::from(concrete_cli::run(&cli, &mut stdout, &mut stderr))
}
