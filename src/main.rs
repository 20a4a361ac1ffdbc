//! Tooltipgen - command-line tool for rendering item tooltips and sprites

use std::process::ExitCode;

use tooltipgen::cli;

fn main() -> ExitCode {
    cli::run()
}
