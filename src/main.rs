//! gridpaint - Command-line tool for editing, checking and rendering JSON tile maps

use std::process::ExitCode;

use gridpaint::cli;

fn main() -> ExitCode {
    cli::run()
}
