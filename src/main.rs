//! ppmview - Command-line tool for viewing, validating and converting ASCII PPM files

use std::process::ExitCode;

use ppmview::cli;

fn main() -> ExitCode {
    cli::run()
}
