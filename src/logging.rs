//! Logging setup.
//!
//! Rotation often runs unattended, so output adapts to where stderr goes:
//! pretty for interactive terminals, plain compact lines for pipes and unit
//! files, JSON lines when the CLI itself is in JSON mode. `RUST_LOG`
//! overrides the verbosity-flag defaults.

use std::io::{self, IsTerminal};

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global tracing subscriber.
///
/// `verbose` counts `-v` flags: 0 = info, 1 = debug, 2+ = trace. `quiet`
/// drops everything below errors.
pub fn init_logging(json_mode: bool, verbose: u8, quiet: bool) {
    let directive = if quiet {
        "wsh=error"
    } else {
        match verbose {
            0 => "wsh=info",
            1 => "wsh=debug",
            _ => "wsh=trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    if json_mode {
        builder.json().with_target(true).init();
    } else if io::stderr().is_terminal() {
        builder.init();
    } else {
        builder.with_ansi(false).compact().init();
    }
}
