//! `themekeeper`: query and change the stored color scheme preference.
//!
//! ```text
//! themekeeper status [--json]
//! themekeeper toggle
//! themekeeper set <dark|light|system>
//! themekeeper class
//! themekeeper watch
//! ```

mod cli;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = std::io::stdout();
    cli::run(cli, &mut stdout.lock())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
