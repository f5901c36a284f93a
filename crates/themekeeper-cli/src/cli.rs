//! Argument parsing and command execution.

use std::io::Write;
use std::path::PathBuf;
use std::thread;

use anyhow::Context;
use clap::{Parser, Subcommand};
use themekeeper::{
    AppearanceSurface, ClassList, ColorSchemeSignal, FileStore, OsSignal, PreferenceStore,
    ThemeConfig, ThemeController, ThemePreference,
};

use crate::output::{mode_line, Status};

#[derive(Debug, Parser)]
#[command(name = "themekeeper", version, about = "Keep a light/dark/system theme preference")]
pub struct Cli {
    /// YAML config file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// State file holding the stored preference (overrides config and THEMEKEEPER_STATE).
    #[arg(long, global = true, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the stored preference and the appearance it resolves to.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Flip between dark and light and remember the result.
    Toggle,
    /// Choose a preference; `system` forgets any stored choice.
    Set {
        #[arg(value_parser = parse_preference)]
        preference: ThemePreference,
    },
    /// Print the root `class` attribute for the current appearance.
    Class,
    /// Print the appearance on every OS color scheme change.
    Watch,
}

fn parse_preference(raw: &str) -> Result<ThemePreference, String> {
    raw.parse().map_err(|e: themekeeper::ParsePreferenceError| e.to_string())
}

/// Resolves configuration from the file, environment and flags, in that order.
pub fn load_config(cli: &Cli) -> anyhow::Result<ThemeConfig> {
    let config = match &cli.config {
        Some(path) => ThemeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ThemeConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(state) = &cli.state {
        config.state_file = Some(state.clone());
    }
    Ok(config)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let state_file = config.resolved_state_file()?;
    tracing::debug!(state = %state_file.display(), key = %config.storage_key, "using state file");

    let signal = OsSignal::new().with_poll_interval(config.poll_interval());
    let mut controller = ThemeController::new(FileStore::new(state_file), ClassList::new(), signal)
        .with_key(config.storage_key);
    controller.initialize().context("initializing theme")?;

    if cli.command == Command::Watch {
        return watch(&controller, out);
    }
    execute(&cli.command, &controller, out)
}

/// Runs a one-shot command against an initialized controller.
pub fn execute<S, O>(
    command: &Command,
    controller: &ThemeController<S, ClassList, O>,
    out: &mut dyn Write,
) -> anyhow::Result<()>
where
    S: PreferenceStore,
    O: ColorSchemeSignal,
{
    match command {
        Command::Status { json } => {
            let status = Status {
                preference: controller.preference()?,
                appearance: controller.appearance(),
                class: controller.surface().to_attribute(),
            };
            if *json {
                writeln!(out, "{}", status.to_json()?)?;
            } else {
                write!(out, "{}", status.to_text())?;
            }
        }
        Command::Toggle => {
            let mode = controller.toggle()?;
            write!(out, "{}", mode_line(mode))?;
        }
        Command::Set { preference } => {
            let mode = controller.select(*preference)?;
            write!(out, "{}", mode_line(mode))?;
        }
        Command::Class => {
            writeln!(out, "{}", controller.surface().to_attribute())?;
        }
        Command::Watch => anyhow::bail!("`watch` runs until interrupted and cannot be combined with other commands"),
    }
    out.flush()?;
    Ok(())
}

fn watch<S, O>(controller: &ThemeController<S, ClassList, O>, out: &mut dyn Write) -> anyhow::Result<()>
where
    S: PreferenceStore,
    O: ColorSchemeSignal,
{
    write!(out, "{}", mode_line(controller.surface().appearance()))?;
    out.flush()?;

    // The handler outlives `out`, so it writes to stdout directly.
    let _subscription = controller.subscribe_to_system_changes(|mode| {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = write!(handle, "{}", mode_line(mode)).and_then(|_| handle.flush()) {
            tracing::warn!(error = %e, "failed to write appearance");
        }
    });

    loop {
        thread::park();
    }
}
