//! CLI module graph.

pub mod cache;
pub mod command;
pub mod history;
pub mod output;
pub mod run;
pub mod show;
pub mod summary;

use std::path::{Path, PathBuf};

use tracing::debug;

use self::command::{Cli, Commands};
use self::output::OutputConfig;
use crate::domain::Symbol;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Default configuration path, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Load configuration for `cli`.
///
/// A missing file at the default path falls back to built-in defaults; an
/// explicitly passed path must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
#[allow(clippy::result_large_err)]
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG);
            if path.exists() {
                Config::load(path)
            } else {
                debug!("No config.toml found, using defaults");
                Ok(Config::default())
            }
        }
    }
}

/// Parse a symbol argument.
#[allow(clippy::result_large_err)]
pub(crate) fn parse_symbol(raw: &str) -> Result<Symbol> {
    Symbol::try_new(raw).map_err(|e| {
        ConfigError::InvalidValue {
            field: "symbol",
            reason: e.to_string(),
        }
        .into()
    })
}

/// Run the parsed command line.
///
/// # Errors
///
/// Returns the first error raised by the command.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let config = load_config(cli.config.as_deref())?;
    if cli.quiet {
        config.logging.quiet().init();
    } else {
        config.init_logging();
    }

    match &cli.command {
        Commands::Run(args) => run::execute(&config, args).await,
        Commands::Show(args) => show::execute(&config, args),
        Commands::Stats => cache::execute_stats(&config),
        Commands::Symbols => cache::execute_symbols(&config),
        Commands::Clear(args) => cache::execute_clear(&config, args),
        Commands::History(args) => history::execute_history(&config, args),
        Commands::Mark(args) => history::execute_mark(&config, args),
        Commands::WinRate(args) => history::execute_win_rate(&config, args),
        Commands::Summary(args) => summary::execute(&config, args),
    }
}
