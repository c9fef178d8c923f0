//! Command-line interface definitions.
//!
//! Defines the CLI structure for the tradewise application using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Cached LLM trading recommendations for tracked symbols
#[derive(Parser, Debug)]
#[command(name = "tradewise")]
#[command(version)]
pub struct Cli {
    /// Configuration file [default: config.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the tradewise CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep recommendations refreshed until Ctrl-C
    Run(RunArgs),

    /// Show the cached recommendation for a symbol
    Show(ShowArgs),

    /// Show cache statistics
    Stats,

    /// List tracked symbols
    Symbols,

    /// Delete cached recommendations
    Clear(ClearArgs),

    /// List past recommendations
    History(HistoryArgs),

    /// Record whether a past recommendation hit
    Mark(MarkArgs),

    /// Show the hit rate of marked recommendations
    WinRate(WinRateArgs),

    /// Summarize the track record and recent market samples
    Summary(SummaryArgs),
}

/// Arguments for `tradewise run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Keep the cache in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

/// Arguments for `tradewise show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Symbol to show, e.g. BTCUSDT
    pub symbol: String,

    /// With no cached entry, fall back to history from the last N seconds
    #[arg(long, value_name = "SECS")]
    pub recent: Option<u64>,
}

/// Arguments for `tradewise clear`.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Only clear this symbol
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Arguments for `tradewise history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only show this symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Maximum rows to show
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for `tradewise mark`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("result").required(true).args(["hit", "miss"])))]
pub struct MarkArgs {
    /// History row id (see `tradewise history`)
    pub id: i64,

    /// The recommendation played out
    #[arg(long)]
    pub hit: bool,

    /// The recommendation failed
    #[arg(long)]
    pub miss: bool,

    /// Realized profit or loss
    #[arg(long, allow_negative_numbers = true)]
    pub pnl: Option<Decimal>,
}

/// Arguments for `tradewise win-rate`.
#[derive(Args, Debug)]
pub struct WinRateArgs {
    /// Only count this symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Number of most recent marked recommendations to count
    #[arg(long, default_value = "30")]
    pub limit: usize,
}

/// Arguments for `tradewise summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Only summarize this symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Days of market samples to aggregate
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,
}
