//! Handler for the `show` command.

use std::time::Duration;

use serde_json::json;

use super::command::ShowArgs;
use super::{output, parse_symbol};
use crate::application::read::{ReadOutcome, Reader, Reading, Source};
use crate::domain::{Direction, Symbol};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::persistence::build_cache;

/// Execute the show command.
pub fn execute(config: &Config, args: &ShowArgs) -> Result<()> {
    let symbol = parse_symbol(&args.symbol)?;
    let tracked = config.tracked_symbols()?.contains(&symbol);
    let reader = Reader::new(build_cache(config, false)?);

    let outcome = match args.recent {
        Some(secs) => reader.read_or_recent(&symbol, Duration::from_secs(secs)),
        None => reader.read(&symbol),
    };

    if output::is_json() {
        let value = match &outcome {
            ReadOutcome::Available(reading) => json!({
                "symbol": symbol,
                "status": status(reading),
                "tracked": tracked,
                "reading": reading,
            }),
            ReadOutcome::NotAvailable => json!({
                "symbol": symbol,
                "status": "pending",
                "tracked": tracked,
            }),
        };
        output::json_output(value);
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Symbol", output::highlight(&symbol));
    match outcome {
        ReadOutcome::Available(reading) => print_reading(&reading),
        ReadOutcome::NotAvailable => print_pending(&symbol, tracked),
    }
    Ok(())
}

fn status(reading: &Reading) -> &'static str {
    match (reading.source, reading.fresh) {
        (Source::History, _) => "recent",
        (Source::Cache, true) => "fresh",
        (Source::Cache, false) => "stale",
    }
}

fn print_pending(symbol: &Symbol, tracked: bool) {
    output::field("Status", output::muted("pending"));
    if tracked {
        output::note("No recommendation yet; one appears after the next refresh.");
    } else {
        output::warning(&format!(
            "{symbol} is not tracked; add it to `symbols` in the config"
        ));
    }
}

fn print_reading(reading: &Reading) {
    let rec = &reading.payload;
    let status = match status(reading) {
        "fresh" => output::positive(format!("fresh, expires in {}s", reading.remaining_secs)),
        "stale" => output::negative("stale, refresh pending"),
        other => output::muted(format!("{other}, from history")),
    };
    output::field("Status", status);
    output::field("Fetched", reading.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));

    output::section("Recommendation");
    output::field("Action", rec.action);
    let direction = match rec.direction {
        Direction::Long => output::positive(rec.direction),
        Direction::Short => output::negative(rec.direction),
        Direction::Neutral => output::muted(rec.direction),
    };
    output::field("Direction", direction);
    output::field("Size", rec.position_size);
    output::field("Entry", rec.entry_price);
    output::field("Stop loss", rec.stop_loss);
    output::field("Take profit", rec.take_profit);
    if let Some(resistance) = rec.resistance {
        output::field("Resistance", resistance);
    }
    if let Some(support) = rec.support {
        output::field("Support", support);
    }
    if let Some(ratio) = &rec.risk_reward {
        output::field("Risk/reward", ratio);
    }
    if !rec.rationale.is_empty() {
        output::field("Rationale", &rec.rationale);
    }
    if !rec.risk_note.is_empty() {
        output::field("Risk", &rec.risk_note);
    }

    let snapshot = &reading.snapshot;
    output::section("Market at fetch");
    output::field("Price", snapshot.current_price);
    output::field("24h range", format!("{} - {}", snapshot.low_24h, snapshot.high_24h));
    output::field("24h change", format!("{}%", snapshot.change_pct_24h));
}
