//! Handlers for the `stats`, `symbols` and `clear` commands.

use serde_json::json;

use super::command::ClearArgs;
use super::{output, parse_symbol};
use crate::application::read::{ReadOutcome, Reader};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::persistence::build_cache;

/// Execute the stats command.
pub fn execute_stats(config: &Config) -> Result<()> {
    let stats = build_cache(config, false)?.stats()?;

    if output::is_json() {
        output::json_output(json!({
            "database": config.database,
            "total_records": stats.total_records,
            "valid_records": stats.valid_records,
            "expired_records": stats.expired_records,
            "ttl_secs": stats.ttl_secs,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", &config.database);
    output::field("TTL", format!("{}s", stats.ttl_secs));
    output::section("Cache");
    output::field("Entries", stats.total_records);
    output::field("Fresh", output::positive(stats.valid_records));
    output::field("Expired", output::muted(stats.expired_records));
    Ok(())
}

/// Execute the symbols command: tracked symbols and their cache status.
pub fn execute_symbols(config: &Config) -> Result<()> {
    let symbols = config.tracked_symbols()?;
    let reader = Reader::new(build_cache(config, false)?);

    let rows: Vec<_> = symbols
        .iter()
        .map(|symbol| match reader.read(symbol) {
            ReadOutcome::Available(reading) if reading.fresh => {
                (symbol, "fresh", Some(reading.remaining_secs))
            }
            ReadOutcome::Available(_) => (symbol, "stale", None),
            ReadOutcome::NotAvailable => (symbol, "pending", None),
        })
        .collect();

    if output::is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(symbol, status, remaining)| {
                json!({ "symbol": symbol, "status": status, "remaining_secs": remaining })
            })
            .collect();
        output::json_output(json!({ "symbols": items }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    for (symbol, status, remaining) in rows {
        let status = match (status, remaining) {
            ("fresh", Some(secs)) => output::positive(format!("fresh ({secs}s left)")),
            ("stale", _) => output::negative(status),
            _ => output::muted(status),
        };
        output::field(symbol.as_str(), status);
    }
    Ok(())
}

/// Execute the clear command.
pub fn execute_clear(config: &Config, args: &ClearArgs) -> Result<()> {
    let cache = build_cache(config, false)?;

    let removed = match &args.symbol {
        Some(raw) => {
            let symbol = parse_symbol(raw)?;
            usize::from(cache.delete(&symbol)?)
        }
        None => cache.clear_all()?,
    };

    if output::is_json() {
        output::json_output(json!({ "removed": removed }));
        return Ok(());
    }
    output::success(&format!("Removed {removed} cached entries"));
    Ok(())
}
