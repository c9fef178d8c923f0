//! Handlers for the `history`, `mark` and `win-rate` commands.

use serde_json::json;

use super::command::{HistoryArgs, MarkArgs, WinRateArgs};
use super::{output, parse_symbol};
use crate::domain::{HistoryRecord, Outcome, Symbol};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::persistence::build_cache;

#[allow(clippy::result_large_err)]
fn symbol_filter(raw: Option<&str>) -> Result<Option<Symbol>> {
    raw.map(parse_symbol).transpose()
}

/// Execute the history command.
pub fn execute_history(config: &Config, args: &HistoryArgs) -> Result<()> {
    let symbol = symbol_filter(args.symbol.as_deref())?;
    let records = build_cache(config, false)?.history(symbol.as_ref(), args.limit)?;

    if output::is_json() {
        output::json_output(json!({ "history": records }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    if records.is_empty() {
        output::note("No recommendations recorded yet.");
        return Ok(());
    }

    let widths = [6, 10, 6, 8, 12, 17, 8];
    let header = ["ID", "Symbol", "Action", "Side", "Entry", "Fetched", "Outcome"];
    output::table_row(
        &header
            .iter()
            .zip(widths)
            .map(|(h, w)| ((*h).to_string(), w))
            .collect::<Vec<_>>(),
        true,
    );
    for record in &records {
        let cells = row(record);
        output::table_row(&cells.into_iter().zip(widths).collect::<Vec<_>>(), false);
    }
    Ok(())
}

fn row(record: &HistoryRecord) -> [String; 7] {
    let outcome = match record.outcome {
        Some(Outcome { hit: true, .. }) => "hit",
        Some(Outcome { hit: false, .. }) => "miss",
        None => "-",
    };
    [
        record.id.to_string(),
        record.symbol.to_string(),
        record.payload.action.to_string(),
        record.payload.direction.to_string(),
        record.payload.entry_price.to_string(),
        record.fetched_at.format("%m-%d %H:%M:%S").to_string(),
        outcome.to_string(),
    ]
}

/// Execute the mark command.
pub fn execute_mark(config: &Config, args: &MarkArgs) -> Result<()> {
    let outcome = Outcome {
        hit: args.hit,
        pnl: args.pnl,
    };
    let updated = build_cache(config, false)?.mark_outcome(args.id, outcome)?;

    if output::is_json() {
        output::json_output(json!({ "id": args.id, "updated": updated, "hit": outcome.hit }));
        return Ok(());
    }
    if updated {
        let label = if outcome.hit { "hit" } else { "miss" };
        output::success(&format!("Marked recommendation {} as {label}", args.id));
    } else {
        output::warning(&format!("No recommendation with id {}", args.id));
    }
    Ok(())
}

/// Execute the win-rate command.
pub fn execute_win_rate(config: &Config, args: &WinRateArgs) -> Result<()> {
    let symbol = symbol_filter(args.symbol.as_deref())?;
    let rate = build_cache(config, false)?.win_rate(symbol.as_ref(), args.limit)?;

    if output::is_json() {
        output::json_output(json!({
            "symbol": symbol,
            "win_rate": rate,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field(
        "Scope",
        symbol.map_or_else(|| "all symbols".to_string(), |s| s.to_string()),
    );
    if rate.total == 0 {
        output::note("No marked recommendations yet; use `tradewise mark`.");
        return Ok(());
    }
    output::field("Marked", rate.total);
    output::field("Hits", output::positive(rate.wins));
    output::field("Misses", output::negative(rate.losses));
    output::field("Hit rate", format!("{}%", rate.win_rate_pct));
    let avg = if rate.avg_pnl.is_sign_negative() {
        output::negative(rate.avg_pnl)
    } else {
        output::positive(rate.avg_pnl)
    };
    output::field("Avg PnL", avg);
    Ok(())
}
