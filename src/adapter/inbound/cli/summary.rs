//! Handler for the `summary` command.

use rust_decimal::Decimal;
use serde_json::json;

use super::command::SummaryArgs;
use super::{output, parse_symbol};
use crate::domain::MarketAnalytics;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::persistence::build_cache;

/// Marked recommendations counted in the summary's hit rate.
const WIN_RATE_WINDOW: usize = 100;

/// Execute the summary command.
pub fn execute(config: &Config, args: &SummaryArgs) -> Result<()> {
    let filter = args.symbol.as_deref().map(parse_symbol).transpose()?;
    let symbols = match &filter {
        Some(symbol) => vec![symbol.clone()],
        None => config.tracked_symbols()?,
    };

    let cache = build_cache(config, false)?;
    let rate = cache.win_rate(filter.as_ref(), WIN_RATE_WINDOW)?;
    let mut markets = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        if let Some(analytics) = cache.market_analytics(symbol, args.days)? {
            markets.push(analytics);
        }
    }

    if output::is_json() {
        output::json_output(json!({
            "days": args.days,
            "win_rate": rate,
            "markets": markets,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Track record");
    if rate.total == 0 {
        output::note("No marked recommendations yet; use `tradewise mark`.");
    } else {
        output::field("Hit rate", format!("{}% of {}", rate.win_rate_pct, rate.total));
        output::field("Avg PnL", rate.avg_pnl);
    }

    output::section(&format!("Market, last {} days", args.days));
    if markets.is_empty() {
        output::note("No market samples recorded yet; they are taken on every refresh.");
        return Ok(());
    }
    let widths = [10, 7, 12, 12, 12, 10, 10];
    let header = ["Symbol", "Samples", "Avg price", "Low", "High", "Range", "Funding"];
    output::table_row(
        &header
            .iter()
            .zip(widths)
            .map(|(h, w)| ((*h).to_string(), w))
            .collect::<Vec<_>>(),
        true,
    );
    for analytics in &markets {
        output::table_row(&row(analytics).into_iter().zip(widths).collect::<Vec<_>>(), false);
    }
    Ok(())
}

fn row(analytics: &MarketAnalytics) -> [String; 7] {
    let funding = analytics.funding.map_or_else(
        || "-".to_string(),
        |f| format_rate_pct(f.avg),
    );
    [
        analytics.symbol.to_string(),
        analytics.records.to_string(),
        analytics.price.avg.to_string(),
        analytics.price.min.to_string(),
        analytics.price.max.to_string(),
        format!("{}%", analytics.price.volatility_pct),
        funding,
    ]
}

/// A funding rate fraction as a signed percentage, e.g. `+0.0100%`.
fn format_rate_pct(rate: Decimal) -> String {
    let pct = (rate * Decimal::ONE_HUNDRED).round_dp(4);
    let sign = if pct.is_sign_negative() { "" } else { "+" };
    format!("{sign}{pct}%")
}
