//! Prompt construction for the recommendation provider.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::domain::{MarketContext, Symbol};

/// Build the analysis prompt for `symbol`.
///
/// The template lists exactly the keys the validator reads, so a compliant
/// answer needs no key mapping.
#[must_use]
pub fn build_prompt(symbol: &Symbol, context: &MarketContext) -> String {
    let snapshot = &context.snapshot;
    let mut prompt = format!(
        "You are a senior crypto futures analyst. Analyze {symbol} using the market data below.\n\n\
         Symbol: {symbol}\n\
         Current price: ${}\n\
         24h change: {}%\n\
         24h high: ${}\n\
         24h low: ${}\n",
        snapshot.current_price, snapshot.change_pct_24h, snapshot.high_24h, snapshot.low_24h,
    );

    if let Some(rate) = context.funding_rate {
        let pct = (rate * Decimal::ONE_HUNDRED).round_dp(4);
        let sign = if pct.is_sign_negative() { "" } else { "+" };
        let _ = writeln!(
            prompt,
            "Funding rate: {sign}{pct}% (positive: longs pay shorts, negative: shorts pay longs)"
        );
    }
    if let Some(record) = context.track_record.filter(|r| r.total > 0) {
        let _ = writeln!(
            prompt,
            "Past recommendation hit rate: {}% over the last {} marked calls, average PnL {}",
            record.win_rate_pct, record.total, record.avg_pnl
        );
    }

    let _ = write!(
        prompt,
        "\nOutput rules:\n\
         - Reply with a single JSON object and nothing else: no markdown, no code fences, no commentary.\n\
         - Use exactly the keys shown. Prices must be plain positive numbers.\n\
         - action is \"enter\" or \"skip\"; direction is \"long\", \"short\" or \"neutral\"; \
         position_size is \"heavy\", \"light\" or \"none\".\n\n\
         {{\n  \
           \"symbol\": \"{symbol}\",\n  \
           \"action\": \"enter\",\n  \
           \"direction\": \"long\",\n  \
           \"position_size\": \"light\",\n  \
           \"entry_price\": 0,\n  \
           \"stop_loss\": 0,\n  \
           \"take_profit\": 0,\n  \
           \"resistance\": 0,\n  \
           \"support\": 0,\n  \
           \"risk_reward\": \"1:2\",\n  \
           \"rationale\": \"technical and fundamental reasoning\",\n  \
           \"risk_note\": \"specific risks\",\n  \
           \"analyzed_at\": \"YYYY-MM-DD HH:MM UTC\"\n\
         }}\n"
    );
    prompt
}
