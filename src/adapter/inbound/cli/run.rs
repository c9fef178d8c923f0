//! Handler for the `run` command.

use tokio::signal;
use tracing::info;

use super::command::RunArgs;
use super::output;
use crate::domain::Symbol;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::llm::build_llm_client;
use crate::infrastructure::factory::market::build_market_data;
use crate::infrastructure::factory::persistence::build_cache;
use crate::infrastructure::factory::refresh::build_scheduler;

/// Execute the run command: refresh until Ctrl-C.
pub async fn execute(config: &Config, args: &RunArgs) -> Result<()> {
    let llm = build_llm_client(&config.llm)?;
    let market = build_market_data(&config.market)?;
    let cache = build_cache(config, args.ephemeral)?;
    let swept = cache.sweep()?;
    let scheduler = build_scheduler(config, cache, llm, market)?;

    print_startup(config, args, scheduler.symbols());
    if swept > 0 {
        output::note(&format!("Swept {swept} entries past retention"));
    }

    let handle = scheduler.start();
    signal::ctrl_c().await?;
    info!("Shutdown signal received");
    handle.shutdown().await;

    output::success("Stopped");
    Ok(())
}

fn print_startup(config: &Config, args: &RunArgs, symbols: &[Symbol]) {
    let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Symbols", names.join(", "));
    output::field(
        "Provider",
        format!("{} ({})", config.llm.provider.as_str(), config.llm.model()),
    );
    output::field("TTL", format!("{}s", config.cache.ttl_secs));
    output::field("Tick", format!("{}s", config.refresh.tick_secs));
    if args.ephemeral {
        output::field("Store", "memory");
    } else {
        output::field("Store", &config.database);
    }
    output::success(&format!(
        "Refreshing {} symbols, press Ctrl-C to stop",
        symbols.len()
    ));
}
