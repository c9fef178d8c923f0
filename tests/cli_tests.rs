//! End-to-end tests of the `tradewise` binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tradewise::domain::{MarketContext, Symbol};
use tradewise::infrastructure::config::settings::Config;
use tradewise::infrastructure::factory::persistence::build_cache;
use tradewise::testkit::fixtures::{recommendation, snapshot};

const KEY_VARS: [&str; 3] = ["DEEPSEEK_API_KEY", "OPENAI_API_KEY", "ANTHROPIC_API_KEY"];

/// Temporary working directory with a `config.toml` pointing at a local database.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(extra: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let database = dir.path().join("tradewise.db");
        let content = format!(
            "database = '{}'\nsymbols = [\"BTCUSDT\", \"ETHUSDT\"]\n{extra}",
            database.display()
        );
        std::fs::write(dir.path().join("config.toml"), content).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tradewise").unwrap();
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        for var in KEY_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    fn config(&self) -> Config {
        Config::load(self.path().join("config.toml")).unwrap()
    }
}

#[test]
fn stats_on_empty_database() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_records\":0"));
}

#[test]
fn show_without_entry_is_pending() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["show", "BTCUSDT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn show_reports_fresh_entry() {
    let ws = Workspace::new();
    let cache = build_cache(&ws.config(), false).unwrap();
    let btc = Symbol::try_new("BTCUSDT").unwrap();
    cache.upsert(&btc, &recommendation(), &snapshot()).unwrap();
    drop(cache);

    ws.cmd()
        .args(["show", "btcusdt", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"fresh\""))
        .stdout(predicate::str::contains("\"tracked\":true"));

    ws.cmd()
        .args(["history", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"symbol\":\"BTCUSDT\""));
}

#[test]
fn symbols_lists_tracked_status() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["symbols", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"symbol\":\"BTCUSDT\""))
        .stdout(predicate::str::contains("\"symbol\":\"ETHUSDT\""))
        .stdout(predicate::str::contains("\"status\":\"pending\""));
}

#[test]
fn invalid_config_is_reported() {
    let ws = Workspace::with_config("[refresh]\ntick_secs = 0\n");
    ws.cmd()
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_secs"));
}

#[test]
fn explicit_missing_config_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--config", "absent.toml", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn marking_unknown_id_warns() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["mark", "99", "--hit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No recommendation with id 99"));
}

#[test]
fn mark_requires_hit_or_miss() {
    let ws = Workspace::new();
    ws.cmd().args(["mark", "1"]).assert().failure();
    ws.cmd()
        .args(["mark", "1", "--hit", "--miss"])
        .assert()
        .failure();
}

#[test]
fn win_rate_after_marking() {
    let ws = Workspace::new();
    let cache = build_cache(&ws.config(), false).unwrap();
    let btc = Symbol::try_new("BTCUSDT").unwrap();
    cache.upsert(&btc, &recommendation(), &snapshot()).unwrap();
    let id = cache.history(Some(&btc), 1).unwrap()[0].id;
    drop(cache);

    ws.cmd()
        .args(["mark", &id.to_string(), "--miss", "--pnl", "-2.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as miss"));
    ws.cmd()
        .args(["win-rate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\":1"))
        .stdout(predicate::str::contains("\"losses\":1"));
}

#[test]
fn summary_reports_recorded_market_samples() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No market samples recorded yet"));

    let cache = build_cache(&ws.config(), false).unwrap();
    let mut context = MarketContext::new(snapshot());
    context.funding_rate = Some(rust_decimal::Decimal::new(1, 4));
    cache
        .record_market(&Symbol::try_new("BTCUSDT").unwrap(), &context)
        .unwrap();
    drop(cache);

    ws.cmd()
        .args(["summary", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"days\":7"))
        .stdout(predicate::str::contains("\"symbol\":\"BTCUSDT\""))
        .stdout(predicate::str::contains("\"records\":1"))
        .stdout(predicate::str::contains("ETHUSDT").not());
    ws.cmd()
        .args(["summary", "--symbol", "btcusdt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+0.0100%"));
}

#[test]
fn clear_removes_entries() {
    let ws = Workspace::new();
    let cache = build_cache(&ws.config(), false).unwrap();
    cache
        .upsert(&Symbol::try_new("ETHUSDT").unwrap(), &recommendation(), &snapshot())
        .unwrap();
    drop(cache);

    ws.cmd()
        .args(["clear", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed\":1"));
}

#[test]
fn run_without_api_key_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["run", "--ephemeral"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEEPSEEK_API_KEY"));
}
