//! Tagged telemetry demo
//!
//! Usage:
//!   telemetry-demo                         Run the sample transaction
//!   telemetry-demo init                    Write config.json with defaults
//!   telemetry-demo --driver json demo      Sample transaction to app-json.log
//!   telemetry-demo log "msg" -t tx --tag k=v

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, DEFAULT_DEMO_ID};
use tagged_telemetry::diagnostics::init_tracing;
use tagged_telemetry::{ensure_default_config, Config, LogLevel, LogManager, Tags, Transaction};
use tracing::warn;

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.take().unwrap_or(Command::Demo {
        id: DEFAULT_DEMO_ID.to_string(),
    });

    if command == Command::Init {
        let written = ensure_default_config(&cli.config)
            .with_context(|| format!("initializing {}", cli.config.display()))?;
        if written {
            eprintln!("Wrote default config to {}", cli.config.display());
        } else {
            eprintln!("{} is already valid", cli.config.display());
        }
        return Ok(());
    }

    let config = load_config(&cli);
    let selector = cli.driver.as_deref().unwrap_or(&config.default_driver);
    let manager = LogManager::new(selector, &config);

    match command {
        Command::Demo { id } => run_demo(&manager, &id),
        Command::Log {
            message,
            level,
            transaction,
            parent,
            tags,
        } => run_log(&manager, &message, level, transaction, parent, tags),
        Command::Init => {}
    }

    manager.close().context("closing log driver")?;
    Ok(())
}

/// Config file if it loads, defaults otherwise
fn load_config(cli: &Cli) -> Config {
    if !cli.config.exists() {
        return Config::default();
    }
    Config::load(&cli.config).unwrap_or_else(|e| {
        warn!("{}, using defaults", e);
        Config::default()
    })
}

fn run_demo(manager: &LogManager, id: &str) {
    let mut tx = Transaction::new(id, manager);
    tx.add_tag("a", "Hello");
    tx.add_tag("b", "Hi");

    tx.start();
    tx.debug("This log uses the default driver");
    tx.set_tags(
        [("first", "hello"), ("second", "hi")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    tx.debug("This is the second log");

    let child = tx.sub_transaction(format!("{}-1", id));
    child.start();
    child.warning("Sub-transaction work took longer than expected");
    child.end();

    tx.end();
}

fn run_log(
    manager: &LogManager,
    message: &str,
    level: LogLevel,
    transaction: Option<String>,
    parent: Option<String>,
    tags: Vec<(String, String)>,
) {
    let tags: Tags = tags.into_iter().collect();

    match (parent, transaction) {
        (Some(parent), Some(id)) => {
            Transaction::new(parent, manager)
                .sub_transaction(id)
                .log(level, message, &tags);
        }
        (None, Some(id)) => Transaction::new(id, manager).log(level, message, &tags),
        _ => manager.log(level, message, "", "", &tags),
    }
}
