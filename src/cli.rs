//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagged_telemetry::constants::DEFAULT_CONFIG_FILE;
use tagged_telemetry::LogLevel;

/// Transaction id used by `demo` when none is given
pub const DEFAULT_DEMO_ID: &str = "a3124";

// =============================================================================
// CLI Definition
// =============================================================================

/// Structured logging demo for the tagged telemetry facade
#[derive(Parser, Debug)]
#[command(name = "telemetry-demo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Driver to use: cli, text or json (overrides config)
    #[arg(short, long, value_name = "NAME")]
    pub driver: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write the default config unless a valid one already exists
    Init,

    /// Run a sample transaction with a sub-transaction (default)
    Demo {
        /// Root transaction id
        #[arg(long, default_value = DEFAULT_DEMO_ID)]
        id: String,
    },

    /// Emit a single entry
    Log {
        /// Message to log
        message: String,

        /// debug, info, warning or error
        #[arg(short, long, default_value = "info")]
        level: LogLevel,

        /// Log inside this transaction
        #[arg(short, long, value_name = "ID")]
        transaction: Option<String>,

        /// Parent of the transaction (makes it a sub-transaction)
        #[arg(long, value_name = "ID", requires = "transaction")]
        parent: Option<String>,

        /// Extra tag, repeatable
        #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },
}

/// Parse `key=value`; the value may itself contain `=`
pub fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

// =============================================================================
// Tests
// =============================================================================
