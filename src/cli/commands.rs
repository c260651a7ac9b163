//! CLI commands and argument parsing

use crate::types::AssertMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MediaWiki API client
#[derive(Parser, Debug)]
#[command(name = "wikiapi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Session configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in if configured and print the current user
    Check,

    /// Run a single API request and print the response
    Query {
        /// Request parameter as key=value; repeat a key to send a list
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Send as POST
        #[arg(long)]
        post: bool,

        /// Override the assertion (none, user, bot)
        #[arg(long)]
        assert: Option<AssertMode>,

        /// Fill the `token` parameter with this token kind (e.g. csrf)
        #[arg(long)]
        token: Option<String>,

        /// Print error envelopes instead of failing
        #[arg(long)]
        allow_errors: bool,
    },

    /// Page through a list query
    List {
        /// Parameter prefix of the list module (e.g. rc, ap, cm)
        #[arg(long)]
        code: String,

        /// Request parameter as key=value; repeat a key to send a list
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Maximum items (-1 = one page at the server maximum)
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Unwrap each item to the value under this key
        #[arg(long)]
        head_title: Option<String>,

        /// Resume state file (JSON)
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Name of the saved query in the state file (defaults to the code)
        #[arg(short, long)]
        key: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `key=value` argument
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
