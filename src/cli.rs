//! Command-line interface argument parsing.
//!
//! Flags that also exist in the configuration file are optional here so
//! that an unset flag leaves the configured value alone.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// FeedLens - reports over the JSONPlaceholder datasets
///
/// Fetches users, posts, comments and albums, validates every record and
/// writes a Markdown or JSON report with rankings, duplicates and
/// proportions.
///
/// Examples:
///   feedlens
///   feedlens --format json --output report.json
///   feedlens --local ./snapshot --lenient
///   feedlens --keyword dolor --post-keyword qui --top 3
///   feedlens --company romaguera --city gwenborough
///   feedlens --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the REST API
    #[arg(long, value_name = "URL", env = "FEEDLENS_BASE_URL")]
    pub base_url: Option<String>,

    /// Read <resource>.json files from this directory instead of the API
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Number of entries in top-N rankings
    #[arg(short, long, value_name = "N")]
    pub top: Option<usize>,

    /// Substring searched in comment bodies
    #[arg(short, long, value_name = "WORD")]
    pub keyword: Option<String>,

    /// Whole word searched in post titles and bodies
    #[arg(long, value_name = "WORD")]
    pub post_keyword: Option<String>,

    /// Email of the user to look up
    #[arg(short, long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Only list users whose company name contains this text
    #[arg(long, value_name = "TEXT")]
    pub company: Option<String>,

    /// Only list users living in this city
    #[arg(long, value_name = "CITY")]
    pub city: Option<String>,

    /// Only list users whose name contains this text
    #[arg(long, value_name = "TEXT")]
    pub name: Option<String>,

    /// Posts per page of keyword results
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Page of keyword results to include (1-based)
    #[arg(long, default_value = "1", value_name = "N")]
    pub page: usize,

    /// Retries after a failed request
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Delay before the first retry, in milliseconds
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Accept users without a complete address or company
    #[arg(long)]
    pub lenient: bool,

    /// Exit with code 2 when any record was rejected
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Print what would be fetched and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .feedlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Generate a default .feedlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.top == Some(0) {
            return Err("Top must be at least 1".to_string());
        }

        if self.page_size == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }

        if self.page == 0 {
            return Err("Page must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local directory does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_dir() {
                return Err(format!(
                    "Local path is not a directory: {}",
                    local_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
