//! Configuration file handling.
//!
//! This module handles loading `.feedlens.toml` and merging it with the
//! command-line flags.

use crate::analysis::UserCriteria;
use crate::cli::{Args, OutputFormat};
use crate::report::ReportOptions;
use crate::source::{RetryPolicy, DEFAULT_BASE_URL};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".feedlens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Analysis parameters.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; resource paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Retry settings for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Retries after the first failed attempt.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Factor applied to the delay after every retry.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_retries() -> u32 {
    2
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

/// Parameters of the individual analyses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Entries in top-N rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Substring searched in comment bodies.
    #[serde(default = "default_comment_keyword")]
    pub comment_keyword: String,

    /// Whole word searched in posts.
    #[serde(default = "default_post_keyword")]
    pub post_keyword: String,

    /// Email of the user to look up.
    #[serde(default = "default_lookup_email")]
    pub lookup_email: String,

    /// Require complete address and company on users.
    #[serde(default = "default_true")]
    pub strict_users: bool,

    /// Posts per page of keyword results.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            comment_keyword: default_comment_keyword(),
            post_keyword: default_post_keyword(),
            lookup_email: default_lookup_email(),
            strict_users: true,
            page_size: default_page_size(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_comment_keyword() -> String {
    "dolor".to_string()
}

fn default_post_keyword() -> String {
    "qui".to_string()
}

fn default_lookup_email() -> String {
    "Sincere@april.biz".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    10
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("feedlens_report.md")
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.feedlens.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only flags that were actually given override the file.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(retries) = args.retries {
            self.fetch.retries = retries;
        }
        if let Some(delay) = args.retry_delay_ms {
            self.fetch.initial_delay_ms = delay;
        }

        if let Some(top) = args.top {
            self.analysis.top_n = top;
        }
        if let Some(ref keyword) = args.keyword {
            self.analysis.comment_keyword = keyword.clone();
        }
        if let Some(ref keyword) = args.post_keyword {
            self.analysis.post_keyword = keyword.clone();
        }
        if let Some(ref email) = args.email {
            self.analysis.lookup_email = email.clone();
        }
        if let Some(page_size) = args.page_size {
            self.analysis.page_size = page_size;
        }
        if args.lenient {
            self.analysis.strict_users = false;
        }

        if let Some(ref output) = args.output {
            self.report.output = output.clone();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Check the merged values. CLI flags are checked by
    /// [`Args::validate`]; this covers values that came from a file.
    pub fn validate(&self) -> Result<()> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("api.base_url must start with 'http://' or 'https://': {}", url);
        }
        if self.api.timeout_seconds == 0 {
            bail!("api.timeout_seconds must be at least 1");
        }
        let multiplier = self.fetch.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            bail!(
                "fetch.backoff_multiplier must be a finite number of at least 1.0, got {}",
                multiplier
            );
        }
        if self.analysis.top_n == 0 {
            bail!("analysis.top_n must be at least 1");
        }
        if self.analysis.page_size == 0 {
            bail!("analysis.page_size must be at least 1");
        }
        Ok(())
    }

    /// Retry policy described by the `[fetch]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.fetch.retries,
            initial_delay: Duration::from_millis(self.fetch.initial_delay_ms),
            multiplier: self.fetch.backoff_multiplier,
        }
    }

    /// Analysis parameters, with the user filter taken from `args`.
    pub fn report_options(&self, source: String, args: &Args) -> ReportOptions {
        ReportOptions {
            source,
            top_n: self.analysis.top_n,
            comment_keyword: self.analysis.comment_keyword.clone(),
            post_keyword: self.analysis.post_keyword.clone(),
            lookup_email: self.analysis.lookup_email.clone(),
            criteria: UserCriteria {
                company_name: args.company.clone(),
                city: args.city.clone(),
                name_includes: args.name.clone(),
            },
            page_size: self.analysis.page_size,
            page: args.page,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
