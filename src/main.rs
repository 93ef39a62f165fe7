//! FeedLens - reports over the JSONPlaceholder datasets
//!
//! A CLI tool that fetches users, posts, comments and albums, validates
//! every record and writes an aggregation report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (network, config, parse failure, etc.)
//!   2 - Records were rejected and --fail-on-invalid was set

mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dataset::{LoadOptions, ValidationSummary};
use models::Resource;
use report::AnalyticsReport;
use source::{ApiClient, DataSource, LocalSource};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("FeedLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .feedlens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the API, retries, keywords and report output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete fetch-analyze-report flow. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let source = build_source(&args, &config)?;

    if args.dry_run {
        return handle_dry_run(&source);
    }

    println!("📥 Loading datasets from {}", source.describe());
    let options = LoadOptions {
        strict_users: config.analysis.strict_users,
        show_progress: !args.quiet,
    };
    let dataset = dataset::load_dataset(&source, options)
        .await
        .context("Failed to load datasets")?;

    println!("\n📝 Generating report...");
    let report_options = config.report_options(source.describe(), &args);
    let duration = start_time.elapsed().as_secs_f64();
    let report = report::build_report(&dataset, &report_options, duration);

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(&config.report.output, &output).with_context(|| {
        format!(
            "Failed to write report to {}",
            config.report.output.display()
        )
    })?;

    print_summary(&report);
    println!(
        "\n✅ Report complete! Saved to: {}",
        config.report.output.display()
    );

    let code = exit_code(&report.validation.summary, args.fail_on_invalid);
    if code == 2 {
        eprintln!(
            "\n⛔ {} invalid records were rejected. Failing (exit code 2).",
            report.validation.summary.total_invalid()
        );
    }

    Ok(code)
}

/// 2 when rejections should fail the run, 0 otherwise.
fn exit_code(summary: &ValidationSummary, fail_on_invalid: bool) -> i32 {
    if fail_on_invalid && summary.total_invalid() > 0 {
        2
    } else {
        0
    }
}

/// Build the data source from `--local` or the API settings.
fn build_source(args: &Args, config: &Config) -> Result<DataSource> {
    if let Some(ref dir) = args.local {
        info!("Using local directory: {}", dir.display());
        return Ok(DataSource::Local(LocalSource::new(dir.clone())));
    }

    let client = ApiClient::new(
        &config.api.base_url,
        config.api.timeout_seconds,
        config.retry_policy(),
    )
    .context("Failed to create HTTP client")?;
    Ok(DataSource::Remote(client))
}

/// Handle --dry-run: list what would be read, exit.
fn handle_dry_run(source: &DataSource) -> Result<i32> {
    println!("\n🔍 Dry run: nothing will be fetched.\n");
    for line in dry_run_lines(source) {
        println!("   📄 {}", line);
    }
    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// One line per resource with the URL or file it would be read from.
fn dry_run_lines(source: &DataSource) -> Vec<String> {
    Resource::ALL
        .iter()
        .map(|&resource| format!("{:<9} {}", resource, source.location(resource)))
        .collect()
}

/// Print the headline numbers to the console.
fn print_summary(report: &AnalyticsReport) {
    let summary = &report.validation.summary;

    println!("\n📊 Validation:");
    for resource in Resource::ALL {
        let counts = summary.get(resource);
        println!(
            "   {:<9} valid: {:>4} | invalid: {:>3}",
            resource, counts.valid, counts.invalid
        );
    }

    println!("\n📈 Highlights:");
    println!(
        "   Users with incomplete addresses: {}",
        report.users.incomplete_addresses.len()
    );
    if let Some(ref top) = report.users.top_company {
        println!("   Company with most users: {} ({})", top.company, top.count);
    }
    if let Some(first) = report.comments.top_commenters.first() {
        println!("   Top commenter: {} ({} comments)", first.email, first.count);
    }
    println!(
        "   Duplicate comments: {}",
        report.comments.duplicates.len()
    );
    println!(
        "   Comments containing \"{}\": {}",
        report.comments.keyword, report.comments.keyword_matches
    );
    if let Some(ref most) = report.albums.most_albums {
        println!(
            "   User with most albums: {} ({} albums)",
            most.user_id, most.count
        );
    }
    println!(
        "   Average albums per user: {:.2}",
        report.albums.avg_albums_per_user
    );
    println!(
        "   Inactive users: {}",
        report.albums.inactive_users.len()
    );
    if let Some(ref city) = report.comments.busiest_city {
        println!("   City with most comments: {} ({})", city.city, city.count);
    }
    println!(
        "   Posts with the word \"{}\": {}",
        report.posts.keyword_results.keyword, report.posts.keyword_results.total
    );
    match report.lookup.user {
        Some(ref user) => println!("   Lookup: {} with {} posts", user, report.lookup.posts.len()),
        None => println!("   Lookup: no user with email {}", report.lookup.email),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
