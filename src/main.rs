// src/main.rs
mod catalog;
mod extractors;
mod runner;
mod storage;
mod utils;

use std::time::Duration;

use clap::Parser;
use catalog::models::{CatalogSite, DepartmentCode, DEFAULT_COURSES_URL, DEFAULT_INDEX_URL};
use catalog::HttpFetcher;
use extractors::courses::{COURSE_DESCRIPTION_SELECTOR, COURSE_HEADER_SELECTOR};
use extractors::{CourseExtractor, PatternHeaderRule};
use runner::{FailurePolicy, RunConfig, Runner};
use storage::StorageManager;
use utils::AppError;

/// Scrapes the course catalog into one CSV file per department
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog front page listing every department
    #[arg(long, default_value = DEFAULT_INDEX_URL)]
    index_url: String,

    /// Directory holding the per-department `<CODE>.html` pages
    #[arg(long, default_value = DEFAULT_COURSES_URL)]
    courses_url: String,

    /// Output directory for the CSV files and run summary
    #[arg(short, long, default_value = "data")]
    output_dir: String,

    /// Only scrape these departments (repeatable, e.g. -d CSE -d MATH)
    #[arg(short, long = "department")]
    departments: Vec<String>,

    /// Abort on the first department that fails instead of continuing
    #[arg(long)]
    fail_fast: bool,

    /// Override the course header regex (three groups: code, name, units)
    #[arg(long)]
    header_pattern: Option<String>,

    /// CSS selector for course header elements
    #[arg(long, default_value = COURSE_HEADER_SELECTOR)]
    header_selector: String,

    /// CSS selector for course description elements
    #[arg(long, default_value = COURSE_DESCRIPTION_SELECTOR)]
    description_selector: String,

    /// HTTP timeout in seconds (transport default when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Pause before each request, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    let only = args.departments.iter()
        .map(|raw| {
            DepartmentCode::parse(&raw.to_uppercase())
                .ok_or_else(|| AppError::Config(format!("'{}' is not a department code", raw)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // 3. Initialize collaborators
    let fetcher = HttpFetcher::new(
        args.timeout_secs.map(Duration::from_secs),
        Duration::from_millis(args.delay_ms),
    )?;

    let mut extractor = CourseExtractor::new()
        .with_selectors(&args.header_selector, &args.description_selector)?;
    if let Some(pattern) = &args.header_pattern {
        extractor = extractor.with_rule(PatternHeaderRule::new(pattern)?);
    }

    let storage = StorageManager::new(&args.output_dir)?;

    let config = RunConfig {
        site: CatalogSite {
            index_url: args.index_url,
            courses_url: args.courses_url,
        },
        only,
        policy: if args.fail_fast { FailurePolicy::FailFast } else { FailurePolicy::Continue },
    };

    // 4. Scrape
    let report = Runner::new(&fetcher, &extractor, &storage, config).run().await?;

    if let Err(e) = storage.save_run_summary(&report) {
        tracing::error!("Failed to save run summary: {}", e);
    }

    if !report.failed.is_empty() {
        let names: Vec<&str> = report.failed.iter().map(|f| f.department.as_str()).collect();
        return Err(AppError::Processing(format!(
            "{} of {} departments failed: {}",
            report.failed.len(),
            report.failed.len() + report.completed.len(),
            names.join(", ")
        )));
    }

    tracing::info!("All departments scraped successfully.");
    Ok(())
}
