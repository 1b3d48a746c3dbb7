//! # hbjzxh_notices
//!
//! Collects notices published in the news column of the Hubei construction
//! supervision association site (<https://www.hbjzxh.org.cn>) into Markdown
//! files, one per article, each with a TextRank summary and links to the
//! article's downloaded attachments.
//!
//! ## Usage
//!
//! ```sh
//! hbjzxh_notices
//! hbjzxh_notices --output-dir ./notices --attachments-dir ./files
//! ```
//!
//! ## Pipeline
//!
//! 1. **Setup**: create the attachment and notice directories
//! 2. **Listing**: POST to the AJAX listing endpoint and decode `domStr`
//! 3. **Articles**: fetch each article, summarize, download attachments
//! 4. **Output**: write `<title>.md` per article
//!
//! A failure in one article never stops the run; the process exits with a
//! non-zero status only when setup or listing retrieval fails.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod client;
mod config;
mod errors;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod summarizer;
mod utils;

use cli::Cli;
use client::HttpFetcher;
use summarizer::Summarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "hbjzxh_notices starting up");

    let args = Cli::parse();
    let settings = match args.settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Could not load settings");
            return Err(e.into());
        }
    };
    debug!(?settings, "Resolved settings");

    let fetcher = HttpFetcher::new(reqwest::Client::builder().build()?);
    let summarizer = Summarizer::new();

    let report = match pipeline::run(&fetcher, &summarizer, &settings).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Run aborted");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        written = report.written,
        failed = report.failed,
        notices = %settings.output_dir.display(),
        "Execution complete"
    );
    Ok(())
}
