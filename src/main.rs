// Command-line runner for tubescrape jobs files.
//
// Usage: kodegen-tubescrape <jobs.json>
// Records are printed to stdout as one JSON document per job; logs go to
// stderr (filter with RUST_LOG).

use anyhow::{Context, Result, bail};
use kodegen_tools_tubescrape::jobs::{JobsFile, is_session_closed, run_job};
use kodegen_tools_tubescrape::{LocatorCatalog, Scraper, launch_browser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(jobs_path) = std::env::args().nth(1) else {
        bail!("usage: kodegen-tubescrape <jobs.json>");
    };

    let jobs = JobsFile::load(&jobs_path).await?;
    let catalog = LocatorCatalog::from_path(jobs.config.catalog_path())
        .await
        .context("Failed to load locator catalog")?;
    let scraper = Scraper::new(jobs.config.clone(), catalog)?;

    let browser = launch_browser(scraper.config()).await?;
    let session = browser.new_session().await?;

    let mut failed = 0usize;
    for (index, job) in jobs.jobs.iter().enumerate() {
        match run_job(&scraper, &session, job).await {
            Ok(output) => {
                let json = serde_json::to_string_pretty(&output)
                    .context("Failed to serialize job output")?;
                println!("{json}");
            }
            Err(e) if is_session_closed(&e) => {
                error!(job = index + 1, "Browser session closed: {e:#}");
                browser.shutdown().await?;
                return Err(e);
            }
            Err(e) => {
                failed += 1;
                error!(job = index + 1, kind = job.kind(), "Job failed: {e:#}");
            }
        }
    }

    info!(jobs = jobs.jobs.len(), failed, "All jobs finished");
    browser.shutdown().await?;
    Ok(())
}
