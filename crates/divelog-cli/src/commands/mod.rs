//! Command implementations

mod config;
mod enrich;
mod filter;
mod lookup;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::progress;
use anyhow::{anyhow, Context, Result};
use divelog_core::config::LayeredConfig;
use divelog_core::ports::CollectingReporter;
use divelog_geocode::{BatchReport, ReqwestFetcher, ReverseGeocoder};
use divelog_store::MemorySiteStore;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let mut overrides = cli.overrides.into_overrides();

    if let Commands::Filter(args) = &cli.command {
        let filter = args.overrides();
        overrides.filter_case_sensitive = filter.filter_case_sensitive;
        overrides.filter_include_notes = filter.filter_include_notes;
    }
    let config = load_config(cli.config.as_deref(), overrides)?;

    match cli.command {
        Commands::Lookup(args) => lookup::execute(args, &config, &output),
        Commands::Enrich(args) => enrich::execute(args, &config, &output),
        Commands::Filter(args) => filter::execute(args, &config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}

/// Wire a geocoder to `store`, reporting user-facing errors into `reporter`
fn build_geocoder(
    config: &LayeredConfig,
    store: &MemorySiteStore,
    reporter: &CollectingReporter,
) -> Result<Arc<ReverseGeocoder>> {
    config.validate().context("Invalid geocoding configuration")?;
    let settings = config.geocode_settings();
    let fetcher = ReqwestFetcher::new(&settings.user_agent)?;

    Ok(Arc::new(ReverseGeocoder::new(
        settings,
        Arc::new(fetcher),
        Arc::new(store.clone()),
        Arc::new(reporter.clone()),
    )))
}

fn spinner(output: &OutputWriter, message: &str) -> ProgressBar {
    if output.is_json() {
        progress::hidden()
    } else {
        progress::create_spinner(message)
    }
}

/// Block until the background drain finishes, ticking `spinner` meanwhile
fn wait_for_batch(handle: JoinHandle<BatchReport>, spinner: &ProgressBar) -> Result<BatchReport> {
    match handle.join() {
        Ok(report) => {
            progress::finish_success(spinner, &format!("Looked up {} site(s)", report.processed));
            Ok(report)
        }
        Err(_) => {
            progress::finish_error(spinner, "Reverse geocoding failed");
            Err(anyhow!("reverse geocoding thread panicked"))
        }
    }
}
