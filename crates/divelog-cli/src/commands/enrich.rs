//! Enrich command: reverse geocode every site of a file and write it back

use super::{build_geocoder, spinner, wait_for_batch};
use crate::cli::EnrichArgs;
use crate::output::OutputWriter;
use crate::output_types::{EnrichOutput, SiteSummary};
use anyhow::{Context, Result};
use divelog_core::config::LayeredConfig;
use divelog_core::ports::CollectingReporter;
use divelog_store::MemorySiteStore;

pub fn execute(args: EnrichArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let store = MemorySiteStore::load_json(&args.sites)
        .with_context(|| format!("Failed to load dive sites from {}", args.sites.display()))?;
    let reporter = CollectingReporter::new();
    let geocoder = build_geocoder(config, &store, &reporter)?;

    let mut skipped = 0;
    for site in store.all() {
        match site.coordinate {
            Some(coordinate) => geocoder.enqueue(coordinate, site.id),
            None => skipped += 1,
        }
    }

    let spinner = spinner(output, &format!("Looking up {} site(s)", geocoder.pending()));
    let report = wait_for_batch(geocoder.spawn_batch()?, &spinner)?;

    let written_to = if store.is_changed() {
        let target = args.output.as_ref().unwrap_or(&args.sites);
        store
            .save_json(target)
            .with_context(|| format!("Failed to write dive sites to {}", target.display()))?;
        Some(target.display().to_string())
    } else {
        None
    };

    let sites: Vec<SiteSummary> = store.all().iter().map(SiteSummary::from_site).collect();
    let errors = reporter.drain();

    if output.is_json() {
        return output.result(EnrichOutput {
            processed: report.processed,
            enriched: report.enriched,
            skipped_without_coordinates: skipped,
            written_to,
            sites,
            errors,
        });
    }

    output.success(format!(
        "Processed {} site(s), {} enriched",
        report.processed, report.enriched
    ));
    if skipped > 0 {
        output.info(format!("{} site(s) without coordinates skipped", skipped));
    }
    output.table(sites);
    for error in errors {
        output.warning(error);
    }
    match written_to {
        Some(path) => output.success(format!("Wrote {}", path)),
        None => output.info("No changes to write"),
    }
    Ok(())
}
