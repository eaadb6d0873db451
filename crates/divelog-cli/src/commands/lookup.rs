//! Lookup command: reverse geocode one coordinate

use super::{build_geocoder, spinner, wait_for_batch};
use crate::cli::LookupArgs;
use crate::output::OutputWriter;
use crate::output_types::{LookupOutput, TaxonomyRow};
use anyhow::{Context, Result};
use divelog_core::config::LayeredConfig;
use divelog_core::models::{Coordinate, DiveSite};
use divelog_core::ports::{CollectingReporter, SiteRepository};
use divelog_store::MemorySiteStore;

pub fn execute(args: LookupArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let coordinate = Coordinate::from_degrees(args.lat, args.lon)
        .context("Invalid coordinates")?;

    let store = MemorySiteStore::new();
    let reporter = CollectingReporter::new();
    let geocoder = build_geocoder(config, &store, &reporter)?;

    let site = DiveSite::new(args.name, Some(coordinate));
    let id = store.insert(site.clone());

    let spinner = spinner(output, &format!("Looking up {}", coordinate));
    wait_for_batch(geocoder.spawn_lookup(&site)?, &spinner)?;

    let site = store.get_site(id).unwrap_or(site);
    let taxonomy = TaxonomyRow::rows(&site);
    let errors = reporter.drain();

    if output.is_json() {
        return output.result(LookupOutput {
            latitude: coordinate.latitude().as_degrees(),
            longitude: coordinate.longitude().as_degrees(),
            taxonomy,
            errors,
        });
    }

    output.section(format!("{} ({})", site.name, coordinate));
    if taxonomy.is_empty() {
        output.info("No location information found");
    } else {
        output.table(taxonomy);
    }
    for error in errors {
        output.warning(error);
    }
    Ok(())
}
