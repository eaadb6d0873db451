//! Filter command: full-text filter over a dive log

use crate::cli::FilterArgs;
use crate::dive_file::DiveLogFile;
use crate::output::OutputWriter;
use crate::output_types::{DiveRow, FilterOutput, TripRow};
use anyhow::Result;
use divelog_core::config::LayeredConfig;
use divelog_list::FilteredDiveList;

pub fn execute(args: FilterArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let log = DiveLogFile::load(&args.dives)?;
    let options = config.filter_options();

    let mut list = FilteredDiveList::new(options);
    list.add_all(log.dives);
    list.set_trips(log.trips.iter().cloned());
    list.set_filter(args.text.as_str());

    let dives: Vec<DiveRow> = (0..list.row_count())
        .filter_map(|row| list.at(row))
        .map(|dive| DiveRow {
            number: dive.number,
            date: dive.when.format("%Y-%m-%d %H:%M").to_string(),
            location: dive.location.clone(),
            buddy: dive.buddy.clone(),
        })
        .collect();

    let trips: Vec<TripRow> = log
        .trips
        .iter()
        .filter_map(|trip| {
            list.trip(trip.id).map(|group| TripRow {
                location: trip.location.clone(),
                shown: group.shown,
                total: group.total,
            })
        })
        .collect();

    let result = FilterOutput {
        filter: list.filter_text().to_string(),
        case_sensitive: options.case_sensitive,
        include_notes: options.include_notes,
        shown: list.shown(),
        total: list.source().row_count(),
        dives,
        trips,
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Dives");
    output.table(result.dives);
    if !result.trips.is_empty() {
        output.section("Trips");
        output.table(result.trips);
    }
    output.kv("Shown", format!("{} of {}", result.shown, result.total));
    Ok(())
}
