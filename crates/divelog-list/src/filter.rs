//! Full-text filtered projection over the dive list.
//!
//! Filter membership is recomputed in full on every filter or list change;
//! a single user's dive log holds thousands of dives, not millions.

use divelog_core::config::FilterOptions;
use divelog_core::models::{Dive, DiveId, Trip, TripId};

use crate::model::{DiveListModel, DiveRole, ListChange, RoleValue};

/// Visible dive count of one trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripGroup {
    pub id: TripId,
    /// Dives in the trip, ignoring the filter
    pub total: usize,
    /// Dives of the trip currently passing the filter
    pub shown: usize,
}

/// Dive list filtered by a substring of each dive's full text.
///
/// Row indices passed to the mutating methods refer to the source list;
/// indices passed to `data`, `dive_id` and returned by `index_of_id` refer to
/// the filtered rows.
#[derive(Debug, Default)]
pub struct FilteredDiveList {
    source: DiveListModel,
    options: FilterOptions,
    filter_text: String,
    /// Match result per source row; empty means "accept all"
    filtered_rows: Vec<bool>,
    /// Source row of every visible row
    visible: Vec<usize>,
    trips: Vec<TripGroup>,
}

impl FilteredDiveList {
    pub fn new(options: FilterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Wrap an existing source list
    pub fn with_source(source: DiveListModel, options: FilterOptions) -> Self {
        let mut list = Self::new(options);
        list.source = source;
        list.refresh();
        list
    }

    pub fn source(&self) -> &DiveListModel {
        &self.source
    }

    /// Register an observer for row and filter changes
    pub fn subscribe(&mut self, observer: impl FnMut(&ListChange) + 'static) {
        self.source.subscribe(observer);
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// Change case sensitivity or notes inclusion and re-apply the current filter
    pub fn set_options(&mut self, options: FilterOptions) {
        if self.options == options {
            return;
        }
        self.options = options;
        self.refresh();
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.update_filter_state();
        self.invalidate_filter();
        self.recompute_group_counts();
    }

    /// Show every dive again
    pub fn reset_filter(&mut self) {
        self.filter_text.clear();
        self.filtered_rows.clear();
        self.invalidate_filter();
        self.recompute_group_counts();
    }

    /// Whether source row `row` passes the filter.
    ///
    /// Rows beyond the computed state are accepted.
    pub fn filter_accepts(&self, row: usize) -> bool {
        self.filtered_rows.get(row).copied().unwrap_or(true)
    }

    fn update_filter_state(&mut self) {
        self.filtered_rows.clear();
        if self.filter_text.is_empty() {
            return;
        }

        let FilterOptions {
            case_sensitive,
            include_notes,
        } = self.options;
        let needle = if case_sensitive {
            self.filter_text.clone()
        } else {
            self.filter_text.to_lowercase()
        };

        self.filtered_rows = self
            .source
            .iter()
            .map(|dive| {
                let text = if include_notes {
                    dive.full_text()
                } else {
                    dive.full_text_no_notes()
                };
                if case_sensitive {
                    text.contains(&needle)
                } else {
                    text.to_lowercase().contains(&needle)
                }
            })
            .collect();
    }

    fn invalidate_filter(&mut self) {
        self.visible = (0..self.source.row_count())
            .filter(|row| self.filter_accepts(*row))
            .collect();
        tracing::trace!(
            filter = %self.filter_text,
            shown = self.visible.len(),
            total = self.source.row_count(),
            "dive list filter applied"
        );
        self.source.emit(ListChange::FilterInvalidated);
    }

    /// Recount the visible dives of every trip.
    ///
    /// With no visible rows at all every trip reports its full size.
    pub fn recompute_group_counts(&mut self) {
        let row_count = self.row_count();
        for trip in &mut self.trips {
            trip.shown = if row_count == 0 { trip.total } else { 0 };
        }

        for &row in &self.visible {
            let Some(trip_id) = self.source.at(row).and_then(|dive| dive.trip) else {
                continue;
            };
            if let Some(trip) = self.trips.iter_mut().find(|trip| trip.id == trip_id) {
                trip.shown += 1;
            }
        }
    }

    fn refresh(&mut self) {
        self.update_filter_state();
        self.invalidate_filter();
        self.recompute_group_counts();
    }

    /// Replace the known trips
    pub fn set_trips(&mut self, trips: impl IntoIterator<Item = Trip>) {
        self.trips = trips
            .into_iter()
            .map(|trip| TripGroup {
                id: trip.id,
                total: trip.dive_count,
                shown: trip.dive_count,
            })
            .collect();
        self.recompute_group_counts();
    }

    pub fn trips(&self) -> &[TripGroup] {
        &self.trips
    }

    pub fn trip(&self, id: TripId) -> Option<&TripGroup> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    /// Number of visible rows
    pub fn row_count(&self) -> usize {
        self.visible.len()
    }

    /// Number of dives currently shown
    pub fn shown(&self) -> usize {
        self.row_count()
    }

    /// Role data of visible row `row`
    pub fn data(&self, row: usize, role: DiveRole) -> Option<RoleValue<'_>> {
        self.source.data(*self.visible.get(row)?, role)
    }

    pub fn role_names(&self) -> Vec<(DiveRole, &'static str)> {
        self.source.role_names()
    }

    /// Dive at visible row `row`
    pub fn at(&self, row: usize) -> Option<&Dive> {
        self.source.at(*self.visible.get(row)?)
    }

    /// Id of the dive at visible row `row`
    pub fn dive_id(&self, row: usize) -> Option<DiveId> {
        self.at(row).map(|dive| dive.id)
    }

    /// Visible row of the dive with `id`
    pub fn index_of_id(&self, id: DiveId) -> Option<usize> {
        (0..self.row_count()).find(|row| self.dive_id(*row) == Some(id))
    }

    pub fn insert(&mut self, index: usize, dive: Dive) -> usize {
        let index = self.source.insert(index, dive);
        self.refresh();
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<Dive> {
        let removed = self.source.remove(index);
        if removed.is_some() {
            self.refresh();
        }
        removed
    }

    pub fn remove_by_id(&mut self, id: DiveId) -> Option<Dive> {
        let removed = self.source.remove_by_id(id);
        if removed.is_some() {
            self.refresh();
        }
        removed
    }

    pub fn update(&mut self, index: usize, dive: Dive) -> bool {
        let updated = self.source.update(index, dive);
        if updated {
            self.refresh();
        }
        updated
    }

    pub fn clear(&mut self) {
        self.source.clear();
        self.refresh();
    }

    /// Append every dive not yet in the list and re-apply the filter
    pub fn add_all(&mut self, dives: impl IntoIterator<Item = Dive>) -> usize {
        let added = self.source.add_all(dives);
        self.refresh();
        added
    }

    /// Append a new, empty dive; see [`DiveListModel::start_add_dive`]
    pub fn start_add_dive(&mut self, now: chrono::DateTime<chrono::Utc>) -> DiveId {
        let id = self.source.start_add_dive(now);
        self.refresh();
        id
    }
}
