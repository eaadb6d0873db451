//! Source dive list with row change notifications.

use chrono::{DateTime, Utc};
use divelog_core::models::{Dive, DiveId};
use std::collections::HashSet;
use std::fmt;

/// Dive model recorded for dives created by hand
pub const MANUAL_DIVE_MODEL: &str = "manually added dive";

/// Row change announced to observers.
///
/// Structural changes come in pairs: the `AboutTo*` variant before the rows
/// move, the matching past-tense variant after. Ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    AboutToInsert { first: usize, last: usize },
    Inserted { first: usize, last: usize },
    AboutToRemove { first: usize, last: usize },
    Removed { first: usize, last: usize },
    AboutToReset,
    Reset,
    /// The filtered projection changed without a structural change of the source
    FilterInvalidated,
}

/// Data roles exposed to list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiveRole {
    /// The dive itself
    Dive,
    /// Start time in seconds since the epoch
    Date,
    FullText,
    FullTextNoNotes,
}

impl DiveRole {
    pub const ALL: [DiveRole; 4] = [
        DiveRole::Dive,
        DiveRole::Date,
        DiveRole::FullText,
        DiveRole::FullTextNoNotes,
    ];

    /// Name under which views address the role
    pub fn name(&self) -> &'static str {
        match self {
            DiveRole::Dive => "dive",
            DiveRole::Date => "date",
            DiveRole::FullText => "fulltext",
            DiveRole::FullTextNoNotes => "fulltextnonotes",
        }
    }
}

/// Value returned for a role
#[derive(Debug, Clone, PartialEq)]
pub enum RoleValue<'a> {
    Dive(&'a Dive),
    Timestamp(i64),
    Text(String),
}

type Observer = Box<dyn FnMut(&ListChange)>;

/// Ordered list of dives.
///
/// Every mutation is announced to observers with the exact range of rows
/// affected.
#[derive(Default)]
pub struct DiveListModel {
    dives: Vec<Dive>,
    observers: Vec<Observer>,
}

impl fmt::Debug for DiveListModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiveListModel")
            .field("rows", &self.dives.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DiveListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for row changes
    pub fn subscribe(&mut self, observer: impl FnMut(&ListChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub(crate) fn emit(&mut self, change: ListChange) {
        for observer in &mut self.observers {
            observer(&change);
        }
    }

    pub fn row_count(&self) -> usize {
        self.dives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dive> {
        self.dives.iter()
    }

    /// Append dives at the end
    pub fn add_dives(&mut self, dives: Vec<Dive>) {
        if dives.is_empty() {
            return;
        }

        let first = self.dives.len();
        let last = first + dives.len() - 1;
        self.emit(ListChange::AboutToInsert { first, last });
        self.dives.extend(dives);
        self.emit(ListChange::Inserted { first, last });
    }

    /// Append every dive of `dives` not already in the list.
    ///
    /// Returns the number of dives added.
    pub fn add_all(&mut self, dives: impl IntoIterator<Item = Dive>) -> usize {
        let mut present: HashSet<DiveId> = self.dives.iter().map(|dive| dive.id).collect();
        let new_dives: Vec<Dive> = dives.into_iter().filter(|dive| present.insert(dive.id)).collect();

        let added = new_dives.len();
        self.add_dives(new_dives);
        added
    }

    /// Insert a dive at `index`; indices past the end append
    pub fn insert(&mut self, index: usize, dive: Dive) -> usize {
        let index = index.min(self.dives.len());
        self.emit(ListChange::AboutToInsert { first: index, last: index });
        self.dives.insert(index, dive);
        self.emit(ListChange::Inserted { first: index, last: index });
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<Dive> {
        if index >= self.dives.len() {
            return None;
        }

        self.emit(ListChange::AboutToRemove { first: index, last: index });
        let dive = self.dives.remove(index);
        self.emit(ListChange::Removed { first: index, last: index });
        Some(dive)
    }

    pub fn remove_by_id(&mut self, id: DiveId) -> Option<Dive> {
        let index = self.dive_index(id)?;
        self.remove(index)
    }

    /// Replace the dive at `index`.
    ///
    /// Done as a removal followed by an insertion at the same row, so views
    /// treat the dive as entirely new instead of caching stale fields.
    pub fn update(&mut self, index: usize, dive: Dive) -> bool {
        if self.remove(index).is_none() {
            return false;
        }
        self.insert(index, dive);
        true
    }

    pub fn clear(&mut self) {
        if self.dives.is_empty() {
            return;
        }

        let last = self.dives.len() - 1;
        self.emit(ListChange::AboutToRemove { first: 0, last });
        self.dives.clear();
        self.emit(ListChange::Removed { first: 0, last });
    }

    /// Tell observers to drop everything they cached about the list
    pub fn reset(&mut self) {
        self.emit(ListChange::AboutToReset);
        self.emit(ListChange::Reset);
    }

    pub fn at(&self, index: usize) -> Option<&Dive> {
        self.dives.get(index)
    }

    pub fn dive_id(&self, index: usize) -> Option<DiveId> {
        self.at(index).map(|dive| dive.id)
    }

    /// Row of the dive with `id`
    pub fn dive_index(&self, id: DiveId) -> Option<usize> {
        self.dives.iter().position(|dive| dive.id == id)
    }

    pub fn data(&self, row: usize, role: DiveRole) -> Option<RoleValue<'_>> {
        let dive = self.at(row)?;
        Some(match role {
            DiveRole::Dive => RoleValue::Dive(dive),
            DiveRole::Date => RoleValue::Timestamp(dive.timestamp()),
            DiveRole::FullText => RoleValue::Text(dive.full_text()),
            DiveRole::FullTextNoNotes => RoleValue::Text(dive.full_text_no_notes()),
        })
    }

    /// Role name table for views
    pub fn role_names(&self) -> Vec<(DiveRole, &'static str)> {
        DiveRole::ALL.iter().map(|role| (*role, role.name())).collect()
    }

    /// Create an empty dive starting `now`, numbered after the highest
    /// existing dive number, and append it. Returns its id.
    pub fn start_add_dive(&mut self, now: DateTime<Utc>) -> DiveId {
        let number = self
            .dives
            .iter()
            .map(|dive| dive.number)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let id = self.next_dive_id();

        let mut dive = Dive::new(id, number, now);
        dive.dive_computer = MANUAL_DIVE_MODEL.to_string();
        tracing::debug!(%id, number, "starting manually added dive");

        self.add_dives(vec![dive]);
        id
    }

    /// One past the highest id, or the lowest free id once the highest is taken
    fn next_dive_id(&self) -> DiveId {
        let highest = self.dives.iter().map(|dive| dive.id.0).max();
        match highest.map(|max| max.checked_add(1)) {
            None => DiveId(1),
            Some(Some(next)) => DiveId(next),
            Some(None) => {
                let used: HashSet<u32> = self.dives.iter().map(|dive| dive.id.0).collect();
                DiveId((1..=u32::MAX).find(|id| !used.contains(id)).unwrap_or(0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dive(id: u32) -> Dive {
        Dive::new(DiveId(id), id, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
    }

    fn recorded(model: &mut DiveListModel) -> Rc<RefCell<Vec<ListChange>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        model.subscribe(move |change| sink.borrow_mut().push(*change));
        changes
    }

    #[test]
    fn test_add_dives_signals_range() {
        let mut model = DiveListModel::new();
        model.add_dives(vec![dive(1)]);
        let changes = recorded(&mut model);

        model.add_dives(vec![dive(2), dive(3)]);

        assert_eq!(
            *changes.borrow(),
            vec![
                ListChange::AboutToInsert { first: 1, last: 2 },
                ListChange::Inserted { first: 1, last: 2 },
            ]
        );
    }

    #[test]
    fn test_add_empty_is_silent() {
        let mut model = DiveListModel::new();
        let changes = recorded(&mut model);
        model.add_dives(Vec::new());
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_update_is_remove_then_insert() {
        let mut model = DiveListModel::new();
        model.add_dives(vec![dive(1), dive(2), dive(3)]);
        let changes = recorded(&mut model);

        let mut replacement = dive(2);
        replacement.location = "Manta Point".to_string();
        assert!(model.update(1, replacement));

        assert_eq!(
            *changes.borrow(),
            vec![
                ListChange::AboutToRemove { first: 1, last: 1 },
                ListChange::Removed { first: 1, last: 1 },
                ListChange::AboutToInsert { first: 1, last: 1 },
                ListChange::Inserted { first: 1, last: 1 },
            ]
        );
        assert_eq!(model.at(1).unwrap().location, "Manta Point");
        assert!(!model.update(9, dive(9)));
    }

    #[test]
    fn test_clear_signals_whole_range() {
        let mut model = DiveListModel::new();
        model.add_dives(vec![dive(1), dive(2)]);
        let changes = recorded(&mut model);

        model.clear();
        model.clear();

        assert_eq!(
            *changes.borrow(),
            vec![
                ListChange::AboutToRemove { first: 0, last: 1 },
                ListChange::Removed { first: 0, last: 1 },
            ]
        );
    }

    #[test]
    fn test_remove_by_id() {
        let mut model = DiveListModel::new();
        model.add_dives(vec![dive(4), dive(5)]);

        assert_eq!(model.remove_by_id(DiveId(5)).unwrap().id, DiveId(5));
        assert!(model.remove_by_id(DiveId(5)).is_none());
        assert_eq!(model.row_count(), 1);
    }

    #[test]
    fn test_lookup_helpers_bounds() {
        let mut model = DiveListModel::new();
        model.add_dives(vec![dive(10), dive(11)]);

        assert_eq!(model.dive_id(1), Some(DiveId(11)));
        assert_eq!(model.dive_id(2), None);
        assert_eq!(model.dive_index(DiveId(10)), Some(0));
        assert_eq!(model.dive_index(DiveId(99)), None);
        assert!(model.data(2, DiveRole::Date).is_none());
    }

    #[test]
    fn test_data_roles() {
        let mut model = DiveListModel::new();
        let mut first = dive(1);
        first.notes = "strong current".to_string();
        model.add_dives(vec![first]);

        assert!(matches!(model.data(0, DiveRole::Dive), Some(RoleValue::Dive(d)) if d.id == DiveId(1)));
        assert_eq!(
            model.data(0, DiveRole::Date),
            Some(RoleValue::Timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap().timestamp()))
        );
        match model.data(0, DiveRole::FullTextNoNotes) {
            Some(RoleValue::Text(text)) => assert!(!text.contains("current")),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_role_names() {
        let names: Vec<_> = DiveListModel::new().role_names().into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["dive", "date", "fulltext", "fulltextnonotes"]);
    }

    #[test]
    fn test_start_add_dive_numbers_after_highest() {
        let mut model = DiveListModel::new();
        let mut old = dive(3);
        old.number = 41;
        model.add_dives(vec![old, dive(7)]);

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let id = model.start_add_dive(now);

        assert_eq!(id, DiveId(8));
        let added = model.at(2).unwrap();
        assert_eq!(added.number, 42);
        assert_eq!(added.when, now);
        assert_eq!(added.dive_computer, MANUAL_DIVE_MODEL);
    }

    #[test]
    fn test_start_add_dive_after_highest_possible_id() {
        let mut model = DiveListModel::new();
        let mut last = dive(1);
        last.id = DiveId(u32::MAX);
        last.number = u32::MAX;
        model.add_dives(vec![dive(1), last]);

        let id = model.start_add_dive(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());

        assert_eq!(id, DiveId(2));
        assert_eq!(model.at(2).unwrap().number, u32::MAX);
        assert_eq!(model.dive_index(id), Some(2));
    }

    #[test]
    fn test_reset_pair() {
        let mut model = DiveListModel::new();
        let changes = recorded(&mut model);
        model.reset();
        assert_eq!(*changes.borrow(), vec![ListChange::AboutToReset, ListChange::Reset]);
    }
}
