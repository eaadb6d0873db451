//! Scenario and property tests for the filtered dive list

use chrono::{Duration, TimeZone, Utc};
use divelog_core::models::{Dive, DiveId, Trip, TripId};
use divelog_list::{DiveRole, FilterOptions, FilteredDiveList, ListChange, RoleValue};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn dive(id: u32, location: &str, trip: Option<u32>) -> Dive {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 9, 0, 0).unwrap();
    let mut dive = Dive::new(DiveId(id), id, start + Duration::days(id as i64));
    dive.location = location.to_string();
    dive.trip = trip.map(TripId);
    dive
}

fn dive_log() -> Vec<Dive> {
    vec![
        dive(1, "Barracuda Point", Some(1)),
        dive(2, "Mandarin Fish House", Some(1)),
        dive(3, "Barracuda Reef", Some(2)),
    ]
}

#[test]
fn test_filter_matching_first_and_last_rows() {
    let mut list = FilteredDiveList::new(FilterOptions::default());
    list.add_all(dive_log());
    list.set_trips(vec![
        Trip { id: TripId(1), location: "Sipadan".to_string(), dive_count: 2 },
        Trip { id: TripId(2), location: "Mabul".to_string(), dive_count: 1 },
    ]);

    list.set_filter("barracuda");

    assert_eq!(list.shown(), 2);
    assert!(list.filter_accepts(0));
    assert!(!list.filter_accepts(1));
    assert!(list.filter_accepts(2));
    assert_eq!(list.trip(TripId(1)).unwrap().shown, 1);
    assert_eq!(list.trip(TripId(2)).unwrap().shown, 1);
}

#[test]
fn test_add_all_twice_does_not_duplicate() {
    let mut list = FilteredDiveList::new(FilterOptions::default());

    assert_eq!(list.add_all(dive_log()), 3);
    assert_eq!(list.add_all(dive_log()), 0);

    assert_eq!(list.source().row_count(), 3);
    assert_eq!(list.shown(), 3);
}

#[test]
fn test_add_all_appends_only_new_dives() {
    let mut list = FilteredDiveList::new(FilterOptions::default());
    list.add_all(dive_log());

    let mut extended = dive_log();
    extended.push(dive(4, "Lobster Wall", None));
    assert_eq!(list.add_all(extended), 1);
    assert_eq!(list.dive_id(3), Some(DiveId(4)));
}

#[test]
fn test_observers_see_row_ranges_and_filter_changes() {
    let mut list = FilteredDiveList::new(FilterOptions::default());
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    list.subscribe(move |change| sink.borrow_mut().push(*change));

    list.add_all(dive_log());
    list.set_filter("reef");

    assert_eq!(
        *changes.borrow(),
        vec![
            ListChange::AboutToInsert { first: 0, last: 2 },
            ListChange::Inserted { first: 0, last: 2 },
            ListChange::FilterInvalidated,
            ListChange::FilterInvalidated,
        ]
    );
}

#[test]
fn test_reset_filter_after_filtering() {
    let mut list = FilteredDiveList::new(FilterOptions::default());
    list.add_all(dive_log());
    list.set_filter("mandarin");
    assert_eq!(list.shown(), 1);

    list.reset_filter();

    assert_eq!(list.filter_text(), "");
    assert_eq!(list.shown(), 3);
    assert!(list.filter_accepts(7));
}

#[test]
fn test_data_maps_through_filter() {
    let mut list = FilteredDiveList::new(FilterOptions::default());
    list.add_all(dive_log());
    list.set_filter("mandarin");

    match list.data(0, DiveRole::Dive) {
        Some(RoleValue::Dive(dive)) => assert_eq!(dive.id, DiveId(2)),
        other => panic!("unexpected value: {:?}", other),
    }
    assert_eq!(list.index_of_id(DiveId(2)), Some(0));
    assert_eq!(list.index_of_id(DiveId(1)), None);
}

#[test]
fn test_start_add_dive_is_visible_without_filter() {
    let mut list = FilteredDiveList::new(FilterOptions::default());
    list.add_all(dive_log());

    let id = list.start_add_dive(Utc::now());

    assert_eq!(id, DiveId(4));
    assert_eq!(list.index_of_id(id), Some(3));
}

fn arb_dive() -> impl Strategy<Value = (String, String)> {
    ("[a-cA-C ]{0,12}", "[a-cA-C ]{0,12}")
}

proptest! {
    #[test]
    fn prop_filter_accepts_iff_text_contains(
        fields in prop::collection::vec(arb_dive(), 0..12),
        needle in "[a-cA-C]{1,3}",
        case_sensitive in any::<bool>(),
        include_notes in any::<bool>(),
    ) {
        let dives: Vec<Dive> = fields
            .iter()
            .enumerate()
            .map(|(i, (location, notes))| {
                let mut d = dive(i as u32 + 1, location, None);
                d.notes = notes.clone();
                d
            })
            .collect();

        let mut list = FilteredDiveList::new(FilterOptions { case_sensitive, include_notes });
        list.add_all(dives.clone());
        list.set_filter(needle.clone());

        for (row, dive) in dives.iter().enumerate() {
            let text = if include_notes { dive.full_text() } else { dive.full_text_no_notes() };
            let expected = if case_sensitive {
                text.contains(&needle)
            } else {
                text.to_lowercase().contains(&needle.to_lowercase())
            };
            prop_assert_eq!(list.filter_accepts(row), expected);
        }
        prop_assert_eq!(
            list.shown(),
            (0..dives.len()).filter(|row| list.filter_accepts(*row)).count()
        );
    }

    #[test]
    fn prop_reset_accepts_every_row(row in 0usize..1000, needle in "[a-z]{1,4}") {
        let mut list = FilteredDiveList::new(FilterOptions::default());
        list.add_all(dive_log());
        list.set_filter(needle);
        list.reset_filter();
        prop_assert!(list.filter_accepts(row));
    }
}
