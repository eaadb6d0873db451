//! Divelog List - Dive list models
//!
//! A source list of dives with row change notifications, and a filtered
//! projection over it that keeps per-trip visible dive counts up to date.

pub mod filter;
pub mod model;

pub use divelog_core::config::FilterOptions;
pub use filter::{FilteredDiveList, TripGroup};
pub use model::{DiveListModel, DiveRole, ListChange, RoleValue};
