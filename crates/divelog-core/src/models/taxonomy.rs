//! Hierarchical location taxonomy attached to dive sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic category kinds, ordered from least to most specific.
///
/// `Ocean` sits outside the political hierarchy and is filled from a separate
/// provider, which is why it precedes `Country`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxonomyKind {
    Ocean,
    Country,
    State,
    County,
    Town,
    City,
}

impl TaxonomyKind {
    /// Number of distinct kinds
    pub const COUNT: usize = 6;

    /// Every kind in specificity order
    pub const ALL: [TaxonomyKind; Self::COUNT] = [
        TaxonomyKind::Ocean,
        TaxonomyKind::Country,
        TaxonomyKind::State,
        TaxonomyKind::County,
        TaxonomyKind::Town,
        TaxonomyKind::City,
    ];

    /// Kinds supplied by the place-names provider (everything from `Country` onward)
    pub const PLACE_NAMES: [TaxonomyKind; Self::COUNT - 1] = [
        TaxonomyKind::Country,
        TaxonomyKind::State,
        TaxonomyKind::County,
        TaxonomyKind::Town,
        TaxonomyKind::City,
    ];

    /// Human readable category name
    pub fn display_name(&self) -> &'static str {
        match self {
            TaxonomyKind::Ocean => "Ocean",
            TaxonomyKind::Country => "Country",
            TaxonomyKind::State => "State",
            TaxonomyKind::County => "County",
            TaxonomyKind::Town => "Town",
            TaxonomyKind::City => "City",
        }
    }

    /// Field name used by the geonames.org JSON API for this kind
    pub fn api_field(&self) -> &'static str {
        match self {
            TaxonomyKind::Ocean => "name",
            TaxonomyKind::Country => "countryName",
            TaxonomyKind::State => "adminName1",
            TaxonomyKind::County => "adminName2",
            TaxonomyKind::Town => "toponymName",
            TaxonomyKind::City => "adminName3",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Where a taxonomy value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaxonomyOrigin {
    #[default]
    Unset,
    /// Typed in by the user
    UserEntered,
    /// Filled in by a reverse geocoding lookup
    Geocoded,
    /// Copied from another dive site
    Copied,
}

impl TaxonomyOrigin {
    /// Whether an automated lookup may overwrite a value with this origin
    pub fn yields_to_geocode(&self) -> bool {
        matches!(self, TaxonomyOrigin::Unset | TaxonomyOrigin::Geocoded)
    }
}

/// A single categorized name value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub kind: TaxonomyKind,
    pub value: String,
    pub origin: TaxonomyOrigin,
}

/// Ordered set of taxonomy entries, at most one per kind.
///
/// Storage is allocated on first write; a site that was never geocoded or
/// edited carries no backing vector at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<TaxonomyEntry>>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the backing storage if this is the first write. Idempotent.
    pub fn ensure_allocated(&mut self) -> &mut Vec<TaxonomyEntry> {
        self.categories.get_or_insert_with(|| Vec::with_capacity(TaxonomyKind::COUNT))
    }

    pub fn is_allocated(&self) -> bool {
        self.categories.is_some()
    }

    /// Write `value` for `kind`, replacing any existing entry of that kind.
    ///
    /// A geocoded write never replaces an entry whose origin is user entered
    /// or copied. Returns `true` if the taxonomy was modified.
    pub fn upsert(
        &mut self,
        kind: TaxonomyKind,
        value: impl Into<String>,
        origin: TaxonomyOrigin,
    ) -> bool {
        let value = value.into();
        let categories = self.ensure_allocated();

        match categories.iter_mut().find(|entry| entry.kind == kind) {
            Some(existing) => {
                if origin == TaxonomyOrigin::Geocoded && !existing.origin.yields_to_geocode() {
                    return false;
                }
                if existing.value == value && existing.origin == origin {
                    return false;
                }
                existing.value = value;
                existing.origin = origin;
                true
            }
            None => {
                categories.push(TaxonomyEntry { kind, value, origin });
                true
            }
        }
    }

    /// Add an entry at the next free slot without looking for an existing entry of `kind`
    pub fn append(&mut self, kind: TaxonomyKind, value: impl Into<String>, origin: TaxonomyOrigin) {
        self.ensure_allocated().push(TaxonomyEntry {
            kind,
            value: value.into(),
            origin,
        });
    }

    /// Direct user edit. An empty value removes the entry.
    pub fn set_user_value(&mut self, kind: TaxonomyKind, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return self.remove(kind).is_some();
        }
        self.upsert(kind, value, TaxonomyOrigin::UserEntered)
    }

    pub fn remove(&mut self, kind: TaxonomyKind) -> Option<TaxonomyEntry> {
        let categories = self.categories.as_mut()?;
        let position = categories.iter().position(|entry| entry.kind == kind)?;
        Some(categories.remove(position))
    }

    /// Drop geocoded place-name entries whose kind is not in `reported`.
    ///
    /// Used when a fresh lookup replaces the previous geocoded set. Ocean and
    /// non-geocoded entries are kept. Returns the number of removed entries.
    pub fn prune_stale_geocoded(&mut self, reported: &[TaxonomyKind]) -> usize {
        let Some(categories) = self.categories.as_mut() else {
            return 0;
        };

        let before = categories.len();
        categories.retain(|entry| {
            entry.kind == TaxonomyKind::Ocean
                || entry.origin != TaxonomyOrigin::Geocoded
                || reported.contains(&entry.kind)
        });
        before - categories.len()
    }

    pub fn get(&self, kind: TaxonomyKind) -> Option<&TaxonomyEntry> {
        self.iter().find(|entry| entry.kind == kind)
    }

    /// Value for `kind`, if present
    pub fn value(&self, kind: TaxonomyKind) -> Option<&str> {
        self.get(kind).map(|entry| entry.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.categories.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_allocation() {
        let mut taxonomy = Taxonomy::new();
        assert!(!taxonomy.is_allocated());
        assert!(taxonomy.is_empty());

        taxonomy.ensure_allocated();
        taxonomy.ensure_allocated();
        assert!(taxonomy.is_allocated());
        assert_eq!(taxonomy.len(), 0);
    }

    #[test]
    fn test_geocoded_overwrites_geocoded() {
        let mut taxonomy = Taxonomy::new();
        assert!(taxonomy.upsert(TaxonomyKind::Country, "Italia", TaxonomyOrigin::Geocoded));
        assert!(taxonomy.upsert(TaxonomyKind::Country, "Italy", TaxonomyOrigin::Geocoded));

        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.value(TaxonomyKind::Country), Some("Italy"));
    }

    #[test]
    fn test_geocoded_never_overwrites_user_entry() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.set_user_value(TaxonomyKind::City, "Portofino");

        assert!(!taxonomy.upsert(TaxonomyKind::City, "Genova", TaxonomyOrigin::Geocoded));
        let entry = taxonomy.get(TaxonomyKind::City).unwrap();
        assert_eq!(entry.value, "Portofino");
        assert_eq!(entry.origin, TaxonomyOrigin::UserEntered);
    }

    #[test]
    fn test_user_entry_overwrites_geocoded() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.upsert(TaxonomyKind::State, "Liguria", TaxonomyOrigin::Geocoded);
        assert!(taxonomy.set_user_value(TaxonomyKind::State, "Ligurian Riviera"));
        assert_eq!(taxonomy.get(TaxonomyKind::State).unwrap().origin, TaxonomyOrigin::UserEntered);
    }

    #[test]
    fn test_geocoded_overwrites_unset_origin() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.append(TaxonomyKind::Town, "old", TaxonomyOrigin::Unset);
        assert!(taxonomy.upsert(TaxonomyKind::Town, "new", TaxonomyOrigin::Geocoded));
        assert_eq!(taxonomy.value(TaxonomyKind::Town), Some("new"));
    }

    #[test]
    fn test_append_keeps_existing_entries() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.upsert(TaxonomyKind::Country, "Egypt", TaxonomyOrigin::Geocoded);
        taxonomy.append(TaxonomyKind::Ocean, "Red Sea", TaxonomyOrigin::Geocoded);

        let kinds: Vec<_> = taxonomy.iter().map(|entry| entry.kind).collect();
        assert_eq!(kinds, vec![TaxonomyKind::Country, TaxonomyKind::Ocean]);
    }

    #[test]
    fn test_empty_user_value_removes_entry() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.set_user_value(TaxonomyKind::County, "Kent");
        assert!(taxonomy.set_user_value(TaxonomyKind::County, "  "));
        assert!(taxonomy.get(TaxonomyKind::County).is_none());
    }

    #[test]
    fn test_prune_stale_geocoded() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.upsert(TaxonomyKind::Country, "Mexico", TaxonomyOrigin::Geocoded);
        taxonomy.upsert(TaxonomyKind::Town, "Tulum", TaxonomyOrigin::Geocoded);
        taxonomy.set_user_value(TaxonomyKind::City, "Cenote Dos Ojos");
        taxonomy.append(TaxonomyKind::Ocean, "Caribbean Sea", TaxonomyOrigin::Geocoded);

        let removed = taxonomy.prune_stale_geocoded(&[TaxonomyKind::Country]);

        assert_eq!(removed, 1);
        assert!(taxonomy.get(TaxonomyKind::Town).is_none());
        assert!(taxonomy.get(TaxonomyKind::City).is_some());
        assert!(taxonomy.get(TaxonomyKind::Ocean).is_some());
    }

    #[test]
    fn test_api_field_names() {
        assert_eq!(TaxonomyKind::Country.api_field(), "countryName");
        assert_eq!(TaxonomyKind::State.api_field(), "adminName1");
        assert_eq!(TaxonomyKind::Ocean.api_field(), "name");
    }
}
