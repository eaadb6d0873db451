use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::coordinate::Coordinate;
use super::taxonomy::Taxonomy;

/// Stable identifier for a dive site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub Uuid);

impl SiteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A dive site and its location taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiveSite {
    /// Unique identifier
    #[serde(default)]
    pub id: SiteId,

    /// Site name as entered by the user
    pub name: String,

    /// GPS position, if known
    #[serde(default)]
    pub coordinate: Option<Coordinate>,

    /// Country, state, city, ocean, ...
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

impl DiveSite {
    /// Create a site with a fresh identifier
    pub fn new(name: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            id: SiteId::new(),
            name: name.into(),
            coordinate,
            taxonomy: Taxonomy::new(),
        }
    }

    pub fn has_gps(&self) -> bool {
        self.coordinate.is_some()
    }
}
