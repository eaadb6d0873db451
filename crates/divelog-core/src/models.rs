pub mod coordinate;
pub mod dive;
pub mod site;
pub mod taxonomy;

pub use coordinate::{Coordinate, Degrees, UDEG_PER_DEGREE};
pub use dive::{Dive, DiveId, Trip, TripId};
pub use site::{DiveSite, SiteId};
pub use taxonomy::{Taxonomy, TaxonomyEntry, TaxonomyKind, TaxonomyOrigin};
