//! Divelog Geocode - Reverse geocoding of dive sites
//!
//! Looks up the country, state, city and body of water for dive site
//! coordinates using the geonames.org place name and ocean APIs, and writes
//! the results into the site's location taxonomy.

pub mod error;
pub mod geonames;
pub mod http;
pub mod worker;

pub use error::LookupError;
pub use geonames::Provider;
pub use http::{HttpFetcher, HttpResponse, ReqwestFetcher, TransportError};
pub use worker::{BatchReport, GeoLookupRequest, LocationEvent, ReverseGeocoder};
