//! geonames.org request URLs and response parsing.
//!
//! Two providers are queried per site: the nearby place name API yields the
//! political hierarchy, the ocean API yields the body of water.

use divelog_core::config::GeocodeSettings;
use divelog_core::models::{Coordinate, TaxonomyKind};
use reqwest::Url;
use serde_json::Value;
use std::fmt;

use crate::error::LookupError;

/// Geocoding provider queried by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Country, state, county, town, city
    PlaceNames,
    /// Ocean or sea name
    Ocean,
}

impl Provider {
    fn endpoint<'a>(&self, settings: &'a GeocodeSettings) -> &'a str {
        match self {
            Provider::PlaceNames => &settings.place_names_endpoint,
            Provider::Ocean => &settings.ocean_endpoint,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::PlaceNames => f.write_str("geonames.org"),
            Provider::Ocean => f.write_str("oceans API of geonames.org"),
        }
    }
}

/// Build the GET URL for `provider` at `coordinate`
pub fn request_url(
    provider: Provider,
    settings: &GeocodeSettings,
    coordinate: &Coordinate,
) -> Result<Url, LookupError> {
    let lat = coordinate.latitude().to_query_string();
    let lng = coordinate.longitude().to_query_string();
    let radius = settings.radius_km.to_string();

    Url::parse_with_params(
        provider.endpoint(settings),
        [
            ("language", settings.language.as_str()),
            ("lat", lat.as_str()),
            ("lng", lng.as_str()),
            ("radius", radius.as_str()),
            ("username", settings.username.as_str()),
        ],
    )
    .map_err(|e| LookupError::InvalidEndpoint {
        provider,
        reason: e.to_string(),
    })
}

/// Parse a nearby place name response.
///
/// Only the first result is used. Every kind from `Country` onward whose
/// field is present yields one `(kind, value)` pair, in kind order. An empty
/// result list is reported as `NoData`.
pub fn parse_place_names(body: &[u8]) -> Result<Vec<(TaxonomyKind, String)>, LookupError> {
    let provider = Provider::PlaceNames;
    let document = parse_document(provider, body)?;

    let first = document
        .get("geonames")
        .and_then(Value::as_array)
        .and_then(|results| results.first());

    let Some(first) = first else {
        return Err(LookupError::NoData { provider });
    };

    Ok(TaxonomyKind::PLACE_NAMES
        .iter()
        .filter_map(|kind| field_text(first.get(kind.api_field())?).map(|value| (*kind, value)))
        .collect())
}

/// Parse an ocean response. A response without a name is not an error.
pub fn parse_ocean(body: &[u8]) -> Result<Option<String>, LookupError> {
    let document = parse_document(Provider::Ocean, body)?;

    Ok(document
        .get("ocean")
        .and_then(|ocean| ocean.get(TaxonomyKind::Ocean.api_field()))
        .and_then(field_text))
}

fn parse_document(provider: Provider, body: &[u8]) -> Result<Value, LookupError> {
    let document: Value = serde_json::from_slice(body).map_err(|e| LookupError::Parse {
        provider,
        reason: e.to_string(),
    })?;

    // geonames answers account and quota problems with 200 and a status object
    if let Some(message) = document
        .get("status")
        .and_then(|status| status.get("message"))
        .and_then(Value::as_str)
    {
        return Err(LookupError::Service {
            provider,
            message: message.to_string(),
        });
    }

    Ok(document)
}

/// Textual value of a JSON field; null, empty and structured values count as absent
fn field_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}
