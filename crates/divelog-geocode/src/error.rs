//! Error types for reverse geocoding
//!
//! None of these are fatal: each one skips a single provider call or a single
//! queued site and the worker moves on.

use divelog_core::models::SiteId;
use thiserror::Error;

use crate::geonames::Provider;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("timeout accessing {provider}")]
    Timeout { provider: Provider },

    #[error("got error accessing {provider}: {reason}")]
    Transport { provider: Provider, reason: String },

    #[error("{provider} answered with HTTP status {status}")]
    HttpStatus { provider: Provider, status: u16 },

    #[error("error parsing {provider} response: {reason}")]
    Parse { provider: Provider, reason: String },

    #[error("{provider} refused the request: {message}")]
    Service { provider: Provider, message: String },

    #[error("{provider} did not provide reverse lookup information")]
    NoData { provider: Provider },

    #[error("invalid {provider} endpoint: {reason}")]
    InvalidEndpoint { provider: Provider, reason: String },

    #[error("dive site {id} vanished before its location lookup finished")]
    SiteVanished { id: SiteId },

    #[error("failed to create HTTP client: {reason}")]
    Client { reason: String },
}

impl LookupError {
    /// Whether the message goes to the user-facing error sink.
    ///
    /// Non-2xx answers are skipped silently and only logged.
    pub fn is_reported(&self) -> bool {
        !matches!(self, LookupError::HttpStatus { .. })
    }
}
