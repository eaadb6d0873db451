//! Error types for Divelog

use thiserror::Error;

use crate::models::SiteId;

#[derive(Debug, Error)]
pub enum DivelogError {
    // Coordinate errors
    #[error("Latitude {udeg} µ° is outside [-90°, 90°]")]
    LatitudeOutOfRange { udeg: i64 },

    #[error("Longitude {udeg} µ° is outside [-180°, 180°]")]
    LongitudeOutOfRange { udeg: i64 },

    // Dive site errors
    #[error("Dive site not found: {id}")]
    SiteNotFound { id: SiteId },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DivelogError {
    fn from(err: serde_json::Error) -> Self {
        DivelogError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DivelogError>;
