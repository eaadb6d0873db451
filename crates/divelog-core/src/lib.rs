//! Divelog Core - Domain models, configuration, and port definitions
//!
//! This crate contains the dive site and dive list domain types shared by the
//! geocoding worker, the list models, and the storage adapters.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{DivelogError, Result};
