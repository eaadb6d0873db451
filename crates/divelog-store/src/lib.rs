//! Divelog Store - Storage adapters
//!
//! This crate provides adapter implementations of the dive site storage port.

pub mod memory;

pub use memory::MemorySiteStore;
