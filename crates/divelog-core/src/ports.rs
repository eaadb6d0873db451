//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod reporting;
pub mod storage;

pub use reporting::{CollectingReporter, ErrorReporter, TracingReporter};
pub use storage::SiteRepository;
