//! Dive log files read by the `filter` command

use anyhow::{Context, Result};
use divelog_core::models::{Dive, Trip};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// `{"dives": [...], "trips": [...]}`
#[derive(Debug, Deserialize)]
pub struct DiveLogFile {
    pub dives: Vec<Dive>,
    #[serde(default)]
    pub trips: Vec<Trip>,
}

impl DiveLogFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dive log: {}", path.display()))?;
        let log: DiveLogFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dive log: {}", path.display()))?;
        tracing::debug!(dives = log.dives.len(), trips = log.trips.len(), "Loaded dive log");
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use divelog_core::models::{DiveId, TripId};

    #[test]
    fn test_load_without_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(
            &path,
            r#"{"dives":[{"id":7,"number":12,"when":"2023-04-02T08:30:00Z","location":"Shark Point","trip":3}]}"#,
        )
        .unwrap();

        let log = DiveLogFile::load(&path).unwrap();
        assert_eq!(log.dives.len(), 1);
        assert_eq!(log.dives[0].id, DiveId(7));
        assert_eq!(log.dives[0].trip, Some(TripId(3)));
        assert!(log.trips.is_empty());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, "[").unwrap();
        assert!(DiveLogFile::load(&path).is_err());
    }
}
