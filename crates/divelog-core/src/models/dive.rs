use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dive identifier, unique within a dive log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiveId(pub u32);

impl fmt::Display for DiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a trip grouping several dives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub u32);

/// Dive log entry as presented by the dive list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dive {
    pub id: DiveId,

    /// User visible dive number
    pub number: u32,

    /// Start of the dive
    pub when: DateTime<Utc>,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub buddy: String,

    #[serde(default)]
    pub divemaster: String,

    #[serde(default)]
    pub suit: String,

    #[serde(default)]
    pub notes: String,

    /// Dive computer model that recorded the dive
    #[serde(default)]
    pub dive_computer: String,

    /// Trip this dive belongs to
    #[serde(default)]
    pub trip: Option<TripId>,
}

impl Dive {
    pub fn new(id: DiveId, number: u32, when: DateTime<Utc>) -> Self {
        Self {
            id,
            number,
            when,
            location: String::new(),
            buddy: String::new(),
            divemaster: String::new(),
            suit: String::new(),
            notes: String::new(),
            dive_computer: String::new(),
            trip: None,
        }
    }

    /// Seconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.when.timestamp()
    }

    /// Searchable text including the notes
    pub fn full_text(&self) -> String {
        let mut text = self.full_text_no_notes();
        if !self.notes.is_empty() {
            text.push(' ');
            text.push_str(&self.notes);
        }
        text
    }

    /// Searchable text without the notes
    pub fn full_text_no_notes(&self) -> String {
        let mut text = format!("{} {}", self.number, self.when.format("%Y-%m-%d %H:%M"));
        for field in [&self.location, &self.buddy, &self.divemaster, &self.suit] {
            if !field.is_empty() {
                text.push(' ');
                text.push_str(field);
            }
        }
        text
    }
}

/// A trip and the number of dives it contains in the full dive log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,

    #[serde(default)]
    pub location: String,

    /// Number of dives in the trip, ignoring any filter
    pub dive_count: usize,
}
