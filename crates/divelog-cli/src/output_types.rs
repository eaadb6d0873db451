use divelog_core::models::{DiveSite, TaxonomyKind};
use serde::Serialize;
use tabled::Tabled;

/// One taxonomy entry as shown to the user
#[derive(Debug, Serialize, Tabled)]
pub struct TaxonomyRow {
    #[tabled(rename = "Category")]
    pub category: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Origin")]
    pub origin: String,
}

impl TaxonomyRow {
    pub fn rows(site: &DiveSite) -> Vec<Self> {
        let mut entries: Vec<_> = site.taxonomy.iter().collect();
        entries.sort_by_key(|entry| entry.kind);
        entries
            .into_iter()
            .map(|entry| Self {
                category: entry.kind.display_name(),
                value: entry.value.clone(),
                origin: format!("{:?}", entry.origin),
            })
            .collect()
    }
}

/// Output for the lookup command
#[derive(Debug, Serialize)]
pub struct LookupOutput {
    pub latitude: f64,
    pub longitude: f64,
    pub taxonomy: Vec<TaxonomyRow>,
    pub errors: Vec<String>,
}

/// One site in the enrich summary
#[derive(Debug, Serialize, Tabled)]
pub struct SiteSummary {
    #[tabled(rename = "Site")]
    pub name: String,
    #[tabled(rename = "Coordinates")]
    pub coordinate: String,
    #[tabled(rename = "Location")]
    pub location: String,
}

impl SiteSummary {
    pub fn from_site(site: &DiveSite) -> Self {
        let location = TaxonomyKind::ALL
            .iter()
            .rev()
            .filter_map(|kind| site.taxonomy.value(*kind))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: site.name.clone(),
            coordinate: site
                .coordinate
                .map(|coordinate| coordinate.to_string())
                .unwrap_or_else(|| "-".to_string()),
            location,
        }
    }
}

/// Output for the enrich command
#[derive(Debug, Serialize)]
pub struct EnrichOutput {
    pub processed: usize,
    pub enriched: usize,
    pub skipped_without_coordinates: usize,
    pub written_to: Option<String>,
    pub sites: Vec<SiteSummary>,
    pub errors: Vec<String>,
}

/// One visible dive of the filter command
#[derive(Debug, Serialize, Tabled)]
pub struct DiveRow {
    #[tabled(rename = "#")]
    pub number: u32,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Buddy")]
    pub buddy: String,
}

/// Visible dives of one trip
#[derive(Debug, Serialize, Tabled)]
pub struct TripRow {
    #[tabled(rename = "Trip")]
    pub location: String,
    #[tabled(rename = "Shown")]
    pub shown: usize,
    #[tabled(rename = "Total")]
    pub total: usize,
}

/// Output for the filter command
#[derive(Debug, Serialize)]
pub struct FilterOutput {
    pub filter: String,
    pub case_sensitive: bool,
    pub include_notes: bool,
    pub shown: usize,
    pub total: usize,
    pub dives: Vec<DiveRow>,
    pub trips: Vec<TripRow>,
}

/// One configuration value
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
