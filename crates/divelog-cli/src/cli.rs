use clap::{Args, Parser, Subcommand};
use divelog_core::config::CliConfigOverrides;
use std::path::PathBuf;

/// divelog - dive site geocoding and dive list tools
#[derive(Parser, Debug)]
#[command(name = "divelog")]
#[command(about = "Dive site reverse geocoding and dive list filtering", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that take precedence over file and environment
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// geonames.org account name
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Language of returned place names
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl OverrideArgs {
    pub fn into_overrides(self) -> CliConfigOverrides {
        CliConfigOverrides {
            geonames_username: self.username,
            language: self.language,
            lookup_timeout_ms: self.timeout_ms,
            ..CliConfigOverrides::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reverse geocode a single coordinate
    Lookup(LookupArgs),

    /// Reverse geocode every site of a dive site file
    Enrich(EnrichArgs),

    /// Filter a dive log by full text
    Filter(FilterArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Name of the temporary site
    #[arg(long, default_value = "unnamed site")]
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct EnrichArgs {
    /// JSON array of dive sites
    pub sites: PathBuf,

    /// Write enriched sites here instead of back into the input file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FilterArgs {
    /// JSON dive log with `dives` and optional `trips`
    pub dives: PathBuf,

    /// Text to search for; empty shows every dive
    #[arg(default_value = "")]
    pub text: String,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Do not search dive notes
    #[arg(long)]
    pub exclude_notes: bool,
}

impl FilterArgs {
    /// Only flags that were given override the configured filter options
    pub fn overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            filter_case_sensitive: self.case_sensitive.then_some(true),
            filter_include_notes: self.exclude_notes.then_some(false),
            ..CliConfigOverrides::default()
        }
    }
}
