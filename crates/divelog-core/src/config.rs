use crate::error::{DivelogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default geonames.org nearby place name endpoint
pub const DEFAULT_PLACE_NAMES_ENDPOINT: &str = "http://api.geonames.org/findNearbyPlaceNameJSON";

/// Default geonames.org ocean name endpoint
pub const DEFAULT_OCEAN_ENDPOINT: &str = "http://api.geonames.org/oceanJSON";

/// Per-request timeout used when nothing else is configured
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has at least the same precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Settings consumed by the reverse geocoding worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeSettings {
    pub place_names_endpoint: String,
    pub ocean_endpoint: String,
    /// geonames.org service account
    pub username: String,
    /// Language code for localized names
    pub language: String,
    pub user_agent: String,
    /// Bound on each provider call
    pub timeout: Duration,
    /// Search radius in kilometers
    pub radius_km: u32,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        LayeredConfig::with_defaults().geocode_settings()
    }
}

/// Full-text filter toggles for the dive list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub case_sensitive: bool,
    pub include_notes: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            include_notes: true,
        }
    }
}

/// Layered configuration for Divelog
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub place_names_endpoint: ConfigValue<String>,
    pub ocean_endpoint: ConfigValue<String>,
    pub geonames_username: ConfigValue<String>,
    pub language: ConfigValue<String>,
    pub user_agent: ConfigValue<String>,
    pub lookup_timeout_ms: ConfigValue<u64>,
    pub radius_km: ConfigValue<u32>,
    pub filter_case_sensitive: ConfigValue<bool>,
    pub filter_include_notes: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let filter = FilterOptions::default();
        Self {
            place_names_endpoint: ConfigValue::new(
                DEFAULT_PLACE_NAMES_ENDPOINT.to_string(),
                ConfigSource::Default,
            ),
            ocean_endpoint: ConfigValue::new(
                DEFAULT_OCEAN_ENDPOINT.to_string(),
                ConfigSource::Default,
            ),
            geonames_username: ConfigValue::new("demo".to_string(), ConfigSource::Default),
            language: ConfigValue::new("en".to_string(), ConfigSource::Default),
            user_agent: ConfigValue::new(
                concat!("divelog/", env!("CARGO_PKG_VERSION")).to_string(),
                ConfigSource::Default,
            ),
            lookup_timeout_ms: ConfigValue::new(DEFAULT_LOOKUP_TIMEOUT_MS, ConfigSource::Default),
            radius_km: ConfigValue::new(50, ConfigSource::Default),
            filter_case_sensitive: ConfigValue::new(filter.case_sensitive, ConfigSource::Default),
            filter_include_notes: ConfigValue::new(filter.include_notes, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| DivelogError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| DivelogError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(geocode) = file_config.geocode {
            if let Some(endpoint) = geocode.place_names_endpoint {
                self.place_names_endpoint.update(endpoint, ConfigSource::File);
            }
            if let Some(endpoint) = geocode.ocean_endpoint {
                self.ocean_endpoint.update(endpoint, ConfigSource::File);
            }
            if let Some(username) = geocode.username {
                self.geonames_username.update(username, ConfigSource::File);
            }
            if let Some(language) = geocode.language {
                self.language.update(language, ConfigSource::File);
            }
            if let Some(user_agent) = geocode.user_agent {
                self.user_agent.update(user_agent, ConfigSource::File);
            }
            if let Some(timeout) = geocode.timeout_ms {
                self.lookup_timeout_ms.update(timeout, ConfigSource::File);
            }
            if let Some(radius) = geocode.radius_km {
                self.radius_km.update(radius, ConfigSource::File);
            }
        }

        if let Some(filter) = file_config.filter {
            if let Some(case_sensitive) = filter.case_sensitive {
                self.filter_case_sensitive.update(case_sensitive, ConfigSource::File);
            }
            if let Some(include_notes) = filter.include_notes {
                self.filter_include_notes.update(include_notes, ConfigSource::File);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(username) = env::var("DIVELOG_GEONAMES_USERNAME") {
            self.geonames_username.update(username, ConfigSource::Environment);
        }

        if let Ok(language) = env::var("DIVELOG_LANGUAGE") {
            self.language.update(language, ConfigSource::Environment);
        }

        if let Ok(user_agent) = env::var("DIVELOG_USER_AGENT") {
            self.user_agent.update(user_agent, ConfigSource::Environment);
        }

        if let Ok(endpoint) = env::var("DIVELOG_PLACE_NAMES_ENDPOINT") {
            self.place_names_endpoint.update(endpoint, ConfigSource::Environment);
        }

        if let Ok(endpoint) = env::var("DIVELOG_OCEAN_ENDPOINT") {
            self.ocean_endpoint.update(endpoint, ConfigSource::Environment);
        }

        // DIVELOG_LOOKUP_TIMEOUT_MS
        if let Ok(timeout_str) = env::var("DIVELOG_LOOKUP_TIMEOUT_MS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) if timeout > 0 => {
                    self.lookup_timeout_ms.update(timeout, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid DIVELOG_LOOKUP_TIMEOUT_MS value '{}': expected positive integer",
                    timeout_str
                ),
            }
        }

        // DIVELOG_RADIUS_KM
        if let Ok(radius_str) = env::var("DIVELOG_RADIUS_KM") {
            match radius_str.parse::<u32>() {
                Ok(radius) => self.radius_km.update(radius, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DIVELOG_RADIUS_KM value '{}': expected integer kilometers",
                    radius_str
                ),
            }
        }

        // DIVELOG_FILTER_CASE_SENSITIVE
        if let Ok(flag) = env::var("DIVELOG_FILTER_CASE_SENSITIVE") {
            match parse_flag(&flag) {
                Ok(value) => self.filter_case_sensitive.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DIVELOG_FILTER_CASE_SENSITIVE value '{}': expected true or false",
                    flag
                ),
            }
        }

        // DIVELOG_FILTER_INCLUDE_NOTES
        if let Ok(flag) = env::var("DIVELOG_FILTER_INCLUDE_NOTES") {
            match parse_flag(&flag) {
                Ok(value) => self.filter_include_notes.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DIVELOG_FILTER_INCLUDE_NOTES value '{}': expected true or false",
                    flag
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(username) = overrides.geonames_username {
            self.geonames_username.update(username, ConfigSource::Cli);
        }

        if let Some(language) = overrides.language {
            self.language.update(language, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.lookup_timeout_ms {
            self.lookup_timeout_ms.update(timeout, ConfigSource::Cli);
        }

        if let Some(case_sensitive) = overrides.filter_case_sensitive {
            self.filter_case_sensitive.update(case_sensitive, ConfigSource::Cli);
        }

        if let Some(include_notes) = overrides.filter_include_notes {
            self.filter_include_notes.update(include_notes, ConfigSource::Cli);
        }
    }

    /// Settings for the reverse geocoding worker
    pub fn geocode_settings(&self) -> GeocodeSettings {
        GeocodeSettings {
            place_names_endpoint: self.place_names_endpoint.value.clone(),
            ocean_endpoint: self.ocean_endpoint.value.clone(),
            username: self.geonames_username.value.clone(),
            language: self.language.value.clone(),
            user_agent: self.user_agent.value.clone(),
            timeout: Duration::from_millis(self.lookup_timeout_ms.value),
            radius_km: self.radius_km.value,
        }
    }

    /// Dive list filter toggles
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            case_sensitive: self.filter_case_sensitive.value,
            include_notes: self.filter_include_notes.value,
        }
    }

    /// Check values that cannot be defaulted away
    pub fn validate(&self) -> Result<()> {
        if self.geonames_username.value.trim().is_empty() {
            return Err(DivelogError::ConfigMissing {
                key: "geocode.username".to_string(),
            });
        }
        if self.lookup_timeout_ms.value == 0 {
            return Err(DivelogError::ConfigInvalid {
                key: "geocode.timeout_ms".to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "geocode.place_names_endpoint".to_string(),
            (self.place_names_endpoint.value.clone(), self.place_names_endpoint.source),
        );
        map.insert(
            "geocode.ocean_endpoint".to_string(),
            (self.ocean_endpoint.value.clone(), self.ocean_endpoint.source),
        );
        map.insert(
            "geocode.username".to_string(),
            (self.geonames_username.value.clone(), self.geonames_username.source),
        );
        map.insert(
            "geocode.language".to_string(),
            (self.language.value.clone(), self.language.source),
        );
        map.insert(
            "geocode.user_agent".to_string(),
            (self.user_agent.value.clone(), self.user_agent.source),
        );
        map.insert(
            "geocode.timeout_ms".to_string(),
            (format!("{} ms", self.lookup_timeout_ms.value), self.lookup_timeout_ms.source),
        );
        map.insert(
            "geocode.radius_km".to_string(),
            (format!("{} km", self.radius_km.value), self.radius_km.source),
        );
        map.insert(
            "filter.case_sensitive".to_string(),
            (self.filter_case_sensitive.value.to_string(), self.filter_case_sensitive.source),
        );
        map.insert(
            "filter.include_notes".to_string(),
            (self.filter_include_notes.value.to_string(), self.filter_include_notes.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    geocode: Option<GeocodeFileConfig>,
    filter: Option<FilterFileConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GeocodeFileConfig {
    place_names_endpoint: Option<String>,
    ocean_endpoint: Option<String>,
    username: Option<String>,
    language: Option<String>,
    user_agent: Option<String>,
    timeout_ms: Option<u64>,
    radius_km: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FilterFileConfig {
    case_sensitive: Option<bool>,
    include_notes: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub geonames_username: Option<String>,
    pub language: Option<String>,
    pub lookup_timeout_ms: Option<u64>,
    pub filter_case_sensitive: Option<bool>,
    pub filter_include_notes: Option<bool>,
}

/// Parse a boolean flag from string
pub fn parse_flag(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(DivelogError::ConfigInvalid {
            key: "flag".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.lookup_timeout_ms.value, 5000);
        assert_eq!(config.lookup_timeout_ms.source, ConfigSource::Default);
        assert_eq!(config.radius_km.value, 50);
        assert_eq!(config.place_names_endpoint.value, DEFAULT_PLACE_NAMES_ENDPOINT);
        assert!(config.user_agent.value.starts_with("divelog/"));
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[geocode]
username = "reefwatch"
language = "it"
timeout_ms = 2500

[filter]
case_sensitive = true
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.geonames_username.value, "reefwatch");
        assert_eq!(config.geonames_username.source, ConfigSource::File);
        assert_eq!(config.language.value, "it");
        assert_eq!(config.lookup_timeout_ms.value, 2500);
        assert!(config.filter_case_sensitive.value);
        // Untouched values keep their defaults
        assert_eq!(config.radius_km.source, ConfigSource::Default);
        assert_eq!(config.filter_include_notes.source, ConfigSource::Default);
    }

    #[test]
    fn test_geocode_settings() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            lookup_timeout_ms: Some(1200),
            ..Default::default()
        });

        let settings = config.geocode_settings();
        assert_eq!(settings.timeout, Duration::from_millis(1200));
        assert_eq!(settings.radius_km, 50);
        assert_eq!(settings.username, "demo");
    }

    #[test]
    fn test_validate_rejects_empty_username() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            geonames_username: Some("  ".to_string()),
            ..Default::default()
        });

        assert!(matches!(config.validate(), Err(DivelogError::ConfigMissing { .. })));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag("YES").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("geocode.username"));
        assert!(map.contains_key("filter.include_notes"));

        let (timeout, source) = &map["geocode.timeout_ms"];
        assert_eq!(timeout, "5000 ms");
        assert_eq!(*source, ConfigSource::Default);
    }
}
