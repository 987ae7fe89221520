use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "src/configs/dashboard.toml";
pub const DEFAULT_GEOJSON_URL: &str = "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/brazil-states.geojson";

const ENV_DATA_PATH: &str = "DASHBOARD_DATA_PATH";
const ENV_GEOJSON_URL: &str = "DASHBOARD_GEOJSON_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfigFile {
    pub data: DataSection,
    #[serde(default)]
    pub geo: Option<GeoSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub path: String,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoSection {
    pub enabled: Option<bool>,
    pub url: Option<String>,
    pub feature_id_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: String,
    pub sheet: Option<String>,
    pub geo_enabled: bool,
    pub geojson_url: String,
    pub feature_id_key: String,
    pub timeout_seconds: u64,
}

impl DashboardConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config file: {}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse dashboard config file: {}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config_file: DashboardConfigFile = toml::from_str(content)?;
        Ok(Self::from_sections(config_file.data, config_file.geo))
    }

    /// Reads `path` when it exists, otherwise falls back to defaults.
    /// Environment overrides are applied in both cases.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            warn!("Dashboard config not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_sections(data: DataSection, geo: Option<GeoSection>) -> Self {
        let defaults = Self::default();
        let geo = geo.unwrap_or(GeoSection {
            enabled: None,
            url: None,
            feature_id_key: None,
            timeout_seconds: None,
        });

        Self {
            data_path: data.path,
            sheet: data.sheet,
            geo_enabled: geo.enabled.unwrap_or(defaults.geo_enabled),
            geojson_url: geo.url.unwrap_or(defaults.geojson_url),
            feature_id_key: geo.feature_id_key.unwrap_or(defaults.feature_id_key),
            timeout_seconds: geo.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var(ENV_DATA_PATH) {
            self.data_path = path;
        }
        if let Ok(url) = env::var(ENV_GEOJSON_URL) {
            self.geojson_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_path.trim().is_empty() {
            return Err(anyhow::anyhow!("Data path cannot be empty"));
        }

        if self.geo_enabled {
            if self.geojson_url.trim().is_empty() {
                return Err(anyhow::anyhow!("GeoJSON URL cannot be empty"));
            }
            if self.feature_id_key.trim().is_empty() {
                return Err(anyhow::anyhow!("GeoJSON feature id key cannot be empty"));
            }
            if self.timeout_seconds == 0 {
                return Err(anyhow::anyhow!("GeoJSON timeout must be greater than zero"));
            }
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: "titan_fuel_vendas.xlsx".to_string(),
            sheet: None,
            geo_enabled: true,
            geojson_url: DEFAULT_GEOJSON_URL.to_string(),
            feature_id_key: "name".to_string(),
            timeout_seconds: 30,
        }
    }
}
