use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};
use wreq::Client;
use wreq_util::Emulation;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::MapRegion;

/// Region boundary polygons, each tagged with a full region name.
#[derive(Debug, Clone)]
pub struct GeoBoundaries {
    pub document: Value,
    pub feature_names: Vec<String>,
}

impl GeoBoundaries {
    /// Validates a GeoJSON `FeatureCollection` and collects the names found
    /// under `properties.<feature_id_key>`.
    pub fn from_document(document: Value, feature_id_key: &str) -> Result<Self> {
        if document.get("type").and_then(|t| t.as_str()) != Some("FeatureCollection") {
            return Err(DashboardError::GeoFetch(
                "document is not a GeoJSON FeatureCollection".to_string(),
            ));
        }

        let features = document
            .get("features")
            .and_then(|f| f.as_array())
            .ok_or_else(|| DashboardError::GeoFetch("document has no features array".to_string()))?;

        let feature_names: Vec<String> = features
            .iter()
            .filter_map(|feature| {
                feature
                    .get("properties")
                    .and_then(|p| p.get(feature_id_key))
                    .and_then(|name| name.as_str())
                    .map(|name| name.to_string())
            })
            .collect();

        if feature_names.len() < features.len() {
            warn!(
                "{} of {} features lack properties.{}",
                features.len() - feature_names.len(),
                features.len(),
                feature_id_key
            );
        }

        Ok(Self {
            document,
            feature_names,
        })
    }

    /// Names of `regions` with no matching boundary feature.
    pub fn unmatched_regions(&self, regions: &[MapRegion]) -> Vec<String> {
        regions
            .iter()
            .filter(|r| !self.feature_names.iter().any(|name| name == &r.name))
            .map(|r| r.name.clone())
            .collect()
    }
}

#[async_trait]
pub trait BoundarySource: Send + Sync {
    fn feature_id_key(&self) -> &str;

    async fn fetch_boundaries(&self) -> Result<GeoBoundaries>;
}

/// Single-attempt HTTP GET of a GeoJSON document. Nothing is cached.
///
/// The client is built per fetch, so a client setup failure surfaces as a
/// fetch error on the map panel like any other.
pub struct GeoJsonFetcher {
    url: String,
    feature_id_key: String,
    timeout: Duration,
}

impl GeoJsonFetcher {
    pub fn new(url: &str, feature_id_key: &str, timeout: Duration) -> Self {
        GeoJsonFetcher {
            url: url.to_string(),
            feature_id_key: feature_id_key.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            &config.geojson_url,
            &config.feature_id_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn client(&self) -> Result<Client> {
        Client::builder()
            .emulation(Emulation::Firefox139)
            .timeout(self.timeout)
            .build()
            .map_err(|e| DashboardError::GeoFetch(format!("failed to build HTTP client: {}", e)))
    }
}

#[async_trait]
impl BoundarySource for GeoJsonFetcher {
    fn feature_id_key(&self) -> &str {
        &self.feature_id_key
    }

    async fn fetch_boundaries(&self) -> Result<GeoBoundaries> {
        info!("Fetching region boundaries from {}", self.url);

        let response = self
            .client()?
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DashboardError::GeoFetch(format!("request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(DashboardError::GeoFetch(format!(
                "HTTP error from {}: {}",
                self.url,
                response.status()
            )));
        }

        let document: Value = response.json().await.map_err(|e| {
            DashboardError::GeoFetch(format!("failed to parse GeoJSON from {}: {}", self.url, e))
        })?;

        let boundaries = GeoBoundaries::from_document(document, &self.feature_id_key)?;
        info!("Fetched {} boundary features", boundaries.feature_names.len());

        Ok(boundaries)
    }
}
