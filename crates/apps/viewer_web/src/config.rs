//! Viewer configuration: build-time token plus optional JSON overrides.

use foundation::math::Geodetic;
use scene::camera::{CameraPose, HeadingPitchRoll};
use serde::Deserialize;
use streaming::DEFAULT_TILE_SERVER;
use tracing::error;

/// Google photorealistic 3D tiles.
pub const TILESET_ASSET_ID: u64 = 2_275_207;
pub const TRANSIT_URL: &str = "/metro.geojson";
pub const CONTAINER_ID: &str = "atlas-root";

/// Tile service access token baked in at build time.
pub fn build_time_token() -> &'static str {
    option_env!("ATLAS_TILES_TOKEN").unwrap_or("")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid viewer config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("home view out of range: {0}")]
    InvalidHome(String),
}

/// Initial camera pose, in degrees and meters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HomeView {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
    pub heading_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

impl Default for HomeView {
    fn default() -> Self {
        // Brussels, looking north and down over the city centre.
        Self {
            lon: 4.3517,
            lat: 50.8503,
            height: 1500.0,
            heading_deg: 0.0,
            pitch_deg: -35.0,
            roll_deg: 0.0,
        }
    }
}

impl HomeView {
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(
            Geodetic::from_degrees(self.lon, self.lat, self.height),
            HeadingPitchRoll::from_degrees(self.heading_deg, self.pitch_deg, self.roll_deg),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(-180.0..=180.0).contains(&self.lon) || !(-90.0..=90.0).contains(&self.lat) {
            return Err(ConfigError::InvalidHome(format!(
                "lon {} lat {}",
                self.lon, self.lat
            )));
        }
        if !self.height.is_finite() {
            return Err(ConfigError::InvalidHome(format!("height {}", self.height)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub access_token: String,
    pub tile_server: String,
    pub tileset_asset_id: u64,
    pub transit_url: String,
    pub container_id: String,
    pub home: HomeView,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            access_token: build_time_token().to_string(),
            tile_server: DEFAULT_TILE_SERVER.to_string(),
            tileset_asset_id: TILESET_ASSET_ID,
            transit_url: TRANSIT_URL.to_string(),
            container_id: CONTAINER_ID.to_string(),
            home: HomeView::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.home.validate()?;
        Ok(config)
    }

    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(err) => {
                error!(error = %err, "falling back to default viewer config");
                Self::default()
            }
        }
    }

    /// The tile service token; empty when none was configured.
    pub fn access_token(&self) -> &str {
        if self.access_token.trim().is_empty() {
            error!("missing tile service access token; set ATLAS_TILES_TOKEN at build time");
        }
        &self.access_token
    }
}
