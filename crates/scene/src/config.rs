use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Initial map view: Web Mercator meters, matching the camera reset target.
pub const DEFAULT_CENTER: [f64; 2] = [-10968310.601, 4512834.218];
pub const DEFAULT_ZOOM: f64 = 6.0;
pub const DEFAULT_BASEMAP_URL: &str = "https://mt1.google.com/vt/lyrs=r&x={x}&y={y}&z={z}";

/// Viewer configuration. Every field has a default so a missing or partial
/// config file still produces the stock map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_basemap_url")]
    pub basemap_url: String,
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_basemap_url() -> String {
    DEFAULT_BASEMAP_URL.to_string()
}

fn default_center() -> [f64; 2] {
    DEFAULT_CENTER
}

fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            basemap_url: default_basemap_url(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {err}"),
            ConfigError::Parse(err) => write!(f, "Config parse error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl MapConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&payload)
    }
}
