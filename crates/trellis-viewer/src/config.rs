//! Viewer configuration loading

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use trellis_core::{BuildingParams, CameraLimits, CameraRig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Architectural parameters of the generated building
    #[serde(default)]
    pub building: BuildingParams,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Path to a site data feed (JSON); the built-in demo feed is used when
    /// absent
    #[serde(default)]
    pub feed: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub limits: CameraLimits,
    /// Initial horizontal distance from the look-at target
    #[serde(default = "default_distance")]
    pub distance: f32,
    /// Initial azimuth, radians
    #[serde(default = "default_azimuth")]
    pub azimuth: f32,
    /// Initial camera height
    #[serde(default = "default_height")]
    pub height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            limits: CameraLimits::default(),
            distance: default_distance(),
            azimuth: default_azimuth(),
            height: default_height(),
        }
    }
}

fn default_distance() -> f32 {
    28.0
}

fn default_azimuth() -> f32 {
    0.8
}

fn default_height() -> f32 {
    12.0
}

impl CameraConfig {
    /// Build the camera rig for a building whose centroid sits at `target`.
    pub fn rig(&self, target: glam::Vec3) -> CameraRig {
        CameraRig::new(
            target,
            self.distance,
            self.azimuth,
            self.height,
            self.limits.clone(),
        )
    }
}

/// Load configuration from `path`, falling back to defaults when no file is
/// given or present.
pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(path)?;
            let config: ViewerConfig = toml::from_str(&content)?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        Some(path) => {
            info!(
                path = %path.display(),
                "Configuration file not found, using defaults"
            );
            Ok(ViewerConfig::default())
        }
        None => Ok(ViewerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parses_to_defaults() {
        let config: ViewerConfig = toml::from_str("").unwrap();
        assert_eq!(config.building, BuildingParams::default());
        assert!(config.feed.is_none());
        assert_eq!(config.camera.distance, 28.0);
    }

    #[test]
    fn test_partial_config_overrides_defaults() {
        let config: ViewerConfig = toml::from_str(
            r#"
            [building]
            length = 30.0
            ridge_rise = 3.0

            [camera]
            distance = 40.0
            "#,
        )
        .unwrap();
        assert_eq!(config.building.length, 30.0);
        assert_eq!(config.building.ridge_rise, 3.0);
        // Untouched fields keep their defaults
        assert_eq!(config.building.width, BuildingParams::default().width);
        assert_eq!(config.camera.distance, 40.0);
        assert_eq!(config.camera.height, 12.0);
    }

    #[test]
    fn test_configured_building_still_validates() {
        let config: ViewerConfig = toml::from_str("").unwrap();
        assert!(config.building.validate().is_ok());
    }
}
