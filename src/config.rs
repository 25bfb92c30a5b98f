use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PlaceMatchError, Result};

/// Default name of the configuration file.
pub const CONFIG_FILENAME: &str = "placematch.json";

/// Configuration for a matching run.
///
/// Controls the gazetteer namespace, signal thresholds, and footprint cache
/// behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Host component of the gazetteer's own place URIs.
    pub gazetteer_netloc: String,
    /// Buffer applied to candidate geometries before the spatial query, in km.
    pub spatial_buffer_km: f64,
    /// Cutoff for the nearest-footprint fallback, in degrees.
    pub nearest_cutoff_degrees: f64,
    /// Minimum weighted-ratio score (0-100) for a fuzzy name hit.
    pub fuzzy_score_cutoff: f64,
    /// Maximum fuzzy hits retained per candidate name string.
    pub fuzzy_limit: usize,
    /// Concavity ratio for footprint hull construction.
    pub hull_concavity: f64,
    /// Footprint cache entries older than this are recomputed.
    pub footprint_cache_ttl_hours: i64,
    /// Floor applied to accuracy values from historical-atlas relocation
    /// assessments, in meters.
    pub relocated_accuracy_floor_meters: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gazetteer_netloc: "pleiades.stoa.org".to_string(),
            spatial_buffer_km: 10.0,
            nearest_cutoff_degrees: 0.18,
            fuzzy_score_cutoff: 90.0,
            fuzzy_limit: 5,
            hull_concavity: 2.0,
            footprint_cache_ttl_hours: 24,
            relocated_accuracy_floor_meters: 2000.0,
        }
    }
}

/// Loads the configuration from disk.
///
/// If the file does not exist, returns the default configuration.
pub fn load_config(config_path: &Path) -> Result<MatchConfig> {
    if !config_path.exists() {
        return Ok(MatchConfig::default());
    }

    let contents = fs::read_to_string(config_path).map_err(|e| PlaceMatchError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: MatchConfig =
        serde_json::from_str(&contents).map_err(|e| PlaceMatchError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it to the final
/// location, ensuring that a partial write never corrupts the configuration.
pub fn save_config(config_path: &Path, config: &MatchConfig) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| PlaceMatchError::Config {
            message: format!(
                "failed to create config directory '{}': {}",
                parent.display(),
                e
            ),
        })?;
    }

    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| PlaceMatchError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| PlaceMatchError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, config_path).map_err(|e| PlaceMatchError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}
