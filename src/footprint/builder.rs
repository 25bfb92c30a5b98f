use std::path::Path;

use geo::{Geometry, Polygon};
use tracing::debug;

use crate::config::MatchConfig;
use crate::errors::{PlaceMatchError, Result};
use crate::footprint::FootprintCache;
use crate::geometry::{buffered_coords, centroid_latitude, hull_of, meters_to_degrees};
use crate::types::{Precision, RawPlace};

/// Accuracy assessments carrying this marker follow the historical-atlas
/// relocation convention, whose reported values systematically understate
/// the real positional error.
pub const RELOCATED_ACCURACY_MARKER: &str = "barrington";

/// Computes a place's combined spatial footprint from its precise locations
/// and positional-accuracy values, caching results per pid.
pub struct FootprintBuilder {
    cache: FootprintCache,
    concavity: f64,
    relocated_floor_meters: f64,
}

impl FootprintBuilder {
    /// Creates a builder with a cache rooted at `cache_dir`.
    pub fn new(cache_dir: &Path, config: &MatchConfig) -> Result<Self> {
        Ok(Self {
            cache: FootprintCache::open(cache_dir, config.footprint_cache_ttl_hours)?,
            concavity: config.hull_concavity,
            relocated_floor_meters: config.relocated_accuracy_floor_meters,
        })
    }

    /// Returns the footprint for a place, computing it on cache miss.
    ///
    /// `None` means the place has no precise locations and therefore no
    /// footprint; that outcome is cached too.
    pub fn footprint(&self, pid: &str, raw: &RawPlace) -> Result<Option<Polygon<f64>>> {
        if let Some(cached) = self.cache.get_fresh(pid)? {
            return Ok(cached);
        }
        let computed = self.compute(pid, raw)?;
        self.cache.put(pid, computed.as_ref())?;
        debug!(pid, has_footprint = computed.is_some(), "footprint computed");
        Ok(computed)
    }

    fn compute(&self, pid: &str, raw: &RawPlace) -> Result<Option<Polygon<f64>>> {
        let mut coords = Vec::new();

        for (location, precision) in raw.located_precisions() {
            if precision != Precision::Precise {
                continue;
            }
            let Some(geometry) = &location.geometry else {
                continue;
            };
            let geometry = Geometry::<f64>::try_from(geometry.clone())?;
            let Some(latitude) = centroid_latitude(&geometry) else {
                continue;
            };

            let accuracy =
                location
                    .accuracy_value
                    .ok_or_else(|| PlaceMatchError::DataIntegrity {
                        pid: pid.to_string(),
                        message: "precise location has no accuracy value".to_string(),
                    })?;
            let accuracy = if location
                .accuracy
                .to_ascii_lowercase()
                .contains(RELOCATED_ACCURACY_MARKER)
            {
                accuracy.max(self.relocated_floor_meters)
            } else {
                accuracy
            };

            let radius = meters_to_degrees(accuracy, latitude);
            coords.extend(buffered_coords(&geometry, radius));
        }

        if coords.is_empty() {
            return Ok(None);
        }

        match hull_of(&coords, self.concavity) {
            Some(hull) => Ok(Some(hull)),
            None => Err(PlaceMatchError::Footprint {
                pid: pid.to_string(),
                message: "concave and convex hull construction both failed".to_string(),
            }),
        }
    }
}
