use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use geo::{Geometry, Polygon};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::Result;

/// One persisted footprint computation.
///
/// `footprint: None` is an explicit "this place has no footprint" marker,
/// distinct from the entry being absent.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    pid: String,
    computed_at: DateTime<Utc>,
    footprint: Option<geojson::Geometry>,
}

/// On-disk footprint cache, one JSON file per pid.
///
/// Owned by the `FootprintBuilder` that created it; entries older than the
/// TTL are treated as absent. Writes are atomic (temp file + rename) so
/// concurrent builders contend safely per key.
pub struct FootprintCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FootprintCache {
    /// Opens (creating if needed) a cache directory.
    pub fn open(dir: &Path, ttl_hours: i64) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            ttl: Duration::hours(ttl_hours),
        })
    }

    /// Returns the cached footprint for a pid if a fresh entry exists.
    ///
    /// The outer `Option` is cache presence; the inner one is the footprint
    /// itself, `None` meaning the place is known to have no footprint.
    /// Unreadable or stale entries are treated as absent.
    pub fn get_fresh(&self, pid: &str) -> Result<Option<Option<Polygon<f64>>>> {
        let path = self.entry_path(pid);
        if !path.exists() {
            return Ok(None);
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(pid, error = %err, "unreadable footprint cache entry, recomputing");
                return Ok(None);
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(pid, error = %err, "corrupt footprint cache entry, recomputing");
                return Ok(None);
            }
        };

        if Utc::now() - entry.computed_at > self.ttl {
            return Ok(None);
        }

        match entry.footprint {
            None => Ok(Some(None)),
            Some(geometry) => match Geometry::<f64>::try_from(geometry) {
                Ok(Geometry::Polygon(polygon)) => Ok(Some(Some(polygon))),
                Ok(_) | Err(_) => {
                    warn!(pid, "cached footprint is not a polygon, recomputing");
                    Ok(None)
                }
            },
        }
    }

    /// Stores a computed footprint (or the explicit no-footprint marker).
    pub fn put(&self, pid: &str, footprint: Option<&Polygon<f64>>) -> Result<()> {
        let entry = CacheEntry {
            pid: pid.to_string(),
            computed_at: Utc::now(),
            footprint: footprint.map(|p| geojson::Geometry::new(geojson::Value::from(p))),
        };

        let path = self.entry_path(pid);
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, serde_json::to_string(&entry)?)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn entry_path(&self, pid: &str) -> PathBuf {
        let safe: String = pid
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}
