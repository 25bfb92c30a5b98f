/// Gazetteer index module.
///
/// Owns the reference dataset and the three indexes built over it (name,
/// link, spatial). Queries are expressed through the `GazetteerQueries`
/// trait so matcher tests can instrument them.
mod gazetteer;

use std::collections::HashSet;

use geo::Geometry;

pub use gazetteer::{GazetteerIndex, IndexState, DEFAULT_NEAREST_CUTOFF_DEGREES};

use crate::errors::Result;

/// Read-only query surface of a built gazetteer index.
pub trait GazetteerQueries {
    /// Every pid whose footprint intersects `geometry`.
    fn spatial_query(&self, geometry: &Geometry<f64>) -> Result<HashSet<String>>;

    /// Pids of the nearest indexed footprints within `max_distance` degrees,
    /// ties included; empty if none is in range.
    fn spatial_nearest(
        &self,
        geometry: &Geometry<f64>,
        max_distance: f64,
    ) -> Result<HashSet<String>>;

    /// Pids holding a reference to the given URI.
    fn pids_by_link(&self, uri: &str) -> Result<HashSet<String>>;

    /// Reference URIs held by a place, optionally filtered to one netloc.
    /// An empty `target_netloc` disables the filter.
    fn links_by_pid(&self, pid: &str, target_netloc: &str) -> Result<HashSet<String>>;

    /// Pids indexed under the given (normalized) name string.
    fn pids_by_name(&self, name: &str) -> Result<HashSet<String>>;

    /// The full normalized name vocabulary, for fuzzy matching.
    fn name_vocabulary(&self) -> Result<Vec<String>>;
}
