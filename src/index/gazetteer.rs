use std::collections::{HashMap, HashSet};

use geo::{BoundingRect, Centroid, Geometry, Intersects, Polygon};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use tracing::{debug, info, warn};

use crate::dataset::PlaceProvider;
use crate::errors::{PlaceMatchError, Result};
use crate::footprint::FootprintBuilder;
use crate::geometry::{half_diagonal, vertex_distance};
use crate::index::GazetteerQueries;
use crate::text::normalize_text;
use crate::types::GazetteerPlace;
use crate::uris::netloc;

/// Default cutoff for the nearest-footprint query, in degrees (~20 km).
pub const DEFAULT_NEAREST_CUTOFF_DEGREES: f64 = 0.18;

/// Footprints at most this much farther than the minimum distance count as
/// tied for nearest.
const DISTANCE_TIE_EPSILON: f64 = 1e-9;

type SpatialEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Lifecycle of a `GazetteerIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Uninitialized,
    Building,
    Ready,
}

impl IndexState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexState::Uninitialized => "uninitialized",
            IndexState::Building => "building",
            IndexState::Ready => "ready",
        }
    }
}

/// Owns the reference dataset and the indexes built over it.
///
/// Built exactly once by a single pass over all gazetteer entries; after the
/// state reaches `Ready` every index is read-only, so concurrent querying
/// needs no locking.
pub struct GazetteerIndex {
    state: IndexState,
    places: HashMap<String, GazetteerPlace>,
    /// Normalized name string -> pids indexed under it.
    names: HashMap<String, HashSet<String>>,
    /// Reference URI -> pids holding it.
    links_forward: HashMap<String, HashSet<String>>,
    /// Pid -> reference URIs it holds.
    links_reverse: HashMap<String, HashSet<String>>,
    /// Position-indexed side table backing the spatial tree.
    footprints: Vec<(String, Polygon<f64>)>,
    tree: RTree<SpatialEntry>,
    vocabulary: Vec<String>,
}

impl GazetteerIndex {
    /// Creates an empty, uninitialized index.
    pub fn new() -> Self {
        Self {
            state: IndexState::Uninitialized,
            places: HashMap::new(),
            names: HashMap::new(),
            links_forward: HashMap::new(),
            links_reverse: HashMap::new(),
            footprints: Vec::new(),
            tree: RTree::new(),
            vocabulary: Vec::new(),
        }
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    /// Number of realized places. Zero until built.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Builds all three indexes in a single pass over the provider's pids.
    ///
    /// Build order is irrelevant to the result. Duplicate pids and
    /// data-integrity failures abort the build; a place whose footprint
    /// fails hull construction is excluded from the spatial index, logged,
    /// and kept in the name/link indexes.
    pub fn build<P: PlaceProvider>(
        &mut self,
        provider: &P,
        footprints: &FootprintBuilder,
    ) -> Result<()> {
        if self.state != IndexState::Uninitialized {
            return Err(PlaceMatchError::Initialization {
                message: format!("index already {}, cannot rebuild", self.state.as_str()),
            });
        }
        self.state = IndexState::Building;

        for pid in provider.pids()? {
            let Some(raw) = provider.get(&pid)? else {
                warn!(%pid, "enumerated place could not be loaded, skipping");
                continue;
            };
            self.insert_place(&pid, &raw, footprints)?;
        }

        let entries: Vec<SpatialEntry> = self
            .footprints
            .iter()
            .enumerate()
            .filter_map(|(position, (_, polygon))| {
                let rect = polygon.bounding_rect()?;
                Some(GeomWithData::new(
                    Rectangle::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    position,
                ))
            })
            .collect();
        self.tree = RTree::bulk_load(entries);

        self.vocabulary = self.names.keys().cloned().collect();
        self.vocabulary.sort_unstable();

        self.state = IndexState::Ready;
        info!(
            places = self.places.len(),
            names = self.names.len(),
            links = self.links_forward.len(),
            footprints = self.footprints.len(),
            "gazetteer index ready"
        );
        Ok(())
    }

    /// Returns a realized place by pid.
    pub fn get(&self, pid: &str) -> Result<Option<&GazetteerPlace>> {
        self.ensure_ready()?;
        Ok(self.places.get(pid))
    }

    fn insert_place(
        &mut self,
        pid: &str,
        raw: &crate::types::RawPlace,
        footprints: &FootprintBuilder,
    ) -> Result<()> {
        if self.places.contains_key(pid) {
            return Err(PlaceMatchError::DuplicateId {
                id: pid.to_string(),
            });
        }

        let footprint = match footprints.footprint(pid, raw) {
            Ok(footprint) => footprint,
            Err(err @ PlaceMatchError::Footprint { .. }) => {
                warn!(pid, error = %err, "footprint failed, place excluded from spatial index");
                None
            }
            Err(err) => return Err(err),
        };

        let place = GazetteerPlace::from_raw(pid, raw, footprint);

        for name in &place.name_strings {
            self.names
                .entry(name.clone())
                .or_default()
                .insert(pid.to_string());
        }

        for uri in &place.external_links {
            let holders = self.links_forward.entry(uri.clone()).or_default();
            holders.insert(pid.to_string());
            if holders.len() > 1 {
                debug!(%uri, holders = holders.len(), "reference URI shared by multiple places");
            }
            self.links_reverse
                .entry(pid.to_string())
                .or_default()
                .insert(uri.clone());
        }

        if let Some(polygon) = &place.footprint {
            self.footprints.push((pid.to_string(), polygon.clone()));
        }

        self.places.insert(pid.to_string(), place);
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state == IndexState::Ready {
            Ok(())
        } else {
            Err(PlaceMatchError::Initialization {
                message: format!(
                    "query issued while index is {}, not ready",
                    self.state.as_str()
                ),
            })
        }
    }
}

impl Default for GazetteerIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl GazetteerQueries for GazetteerIndex {
    fn spatial_query(&self, geometry: &Geometry<f64>) -> Result<HashSet<String>> {
        self.ensure_ready()?;
        let mut hits = HashSet::new();
        let Some(rect) = geometry.bounding_rect() else {
            return Ok(hits);
        };
        let envelope = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        for entry in self.tree.locate_in_envelope_intersecting(&envelope) {
            let (pid, footprint) = &self.footprints[entry.data];
            if geometry.intersects(footprint) {
                hits.insert(pid.clone());
            }
        }
        Ok(hits)
    }

    fn spatial_nearest(
        &self,
        geometry: &Geometry<f64>,
        max_distance: f64,
    ) -> Result<HashSet<String>> {
        self.ensure_ready()?;
        let mut nearest = HashSet::new();
        let Some(centroid) = geometry.centroid() else {
            return Ok(nearest);
        };

        // Envelope distance to the centroid lower-bounds the exact distance
        // minus the geometry's own extent, so this reach misses nothing.
        let reach = max_distance + half_diagonal(geometry);
        let mut in_range: Vec<(f64, &str)> = Vec::new();
        let mut best = f64::INFINITY;
        for entry in self
            .tree
            .locate_within_distance([centroid.x(), centroid.y()], reach * reach)
        {
            let (pid, footprint) = &self.footprints[entry.data];
            let Some(distance) = vertex_distance(geometry, footprint) else {
                continue;
            };
            if distance <= max_distance {
                best = best.min(distance);
                in_range.push((distance, pid.as_str()));
            }
        }

        for (distance, pid) in in_range {
            if distance - best <= DISTANCE_TIE_EPSILON {
                nearest.insert(pid.to_string());
            }
        }
        Ok(nearest)
    }

    fn pids_by_link(&self, uri: &str) -> Result<HashSet<String>> {
        self.ensure_ready()?;
        Ok(self
            .links_forward
            .get(uri.trim())
            .cloned()
            .unwrap_or_default())
    }

    fn links_by_pid(&self, pid: &str, target_netloc: &str) -> Result<HashSet<String>> {
        self.ensure_ready()?;
        let Some(links) = self.links_reverse.get(pid) else {
            return Ok(HashSet::new());
        };
        if target_netloc.is_empty() {
            return Ok(links.clone());
        }
        Ok(links
            .iter()
            .filter(|uri| netloc(uri).as_deref() == Some(target_netloc))
            .cloned()
            .collect())
    }

    fn pids_by_name(&self, name: &str) -> Result<HashSet<String>> {
        self.ensure_ready()?;
        Ok(self
            .names
            .get(&normalize_text(name))
            .cloned()
            .unwrap_or_default())
    }

    fn name_vocabulary(&self) -> Result<Vec<String>> {
        self.ensure_ready()?;
        Ok(self.vocabulary.clone())
    }
}
