use std::collections::HashSet;

use geo::Geometry;
use tracing::debug;

use crate::config::MatchConfig;
use crate::errors::Result;
use crate::geometry::{buffer_geometry, centroid_latitude, meters_to_degrees};
use crate::index::{GazetteerQueries, DEFAULT_NEAREST_CUTOFF_DEGREES};
use crate::matching::fuzzy;
use crate::types::{CandidateFeature, MatchTag, MatchVotes, PlaceVotes};
use crate::uris::{netloc, trailing_segment};

/// Tunables for a matching run.
#[derive(Debug, Clone)]
pub struct MatcherOptions {
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
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            gazetteer_netloc: "pleiades.stoa.org".to_string(),
            spatial_buffer_km: 10.0,
            nearest_cutoff_degrees: DEFAULT_NEAREST_CUTOFF_DEGREES,
            fuzzy_score_cutoff: 90.0,
            fuzzy_limit: 5,
        }
    }
}

impl From<&MatchConfig> for MatcherOptions {
    fn from(config: &MatchConfig) -> Self {
        Self {
            gazetteer_netloc: config.gazetteer_netloc.clone(),
            spatial_buffer_km: config.spatial_buffer_km,
            nearest_cutoff_degrees: config.nearest_cutoff_degrees,
            fuzzy_score_cutoff: config.fuzzy_score_cutoff,
            fuzzy_limit: config.fuzzy_limit,
        }
    }
}

/// Runs the per-candidate multi-signal cascade against a built index,
/// producing vote sets.
///
/// Signals run in fixed precedence. Weak single-signal hits are retained,
/// not filtered; interpretation belongs to the ranker and the reviewer.
pub struct Matcher<'a, I: GazetteerQueries> {
    index: &'a I,
    options: MatcherOptions,
}

impl<'a, I: GazetteerQueries> Matcher<'a, I> {
    pub fn new(index: &'a I, options: MatcherOptions) -> Self {
        Self { index, options }
    }

    /// Matches every candidate, returning votes keyed by candidate id.
    pub fn match_all<'c, C>(&self, candidates: C) -> Result<MatchVotes>
    where
        C: IntoIterator<Item = &'c CandidateFeature>,
    {
        let vocabulary = self.index.name_vocabulary()?;
        let mut votes = MatchVotes::new();
        for candidate in candidates {
            let candidate_votes = self.match_one(candidate, &vocabulary)?;
            if candidate_votes.is_empty() {
                debug!(candidate = %candidate.id, "no match signals");
            } else {
                debug!(
                    candidate = %candidate.id,
                    places = candidate_votes.len(),
                    "matched"
                );
            }
            votes.insert(candidate.id.clone(), candidate_votes);
        }
        Ok(votes)
    }

    fn match_one(
        &self,
        candidate: &CandidateFeature,
        vocabulary: &[String],
    ) -> Result<PlaceVotes> {
        let mut votes = PlaceVotes::new();
        let candidate_netloc = netloc(&candidate.id);

        // First-order links point into the gazetteer's own namespace. A
        // reciprocal link back to the candidate is definitive: stop all
        // further signal evaluation for this candidate.
        for link in &candidate.links {
            if netloc(link).as_deref() != Some(self.options.gazetteer_netloc.as_str()) {
                continue;
            }
            let Some(pid) = trailing_segment(link) else {
                continue;
            };
            let entry = votes.entry(pid.clone()).or_default();
            entry.insert(MatchTag::FirstOrderLink);

            if let Some(candidate_netloc) = &candidate_netloc {
                let reverse = self.index.links_by_pid(&pid, candidate_netloc)?;
                if reverse.contains(&candidate.id) {
                    entry.insert(MatchTag::ReciprocalLink);
                    debug!(candidate = %candidate.id, %pid, "reciprocal link, short-circuiting");
                    return Ok(votes);
                }
            }
        }

        // Second-order: another place cites the same external URI.
        for link in &candidate.links {
            if netloc(link).as_deref() == Some(self.options.gazetteer_netloc.as_str()) {
                continue;
            }
            for pid in self.index.pids_by_link(link)? {
                votes.entry(pid).or_default().insert(MatchTag::SecondOrderLink);
            }
        }

        // Spatial overlap, falling back to proximity. Nearest hits stand in
        // for spatial hits when intersecting the fuzzy results below.
        let mut spatial_hits = HashSet::new();
        if let Some(geometry) = &candidate.geometry {
            if let Some(latitude) = centroid_latitude(geometry) {
                let radius =
                    meters_to_degrees(self.options.spatial_buffer_km * 1000.0, latitude);
                if let Some(buffered) = buffer_geometry(geometry, radius) {
                    spatial_hits = self.index.spatial_query(&Geometry::Polygon(buffered))?;
                }
                for pid in &spatial_hits {
                    votes.entry(pid.clone()).or_default().insert(MatchTag::Footprint);
                }
                if spatial_hits.is_empty() {
                    spatial_hits = self
                        .index
                        .spatial_nearest(geometry, self.options.nearest_cutoff_degrees)?;
                    for pid in &spatial_hits {
                        votes.entry(pid.clone()).or_default().insert(MatchTag::Nearest);
                    }
                }
            }
        }

        // Exact name lookups.
        for name in &candidate.name_strings {
            for pid in self.index.pids_by_name(name)? {
                votes.entry(pid).or_default().insert(MatchTag::ExactName);
            }
        }

        // Fuzzy name matches; without spatial plausibility they are
        // discarded whenever any spatial hits exist.
        let mut fuzzy_pids: HashSet<String> = HashSet::new();
        for name in &candidate.name_strings {
            for (matched_name, _score) in fuzzy::extract_top(
                name,
                vocabulary,
                self.options.fuzzy_score_cutoff,
                self.options.fuzzy_limit,
            ) {
                fuzzy_pids.extend(self.index.pids_by_name(matched_name)?);
            }
        }
        if !fuzzy_pids.is_empty() {
            if !spatial_hits.is_empty() {
                fuzzy_pids.retain(|pid| spatial_hits.contains(pid));
            }
            for pid in fuzzy_pids {
                votes.entry(pid).or_default().insert(MatchTag::FuzzyName);
            }
        }

        Ok(votes)
    }
}
