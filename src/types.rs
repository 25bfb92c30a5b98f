use std::collections::{BTreeMap, BTreeSet};

use geo::{Geometry, Polygon};
use serde::{Deserialize, Serialize};

use crate::text::normalize_text;

/// Positional precision of a gazetteer location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Precise,
    Rough,
    #[default]
    Unknown,
}

#[allow(clippy::should_implement_trait)]
impl Precision {
    /// Returns the string representation of this precision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Precise => "precise",
            Precision::Rough => "rough",
            Precision::Unknown => "unknown",
        }
    }

    /// Parses a string into a `Precision`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<Precision> {
        match s {
            "precise" => Some(Precision::Precise),
            "rough" => Some(Precision::Rough),
            "unknown" => Some(Precision::Unknown),
            _ => None,
        }
    }
}

/// Kinds of match signal that can vote for a (candidate, place) pair.
///
/// The matcher emits every tag except `PlaceType`, which only appears in
/// review weight tables and is added to vote sets by downstream review
/// tooling when place types agree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MatchTag {
    #[serde(rename = "footprint")]
    Footprint,
    #[serde(rename = "nearest")]
    Nearest,
    #[serde(rename = "exact name")]
    ExactName,
    #[serde(rename = "fuzzy name")]
    FuzzyName,
    #[serde(rename = "first-order link")]
    FirstOrderLink,
    #[serde(rename = "second-order link")]
    SecondOrderLink,
    #[serde(rename = "reciprocal link")]
    ReciprocalLink,
    #[serde(rename = "place type")]
    PlaceType,
}

#[allow(clippy::should_implement_trait)]
impl MatchTag {
    /// Returns the string representation of this match tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTag::Footprint => "footprint",
            MatchTag::Nearest => "nearest",
            MatchTag::ExactName => "exact name",
            MatchTag::FuzzyName => "fuzzy name",
            MatchTag::FirstOrderLink => "first-order link",
            MatchTag::SecondOrderLink => "second-order link",
            MatchTag::ReciprocalLink => "reciprocal link",
            MatchTag::PlaceType => "place type",
        }
    }

    /// Parses a string into a `MatchTag`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<MatchTag> {
        match s {
            "footprint" => Some(MatchTag::Footprint),
            "nearest" => Some(MatchTag::Nearest),
            "exact name" => Some(MatchTag::ExactName),
            "fuzzy name" => Some(MatchTag::FuzzyName),
            "first-order link" => Some(MatchTag::FirstOrderLink),
            "second-order link" => Some(MatchTag::SecondOrderLink),
            "reciprocal link" => Some(MatchTag::ReciprocalLink),
            "place type" => Some(MatchTag::PlaceType),
            _ => None,
        }
    }
}

/// The match-signal tags accumulated for one (candidate, place) pair.
pub type VoteSet = BTreeSet<MatchTag>;

/// Votes for one candidate, keyed by gazetteer place id.
pub type PlaceVotes = BTreeMap<String, VoteSet>;

/// Votes for a whole candidate dataset, keyed by candidate id.
pub type MatchVotes = BTreeMap<String, PlaceVotes>;

/// One raw location record of a gazetteer place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
    #[serde(default)]
    pub accuracy_value: Option<f64>,
    /// URI of the accuracy assessment this location's accuracy value came from.
    #[serde(default)]
    pub accuracy: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeatureProperties {
    #[serde(default)]
    pub location_precision: String,
}

/// GeoJSON-feature metadata running parallel to a place's `locations` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub properties: RawFeatureProperties,
}

/// One name record of a gazetteer place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawName {
    #[serde(default)]
    pub attested: Option<String>,
    /// Comma-separated romanized forms.
    #[serde(default)]
    pub romanized: String,
}

/// One citation/reference record of a gazetteer place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReference {
    #[serde(rename = "accessURI", default)]
    pub access_uri: String,
}

/// A gazetteer place record as stored on disk, before realization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub locations: Vec<RawLocation>,
    #[serde(default)]
    pub features: Vec<RawFeature>,
    #[serde(default)]
    pub names: Vec<RawName>,
    #[serde(default)]
    pub references: Vec<RawReference>,
    #[serde(rename = "placeTypeURIs", default)]
    pub place_type_uris: Vec<String>,
}

impl RawPlace {
    /// Pairs each location with the precision flag of its parallel feature.
    ///
    /// Locations without a parallel feature entry are `Unknown`.
    pub fn located_precisions(&self) -> impl Iterator<Item = (&RawLocation, Precision)> {
        self.locations.iter().enumerate().map(|(i, location)| {
            let precision = self
                .features
                .get(i)
                .and_then(|f| Precision::from_str(&f.properties.location_precision))
                .unwrap_or_default();
            (location, precision)
        })
    }

    /// Overall positional precision: the best precision of any location.
    pub fn overall_precision(&self) -> Precision {
        let mut overall = Precision::Unknown;
        for (_, precision) in self.located_precisions() {
            match precision {
                Precision::Precise => return Precision::Precise,
                Precision::Rough => overall = Precision::Rough,
                Precision::Unknown => {}
            }
        }
        overall
    }
}

/// A reference entity realized from raw storage.
///
/// Immutable once realized; the computed fields (`name_strings`, `footprint`,
/// `precision`) are populated eagerly at construction.
#[derive(Debug, Clone)]
pub struct GazetteerPlace {
    pub pid: String,
    pub title: String,
    pub name_strings: BTreeSet<String>,
    pub footprint: Option<Polygon<f64>>,
    pub precision: Precision,
    pub place_type_uris: BTreeSet<String>,
    pub external_links: BTreeSet<String>,
}

impl GazetteerPlace {
    /// Realizes a place from its raw record and a precomputed footprint.
    pub fn from_raw(pid: &str, raw: &RawPlace, footprint: Option<Polygon<f64>>) -> Self {
        let mut name_strings = BTreeSet::new();
        for segment in title_name_segments(&raw.title) {
            name_strings.insert(segment);
        }
        for name in &raw.names {
            if let Some(attested) = &name.attested {
                let attested = normalize_text(attested);
                if !attested.is_empty() {
                    name_strings.insert(attested);
                }
            }
            for romanized in name.romanized.split(',') {
                let romanized = normalize_text(romanized);
                if !romanized.is_empty() {
                    name_strings.insert(romanized);
                }
            }
        }

        let external_links = raw
            .references
            .iter()
            .map(|r| r.access_uri.trim())
            .filter(|uri| !uri.is_empty())
            .map(str::to_owned)
            .collect();

        GazetteerPlace {
            pid: pid.to_string(),
            title: raw.title.clone(),
            name_strings,
            footprint,
            precision: raw.overall_precision(),
            place_type_uris: raw.place_type_uris.iter().cloned().collect(),
            external_links,
        }
    }
}

/// Splits a place title on `/` into normalized name segments.
///
/// Parenthesis-wrapped segments are alternate forms, not names, and are
/// skipped.
pub fn title_name_segments(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split('/')
        .map(|segment| normalize_text(segment))
        .filter(|segment| {
            !segment.is_empty() && !(segment.starts_with('(') && segment.ends_with(')'))
        })
}

/// An incoming record to be resolved against the gazetteer.
///
/// Link identifiers are absolute URIs; compact identifiers are expanded by
/// the candidate loader before a `CandidateFeature` is constructed.
#[derive(Debug, Clone, Default)]
pub struct CandidateFeature {
    pub id: String,
    pub geometry: Option<Geometry<f64>>,
    pub name_strings: BTreeSet<String>,
    pub links: BTreeSet<String>,
    pub place_type_strings: BTreeSet<String>,
}
