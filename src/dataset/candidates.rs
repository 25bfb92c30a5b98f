use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use geo::Geometry;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{PlaceMatchError, Result};
use crate::text::normalize_text;
use crate::types::CandidateFeature;
use crate::uris::{expand_compact, is_valid_url};

/// Link type carrying cross-reference identifiers in LPF.
const CLOSE_MATCH: &str = "closeMatch";

#[derive(Debug, Deserialize)]
struct LpfFile {
    #[serde(default)]
    citation: Option<serde_json::Value>,
    #[serde(default)]
    features: Vec<LpfFeature>,
}

#[derive(Debug, Deserialize)]
struct LpfFeature {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(default)]
    geometry: Option<geojson::Geometry>,
    #[serde(default)]
    properties: LpfProperties,
    #[serde(default)]
    names: Vec<LpfName>,
    #[serde(default)]
    links: Vec<LpfLink>,
}

#[derive(Debug, Default, Deserialize)]
struct LpfProperties {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    place_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LpfName {
    #[serde(default)]
    toponym: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LpfLink {
    #[serde(rename = "type", default)]
    link_type: String,
    #[serde(default)]
    identifier: String,
}

/// A dataset of candidate places loaded from an LPF GeoJSON file.
#[derive(Debug)]
pub struct CandidateDataset {
    pub citation: Option<serde_json::Value>,
    pub features: BTreeMap<String, CandidateFeature>,
}

impl CandidateDataset {
    /// Loads and realizes all candidate features from `path`.
    ///
    /// Duplicate feature ids and unrecognized link namespaces are fatal; a
    /// `citation.record_count` mismatch is logged, not fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let file: LpfFile =
            serde_json::from_str(&contents).map_err(|e| PlaceMatchError::Dataset {
                message: format!("failed to parse candidate file: {}", e),
                path: path.display().to_string(),
            })?;

        let mut features = BTreeMap::new();
        for feature in file.features {
            let Some(id) = feature.id.clone() else {
                return Err(PlaceMatchError::Dataset {
                    message: "candidate feature missing @id".to_string(),
                    path: path.display().to_string(),
                });
            };
            if features.contains_key(&id) {
                return Err(PlaceMatchError::DuplicateId { id });
            }
            let candidate = realize(id.clone(), feature)?;
            features.insert(id, candidate);
        }

        if let Some(expected) = file
            .citation
            .as_ref()
            .and_then(|c| c.get("record_count"))
            .and_then(|v| v.as_u64())
        {
            if expected as usize != features.len() {
                warn!(
                    expected,
                    found = features.len(),
                    "feature count does not match citation record_count"
                );
            }
        }

        info!(candidates = features.len(), path = %path.display(), "loaded candidate features");
        Ok(Self {
            citation: file.citation,
            features,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn realize(id: String, feature: LpfFeature) -> Result<CandidateFeature> {
    let mut name_strings = BTreeSet::new();
    if let Some(title) = &feature.properties.title {
        let title = normalize_text(title);
        if !title.is_empty() {
            name_strings.insert(title);
        }
    }
    for name in &feature.names {
        if let Some(toponym) = &name.toponym {
            let toponym = normalize_text(toponym);
            if !toponym.is_empty() {
                name_strings.insert(toponym);
            }
        }
    }

    let geometry = match feature.geometry {
        Some(raw) => match Geometry::<f64>::try_from(raw) {
            Ok(geometry) => Some(geometry),
            Err(err) => {
                warn!(candidate = %id, error = %err, "unusable candidate geometry, ignored");
                None
            }
        },
        None => None,
    };

    let mut links = BTreeSet::new();
    for link in &feature.links {
        if link.link_type != CLOSE_MATCH {
            continue;
        }
        let Some(uri) = expand_compact(&link.identifier)? else {
            continue;
        };
        if is_valid_url(&uri) {
            links.insert(uri);
        } else {
            warn!(candidate = %id, %uri, "ignored invalid URL in candidate links");
        }
    }

    Ok(CandidateFeature {
        id,
        geometry,
        name_strings,
        links,
        place_type_strings: feature.properties.place_types.iter().cloned().collect(),
    })
}
