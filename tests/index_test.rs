use geo::{Geometry, Point};
use placematch::config::MatchConfig;
use placematch::dataset::PlaceProvider;
use placematch::errors::{PlaceMatchError, Result};
use placematch::footprint::FootprintBuilder;
use placematch::index::{GazetteerIndex, GazetteerQueries, IndexState};
use placematch::types::{RawFeature, RawFeatureProperties, RawLocation, RawName, RawPlace, RawReference};
use tempfile::TempDir;

struct MemoryProvider {
    places: Vec<(String, RawPlace)>,
}

impl PlaceProvider for MemoryProvider {
    fn pids(&self) -> Result<Vec<String>> {
        Ok(self.places.iter().map(|(pid, _)| pid.clone()).collect())
    }

    fn get(&self, pid: &str) -> Result<Option<RawPlace>> {
        Ok(self
            .places
            .iter()
            .find(|(candidate, _)| candidate == pid)
            .map(|(_, raw)| raw.clone()))
    }
}

fn point_geometry(lon: f64, lat: f64) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::Point(vec![lon, lat]))
}

fn precise_place(title: &str, lon: f64, lat: f64, reference: &str) -> RawPlace {
    RawPlace {
        title: title.to_string(),
        locations: vec![RawLocation {
            geometry: Some(point_geometry(lon, lat)),
            accuracy_value: Some(1000.0),
            accuracy: "assessment".to_string(),
        }],
        features: vec![RawFeature {
            properties: RawFeatureProperties {
                location_precision: "precise".to_string(),
            },
        }],
        names: vec![RawName {
            attested: None,
            romanized: title.to_string(),
        }],
        references: if reference.is_empty() {
            vec![]
        } else {
            vec![RawReference {
                access_uri: reference.to_string(),
            }]
        },
        ..RawPlace::default()
    }
}

fn unlocated_place(title: &str, reference: &str) -> RawPlace {
    RawPlace {
        title: title.to_string(),
        names: vec![RawName {
            attested: None,
            romanized: title.to_string(),
        }],
        references: vec![RawReference {
            access_uri: reference.to_string(),
        }],
        ..RawPlace::default()
    }
}

fn build_index(places: Vec<(&str, RawPlace)>) -> (TempDir, GazetteerIndex) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let provider = MemoryProvider {
        places: places
            .into_iter()
            .map(|(pid, raw)| (pid.to_string(), raw))
            .collect(),
    };
    let footprints =
        FootprintBuilder::new(dir.path(), &MatchConfig::default()).expect("builder should open");
    let mut index = GazetteerIndex::new();
    index.build(&provider, &footprints).expect("build should succeed");
    (dir, index)
}

fn test_places() -> Vec<(&'static str, RawPlace)> {
    vec![
        (
            "550595",
            precise_place("Ankyra/Ancyra", 32.85, 39.95, "https://www.wikidata.org/wiki/Q3640"),
        ),
        ("628878", precise_place("Tarsus", 34.9, 36.9, "")),
        (
            "999001",
            unlocated_place("Vagueland", "https://www.geonames.org/42"),
        ),
    ]
}

#[test]
fn test_queries_fail_before_ready() {
    let index = GazetteerIndex::new();
    assert_eq!(index.state(), IndexState::Uninitialized);

    let geometry = Geometry::Point(Point::new(0.0, 0.0));
    match index.spatial_query(&geometry) {
        Err(PlaceMatchError::Initialization { .. }) => {}
        other => panic!("expected Initialization error, got {:?}", other),
    }
    assert!(index.pids_by_name("Ankyra").is_err());
    assert!(index.pids_by_link("https://www.wikidata.org/wiki/Q3640").is_err());
    assert!(index.name_vocabulary().is_err());
    assert!(index.get("550595").is_err());
}

#[test]
fn test_build_reaches_ready() {
    let (_dir, index) = build_index(test_places());
    assert_eq!(index.state(), IndexState::Ready);
    assert_eq!(index.len(), 3);
}

#[test]
fn test_index_is_built_exactly_once() {
    let dir = TempDir::new().unwrap();
    let provider = MemoryProvider { places: vec![] };
    let footprints = FootprintBuilder::new(dir.path(), &MatchConfig::default()).unwrap();

    let mut index = GazetteerIndex::new();
    index.build(&provider, &footprints).unwrap();
    match index.build(&provider, &footprints) {
        Err(PlaceMatchError::Initialization { .. }) => {}
        other => panic!("expected Initialization error, got {:?}", other),
    }
}

#[test]
fn test_duplicate_pid_aborts_build() {
    let dir = TempDir::new().unwrap();
    let provider = MemoryProvider {
        places: vec![
            ("550595".to_string(), precise_place("Ankyra", 32.85, 39.95, "")),
            ("550595".to_string(), precise_place("Ankyra", 32.85, 39.95, "")),
        ],
    };
    let footprints = FootprintBuilder::new(dir.path(), &MatchConfig::default()).unwrap();

    let mut index = GazetteerIndex::new();
    match index.build(&provider, &footprints) {
        Err(PlaceMatchError::DuplicateId { id }) => assert_eq!(id, "550595"),
        other => panic!("expected DuplicateId error, got {:?}", other),
    }
}

#[test]
fn test_name_index_covers_title_segments_and_romanized_forms() {
    let (_dir, index) = build_index(test_places());

    assert!(index.pids_by_name("Ankyra").unwrap().contains("550595"));
    assert!(index.pids_by_name("Ancyra").unwrap().contains("550595"));
    assert!(index.pids_by_name("Vagueland").unwrap().contains("999001"));
    assert!(index.pids_by_name("Atlantis").unwrap().is_empty());
}

#[test]
fn test_link_indexes_are_duals() {
    let (_dir, index) = build_index(test_places());

    assert!(index
        .pids_by_link("https://www.wikidata.org/wiki/Q3640")
        .unwrap()
        .contains("550595"));
    assert!(index.pids_by_link("https://example.org/unknown").unwrap().is_empty());

    let links = index.links_by_pid("550595", "").unwrap();
    assert!(links.contains("https://www.wikidata.org/wiki/Q3640"));

    let filtered = index.links_by_pid("550595", "www.wikidata.org").unwrap();
    assert_eq!(filtered.len(), 1);
    let wrong_netloc = index.links_by_pid("550595", "www.geonames.org").unwrap();
    assert!(wrong_netloc.is_empty());
}

#[test]
fn test_spatial_query_is_reflexive() {
    let (_dir, index) = build_index(test_places());

    let footprint = index
        .get("550595")
        .unwrap()
        .expect("place should exist")
        .footprint
        .clone()
        .expect("precise place should have a footprint");

    let hits = index.spatial_query(&Geometry::Polygon(footprint)).unwrap();
    assert!(hits.contains("550595"), "a footprint must intersect itself");
    assert!(!hits.contains("628878"), "Tarsus is hundreds of km away");
}

#[test]
fn test_unlocated_place_is_absent_from_spatial_index_only() {
    let (_dir, index) = build_index(test_places());

    // Reachable through name and link indexes.
    assert!(index.pids_by_name("Vagueland").unwrap().contains("999001"));
    assert!(index
        .pids_by_link("https://www.geonames.org/42")
        .unwrap()
        .contains("999001"));
    assert!(index.get("999001").unwrap().unwrap().footprint.is_none());

    // Invisible to spatial queries, even right at its nominal location.
    let geometry = Geometry::Point(Point::new(20.0, 40.0));
    assert!(index.spatial_query(&geometry).unwrap().is_empty());
    assert!(index.spatial_nearest(&geometry, 0.18).unwrap().is_empty());
}

#[test]
fn test_spatial_nearest_respects_the_cutoff() {
    let (_dir, index) = build_index(test_places());

    // ~0.05 degrees east of Ankyra's footprint.
    let near = Geometry::Point(Point::new(32.90, 39.95));
    let hits = index.spatial_nearest(&near, 0.18).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits.contains("550595"));

    // Nothing indexed within range of the null island.
    let far = Geometry::Point(Point::new(0.0, 0.0));
    assert!(index.spatial_nearest(&far, 0.18).unwrap().is_empty());
}

#[test]
fn test_spatial_nearest_returns_only_the_nearest() {
    let (_dir, index) = build_index(vec![
        ("a", precise_place("Alpha", 10.0, 40.0, "")),
        ("b", precise_place("Beta", 10.1, 40.0, "")),
    ]);

    // Closer to Alpha; both are within the cutoff.
    let probe = Geometry::Point(Point::new(10.02, 40.0));
    let hits = index.spatial_nearest(&probe, 0.5).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits.contains("a"));
}
