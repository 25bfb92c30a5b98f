use std::fs;
use std::path::Path;

use placematch::config::MatchConfig;
use placematch::dataset::{CandidateDataset, FileGazetteer};
use placematch::footprint::FootprintBuilder;
use placematch::index::GazetteerIndex;
use placematch::matching::{rank, review_weights, Matcher, MatcherOptions};
use placematch::types::MatchTag;
use tempfile::TempDir;

fn write_place(dir: &Path, pid: &str, record: serde_json::Value) {
    fs::write(
        dir.join(format!("{pid}.json")),
        serde_json::to_string_pretty(&record).unwrap(),
    )
    .unwrap();
}

fn seed_gazetteer(dir: &Path) {
    write_place(
        dir,
        "550595",
        serde_json::json!({
            "title": "Ankyra/Ancyra",
            "locations": [{
                "geometry": {"type": "Point", "coordinates": [32.85, 39.95]},
                "accuracy_value": 1000.0,
                "accuracy": "https://pleiades.stoa.org/features/metadata/generic-osm-accuracy-assessment"
            }],
            "features": [{"properties": {"location_precision": "precise"}}],
            "names": [{"attested": "Ἄγκυρα", "romanized": "Ankyra, Ankura"}],
            "references": [{"accessURI": "https://www.wikidata.org/wiki/Q3640"}],
            "placeTypeURIs": ["settlement"]
        }),
    );
    write_place(
        dir,
        "72199",
        serde_json::json!({
            "title": "Gordion",
            "locations": [{
                "geometry": {"type": "Point", "coordinates": [31.99, 39.65]},
                "accuracy_value": 1000.0,
                "accuracy": "https://pleiades.stoa.org/features/metadata/generic-osm-accuracy-assessment"
            }],
            "features": [{"properties": {"location_precision": "precise"}}],
            "names": [{"attested": null, "romanized": "Gordion"}],
            "references": [{"accessURI": "https://whgazetteer.org/api/db/?id=86325"}],
            "placeTypeURIs": ["settlement"]
        }),
    );
    write_place(
        dir,
        "999001",
        serde_json::json!({
            "title": "Vagueland",
            "locations": [],
            "features": [],
            "names": [{"attested": null, "romanized": "Vagueland"}],
            "references": [{"accessURI": "https://www.geonames.org/42"}],
            "placeTypeURIs": []
        }),
    );
}

const CANDIDATES: &str = r#"{
  "citation": {"record_count": 3},
  "features": [
    {
      "@id": "https://whgazetteer.org/api/db/?id=1",
      "geometry": {"type": "Point", "coordinates": [32.85, 39.95]},
      "properties": {"title": "Ancyra", "place_types": ["settlement"]},
      "names": [{"toponym": "Ancyra"}],
      "links": [{"type": "closeMatch", "identifier": "wd:Q3640"}]
    },
    {
      "@id": "https://whgazetteer.org/api/db/?id=86325",
      "geometry": {"type": "Point", "coordinates": [32.85, 39.95]},
      "properties": {"title": "Ankyra", "place_types": ["settlement"]},
      "names": [{"toponym": "Ankyra"}],
      "links": [{"type": "closeMatch", "identifier": "pl:72199"}]
    },
    {
      "@id": "https://whgazetteer.org/api/db/?id=3",
      "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
      "properties": {"title": "Atlantis", "place_types": []},
      "names": [],
      "links": []
    }
  ]
}"#;

#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let gazetteer_dir = dir.path().join("gazetteer");
    let cache_dir = dir.path().join("footprints");
    fs::create_dir_all(&gazetteer_dir).unwrap();
    seed_gazetteer(&gazetteer_dir);

    let candidates_path = dir.path().join("candidates.json");
    fs::write(&candidates_path, CANDIDATES).unwrap();

    let config = MatchConfig::default();
    let provider = FileGazetteer::open(&gazetteer_dir).unwrap();
    assert_eq!(provider.len(), 3);

    let footprints = FootprintBuilder::new(&cache_dir, &config).unwrap();
    let mut index = GazetteerIndex::new();
    index.build(&provider, &footprints).unwrap();
    assert_eq!(index.len(), 3);

    // Every footprint computation (including the explicit no-footprint
    // answer for Vagueland) lands in the cache.
    assert!(cache_dir.join("550595.json").exists());
    assert!(cache_dir.join("999001.json").exists());

    let dataset = CandidateDataset::load(&candidates_path).unwrap();
    assert_eq!(dataset.len(), 3);

    let matcher = Matcher::new(&index, MatcherOptions::from(&config));
    let votes = matcher.match_all(dataset.features.values()).unwrap();

    // Candidate 1 sits on Ankyra's footprint, shares a name and a second-order
    // link through the common wikidata URI.
    let overlapping = &votes["https://whgazetteer.org/api/db/?id=1"];
    let ankyra_tags = &overlapping["550595"];
    assert!(ankyra_tags.contains(&MatchTag::Footprint));
    assert!(ankyra_tags.contains(&MatchTag::ExactName));
    assert!(ankyra_tags.contains(&MatchTag::SecondOrderLink));
    assert!(!overlapping.contains_key("999001"), "no signal for Vagueland");

    // Candidate 2 carries a first-order link to Gordion, and Gordion links
    // back: the reciprocal match suppresses every other signal, including the
    // footprint and name hits this candidate would otherwise score on Ankyra.
    let reciprocal = &votes["https://whgazetteer.org/api/db/?id=86325"];
    assert_eq!(reciprocal.len(), 1);
    assert_eq!(
        reciprocal["72199"].iter().copied().collect::<Vec<_>>(),
        vec![MatchTag::FirstOrderLink, MatchTag::ReciprocalLink]
    );

    // Candidate 3 matches nothing anywhere.
    assert!(votes["https://whgazetteer.org/api/db/?id=3"].is_empty());

    // The review table puts the reciprocal match first.
    let weights = review_weights();
    let reciprocal_rank = rank(&reciprocal["72199"], &weights);
    let overlapping_rank = rank(ankyra_tags, &weights);
    assert_eq!(reciprocal_rank, 0);
    assert!(overlapping_rank > reciprocal_rank);
    assert!(overlapping_rank < weights.len());
}

#[test]
fn test_pipeline_reuses_the_footprint_cache() {
    let dir = TempDir::new().unwrap();
    let gazetteer_dir = dir.path().join("gazetteer");
    let cache_dir = dir.path().join("footprints");
    fs::create_dir_all(&gazetteer_dir).unwrap();
    seed_gazetteer(&gazetteer_dir);

    let config = MatchConfig::default();
    let provider = FileGazetteer::open(&gazetteer_dir).unwrap();

    let footprints = FootprintBuilder::new(&cache_dir, &config).unwrap();
    let mut first = GazetteerIndex::new();
    first.build(&provider, &footprints).unwrap();

    let cached_entry = fs::read_to_string(cache_dir.join("550595.json")).unwrap();

    // A second build over the same cache serves the stored footprints
    // without rewriting them.
    let footprints = FootprintBuilder::new(&cache_dir, &config).unwrap();
    let mut second = GazetteerIndex::new();
    second.build(&provider, &footprints).unwrap();

    assert_eq!(
        fs::read_to_string(cache_dir.join("550595.json")).unwrap(),
        cached_entry
    );
    assert_eq!(first.len(), second.len());
}
