use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use placematch::config::{load_config, MatchConfig, CONFIG_FILENAME};
use placematch::dataset::{CandidateDataset, FileGazetteer, PlaceProvider};
use placematch::errors::{PlaceMatchError, Result};
use placematch::footprint::FootprintBuilder;
use placematch::index::GazetteerIndex;
use placematch::matching::{Matcher, MatcherOptions};
use placematch::types::MatchVotes;
use serde_json::json;

/// Match candidate place records against an authoritative gazetteer.
#[derive(Parser)]
#[command(
    name = "placematch",
    about = "Match candidate place records against an authoritative gazetteer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match candidates against the gazetteer and print a review report
    Match {
        /// Path to the gazetteer dataset directory (one JSON record per place)
        #[arg(short, long)]
        gazetteer: PathBuf,
        /// Path to the candidate places LPF GeoJSON file
        #[arg(short, long)]
        candidates: PathBuf,
        /// Directory for the footprint cache
        #[arg(long, default_value = ".placematch/footprints")]
        cache: PathBuf,
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Spatial buffer in kilometers (overrides the configured value)
        #[arg(short, long)]
        buffer_km: Option<f64>,
    },
    /// Compute and print one place's footprint as GeoJSON
    Footprint {
        /// Path to the gazetteer dataset directory
        #[arg(short, long)]
        gazetteer: PathBuf,
        /// Directory for the footprint cache
        #[arg(long, default_value = ".placematch/footprints")]
        cache: PathBuf,
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Place identifier
        pid: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Match {
            gazetteer,
            candidates,
            cache,
            config,
            buffer_km,
        } => {
            let mut config = resolve_config(config)?;
            if let Some(buffer_km) = buffer_km {
                config.spatial_buffer_km = buffer_km;
            }

            let provider = FileGazetteer::open(&gazetteer)?;
            let footprints = FootprintBuilder::new(&cache, &config)?;
            let mut index = GazetteerIndex::new();
            index.build(&provider, &footprints)?;

            let dataset = CandidateDataset::load(&candidates)?;
            let matcher = Matcher::new(&index, MatcherOptions::from(&config));
            let votes = matcher.match_all(dataset.features.values())?;

            let report = build_report(&index, &dataset, &votes, &config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Footprint {
            gazetteer,
            cache,
            config,
            pid,
        } => {
            let config = resolve_config(config)?;
            let provider = FileGazetteer::open(&gazetteer)?;
            let footprints = FootprintBuilder::new(&cache, &config)?;
            let raw = provider
                .get(&pid)?
                .ok_or_else(|| PlaceMatchError::Dataset {
                    message: format!("no place record for pid '{}'", pid),
                    path: gazetteer.display().to_string(),
                })?;
            match footprints.footprint(&pid, &raw)? {
                Some(polygon) => {
                    let geometry = geojson::Geometry::new(geojson::Value::from(&polygon));
                    println!("{}", serde_json::to_string_pretty(&geometry)?);
                }
                None => println!("null"),
            }
        }
    }
    Ok(())
}

/// Loads the configuration from the given path, or from `placematch.json`
/// in the working directory. A missing file yields the defaults.
fn resolve_config(path: Option<PathBuf>) -> Result<MatchConfig> {
    match path {
        Some(path) => load_config(&path),
        None => load_config(PathBuf::from(CONFIG_FILENAME).as_path()),
    }
}

/// Assembles the review report: each candidate with its known-place matches
/// and sorted match-type strings.
///
/// Pids voted for but absent from the gazetteer (dangling first-order links)
/// are dropped here; the vote sets themselves retain them.
fn build_report(
    index: &GazetteerIndex,
    dataset: &CandidateDataset,
    votes: &MatchVotes,
    config: &MatchConfig,
) -> Result<serde_json::Value> {
    let mut report = serde_json::Map::new();
    for (candidate_id, place_votes) in votes {
        let Some(candidate) = dataset.features.get(candidate_id) else {
            continue;
        };

        let mut matches = serde_json::Map::new();
        for (pid, tags) in place_votes {
            let Some(place) = index.get(pid)? else {
                continue;
            };
            let match_types: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
            matches.insert(
                pid.clone(),
                json!({
                    "place": {
                        "pid": place.pid,
                        "title": place.title,
                        "uri": format!("https://{}/places/{}", config.gazetteer_netloc, pid),
                        "name_strings": place.name_strings,
                        "place_types": place.place_type_uris,
                    },
                    "match_types": match_types,
                }),
            );
        }

        report.insert(
            candidate_id.clone(),
            json!({
                "candidate": {
                    "id": candidate.id,
                    "name_strings": candidate.name_strings,
                    "links": candidate.links,
                    "place_types": candidate.place_type_strings,
                },
                "matches": matches,
            }),
        );
    }
    Ok(serde_json::Value::Object(report))
}
