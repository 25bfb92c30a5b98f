/// Dataset access module.
///
/// Providers for the two inputs of a matching run: the authoritative
/// gazetteer (one JSON record per place) and the candidate LPF GeoJSON file.
mod candidates;
mod places;

pub use candidates::CandidateDataset;
pub use places::{FileGazetteer, PlaceProvider};
