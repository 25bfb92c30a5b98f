use std::collections::BTreeSet;

use crate::types::{MatchTag, VoteSet};

/// An ordered sequence of tag-set thresholds, most-confident-first, used
/// only to rank vote sets for review, never to filter them.
pub type WeightTable = Vec<BTreeSet<MatchTag>>;

/// Classifies a vote set against an ordered weight table.
///
/// Returns the index of the first entry whose tag set is a subset of the
/// votes; `weights.len()` when none matches (lowest confidence). Sorting
/// matches by this value, with stable ties on original order, puts the most
/// confident matches first for a human reviewer.
pub fn rank(vote_tags: &VoteSet, weights: &[BTreeSet<MatchTag>]) -> usize {
    weights
        .iter()
        .position(|entry| entry.is_subset(vote_tags))
        .unwrap_or(weights.len())
}

/// The default review cascade.
///
/// A reciprocal link outranks everything; below that, combinations are
/// ordered by how many independent signals agree, with place-type agreement
/// breaking ties between otherwise equal combinations.
pub fn review_weights() -> WeightTable {
    use MatchTag::*;
    let entries: [&[MatchTag]; 27] = [
        &[ReciprocalLink],
        &[Footprint, ExactName, FirstOrderLink, PlaceType],
        &[Footprint, FuzzyName, FirstOrderLink, PlaceType],
        &[ExactName, FirstOrderLink, PlaceType],
        &[FuzzyName, FirstOrderLink, PlaceType],
        &[Footprint, ExactName, FirstOrderLink],
        &[Footprint, FuzzyName, FirstOrderLink],
        &[ExactName, FirstOrderLink],
        &[FuzzyName, FirstOrderLink],
        &[Footprint, ExactName, SecondOrderLink, PlaceType],
        &[Footprint, FuzzyName, SecondOrderLink, PlaceType],
        &[Footprint, ExactName, SecondOrderLink],
        &[Footprint, FuzzyName, SecondOrderLink],
        &[Footprint, FirstOrderLink, PlaceType],
        &[FirstOrderLink],
        &[Footprint, SecondOrderLink, PlaceType],
        &[SecondOrderLink, PlaceType],
        &[Footprint, ExactName, PlaceType],
        &[Footprint, FuzzyName, PlaceType],
        &[Footprint, ExactName],
        &[Footprint, FuzzyName],
        &[ExactName, PlaceType],
        &[FuzzyName, PlaceType],
        &[Footprint, PlaceType],
        &[ExactName],
        &[FuzzyName],
        &[Footprint],
    ];
    entries
        .iter()
        .map(|tags| tags.iter().copied().collect())
        .collect()
}
