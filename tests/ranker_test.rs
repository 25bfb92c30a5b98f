use std::collections::BTreeSet;

use placematch::matching::{rank, review_weights, WeightTable};
use placematch::types::MatchTag;

fn tags(tags: &[MatchTag]) -> BTreeSet<MatchTag> {
    tags.iter().copied().collect()
}

#[test]
fn test_rank_picks_first_subset_entry() {
    let weights: WeightTable = vec![
        tags(&[MatchTag::ReciprocalLink]),
        tags(&[MatchTag::Footprint, MatchTag::ExactName]),
        tags(&[MatchTag::Footprint]),
    ];

    assert_eq!(
        rank(
            &tags(&[MatchTag::Footprint, MatchTag::ExactName, MatchTag::Nearest]),
            &weights
        ),
        1,
        "footprint+exact name should match the second entry"
    );
    assert_eq!(rank(&tags(&[MatchTag::Footprint]), &weights), 2);
    assert_eq!(
        rank(&tags(&[MatchTag::Nearest]), &weights),
        3,
        "no subset match should rank past the table end"
    );
}

#[test]
fn test_rank_reciprocal_outranks_everything() {
    let weights = review_weights();
    let reciprocal = rank(
        &tags(&[MatchTag::ReciprocalLink, MatchTag::FirstOrderLink]),
        &weights,
    );
    assert_eq!(reciprocal, 0);

    let strong = rank(
        &tags(&[
            MatchTag::Footprint,
            MatchTag::ExactName,
            MatchTag::FirstOrderLink,
            MatchTag::PlaceType,
        ]),
        &weights,
    );
    assert!(strong > reciprocal);
}

#[test]
fn test_rank_empty_votes_rank_last() {
    let weights = review_weights();
    assert_eq!(rank(&BTreeSet::new(), &weights), weights.len());
}

#[test]
fn test_rank_empty_table() {
    assert_eq!(rank(&tags(&[MatchTag::Footprint]), &[]), 0);
}

#[test]
fn test_review_weights_are_ordered_by_confidence() {
    let weights = review_weights();
    assert_eq!(weights[0], tags(&[MatchTag::ReciprocalLink]));
    assert_eq!(*weights.last().unwrap(), tags(&[MatchTag::Footprint]));

    // A vote set matching a multi-signal entry must rank above its weakest
    // single-signal component.
    let combined = rank(
        &tags(&[MatchTag::Footprint, MatchTag::ExactName]),
        &weights,
    );
    let single = rank(&tags(&[MatchTag::Footprint]), &weights);
    assert!(combined < single);
}
