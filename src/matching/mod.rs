/// Matching module.
///
/// Runs the per-candidate multi-signal cascade against a built gazetteer
/// index and ranks the resulting vote sets for human review.
mod fuzzy;
mod matcher;
mod ranker;

pub use fuzzy::{default_process, extract_top, weighted_ratio};
pub use matcher::{Matcher, MatcherOptions};
pub use ranker::{rank, review_weights, WeightTable};
