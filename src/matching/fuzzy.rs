/// Lowercases, strips non-alphanumeric characters, and collapses whitespace.
///
/// Both sides of every fuzzy comparison go through this before scoring.
pub fn default_process(s: &str) -> String {
    let replaced: String = s
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![' ']
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Weighted-ratio similarity score between two processed strings, 0-100.
///
/// The better of the plain edit-distance ratio and the token-sorted ratio,
/// so word order does not penalize multi-word names.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let full = strsim::normalized_levenshtein(a, b);
    let token_sort = strsim::normalized_levenshtein(&sort_tokens(a), &sort_tokens(b));
    100.0 * full.max(token_sort)
}

/// Scores `query` against every choice and returns the best hits.
///
/// Hits below `score_cutoff` are dropped; at most `limit` survive, best
/// first.
pub fn extract_top<'a>(
    query: &str,
    choices: &'a [String],
    score_cutoff: f64,
    limit: usize,
) -> Vec<(&'a str, f64)> {
    let processed_query = default_process(query);
    let mut scored: Vec<(&'a str, f64)> = choices
        .iter()
        .filter_map(|choice| {
            let score = weighted_ratio(&processed_query, &default_process(choice));
            (score >= score_cutoff).then_some((choice.as_str(), score))
        })
        .collect();
    scored.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| x.0.cmp(y.0)));
    scored.truncate(limit);
    scored
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
