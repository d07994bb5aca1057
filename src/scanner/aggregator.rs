use crate::models::Candidate;
use std::collections::HashSet;

/// Merges per-source lists in source order. The first occurrence of a key
/// wins; later duplicates are dropped.
pub fn aggregate<I>(per_source: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut seen = HashSet::new();
    per_source
        .into_iter()
        .flatten()
        .filter(|candidate| seen.insert(candidate.key.clone()))
        .collect()
}
