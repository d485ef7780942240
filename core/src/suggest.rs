//! Recency-ranked name suggestions with whitespace-token AND matching.

use std::cmp::Reverse;
use std::collections::HashSet;

/// Maximum number of food names offered for one query.
pub const FOOD_SUGGESTION_LIMIT: usize = 20;

/// Maximum number of exercise names offered for one query.
pub const WORKOUT_NAME_LIMIT: usize = 20;

/// Anything that can be suggested by name and ranked by last use.
pub trait Suggestible {
    fn name(&self) -> &str;
    fn last_used(&self) -> i64;
}

impl Suggestible for crate::models::Food {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_used(&self) -> i64 {
        self.last_used
    }
}

impl Suggestible for crate::models::WorkoutName {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_used(&self) -> i64 {
        self.last_used
    }
}

/// Lowercased whitespace-separated tokens of a query.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// `true` when `name` contains every token, ignoring case.
#[must_use]
pub fn matches_all(name: &str, tokens: &[String]) -> bool {
    let name = name.to_lowercase();
    tokens.iter().all(|t| name.contains(t.as_str()))
}

/// Names matching every token of `query`, most recently used first, ties
/// broken by name, without duplicates, at most `limit` long. A query with no
/// tokens matches nothing.
#[must_use]
pub fn suggest<T: Suggestible>(candidates: &[T], query: &str, limit: usize) -> Vec<String> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<&T> = candidates
        .iter()
        .filter(|c| matches_all(c.name(), &tokens))
        .collect();
    hits.sort_by(|a, b| {
        Reverse(a.last_used())
            .cmp(&Reverse(b.last_used()))
            .then_with(|| a.name().cmp(b.name()))
    });

    let mut seen = HashSet::new();
    hits.into_iter()
        .map(|c| c.name())
        .filter(|name| seen.insert(*name))
        .take(limit)
        .map(str::to_string)
        .collect()
}
