//! Ranked user search over username and display name.
//!
//! Tiers, best first: exact match on either field, prefix match on either
//! field, any other substring match. Within a tier: exact-username before
//! exact-display-name, then shorter username, then shorter display name, then
//! username in byte order. All comparisons ignore case.

use std::cmp::Ordering;

use crate::constants::{SEARCH_MAX_LIMIT, SEARCH_MIN_LIMIT};
use crate::db::DynStore;
use crate::error::{codes, AppError, AppResult};
use crate::models::UserPublic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact = 1,
    Prefix = 2,
    Substring = 3,
}

/// Tier of `user` for an already lowercased query, or `None` if it does not match.
pub fn classify(query_lower: &str, user: &UserPublic) -> Option<MatchTier> {
    let username = user.username.to_lowercase();
    let display_name = user.display_name.to_lowercase();

    if username == query_lower || display_name == query_lower {
        Some(MatchTier::Exact)
    } else if username.starts_with(query_lower) || display_name.starts_with(query_lower) {
        Some(MatchTier::Prefix)
    } else if username.contains(query_lower) || display_name.contains(query_lower) {
        Some(MatchTier::Substring)
    } else {
        None
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey<'a> {
    tier: MatchTier,
    username_inexact: bool,
    display_name_inexact: bool,
    username_len: usize,
    display_name_len: usize,
    username: &'a str,
}

fn rank_key<'a>(query_lower: &str, tier: MatchTier, user: &'a UserPublic) -> RankKey<'a> {
    RankKey {
        tier,
        username_inexact: user.username.to_lowercase() != query_lower,
        display_name_inexact: user.display_name.to_lowercase() != query_lower,
        username_len: user.username.chars().count(),
        display_name_len: user.display_name.chars().count(),
        username: &user.username,
    }
}

/// Total order over two matching users for an already lowercased query.
pub fn compare_matches(query_lower: &str, a: &UserPublic, b: &UserPublic) -> Ordering {
    let tier_a = classify(query_lower, a).unwrap_or(MatchTier::Substring);
    let tier_b = classify(query_lower, b).unwrap_or(MatchTier::Substring);
    rank_key(query_lower, tier_a, a).cmp(&rank_key(query_lower, tier_b, b))
}

/// Drop non-matches, order the rest and keep the best `limit`.
pub fn rank(query: &str, candidates: Vec<UserPublic>, limit: usize) -> Vec<UserPublic> {
    let query_lower = query.to_lowercase();

    let mut matches: Vec<(MatchTier, UserPublic)> = candidates
        .into_iter()
        .filter_map(|user| classify(&query_lower, &user).map(|tier| (tier, user)))
        .collect();
    matches.sort_by(|(tier_a, a), (tier_b, b)| {
        rank_key(&query_lower, *tier_a, a).cmp(&rank_key(&query_lower, *tier_b, b))
    });

    matches.into_iter().take(limit).map(|(_, user)| user).collect()
}

#[derive(Clone)]
pub struct SearchRanker {
    store: DynStore,
}

impl SearchRanker {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Public projections of the best matches. `limit` is clamped into 1..=100.
    pub async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<UserPublic>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation(
                codes::INVALID_REQUEST,
                "Search query parameter 'q' is required",
            ));
        }
        let limit = limit.clamp(SEARCH_MIN_LIMIT, SEARCH_MAX_LIMIT);

        let candidates = self.store.search_users(query, limit).await?;
        let results = rank(query, candidates, limit);

        tracing::debug!("Search for {:?} returned {} users", query, results.len());
        Ok(results)
    }
}
