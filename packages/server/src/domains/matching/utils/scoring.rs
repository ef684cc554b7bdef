//! Deterministic match scoring.
//!
//! Takes a distance-ranked candidate list and produces an explainable
//! weighted ranking. No model inference — every score can be read off the
//! weights below.

use serde::Serialize;

use crate::domains::matching::models::{ReceiverCandidate, Role};

/// Score lost per position in the distance ranking.
const RANK_PENALTY: i64 = 5;
const BASE_SCORE: i64 = 100;
const ORGANIZATION_BONUS: i64 = 15;
const VOLUNTEER_BONUS: i64 = 10;
const DISASTER_MODE_BONUS: i64 = 20;

/// A candidate with its computed match score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub candidate: ReceiverCandidate,
    pub distance_km: f64,
    pub score: i64,
}

/// Scores and re-ranks candidates.
///
/// `ranked` must be sorted by distance ascending (the geo query's output
/// order); the 0-based position there is the rank index. The result is
/// sorted by score descending, ties broken by distance ascending. Scores
/// can go negative for long candidate lists — ordering is what matters.
pub fn score_candidates(
    is_disaster_relief: bool,
    ranked: Vec<(ReceiverCandidate, f64)>,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (candidate, distance_km))| {
            let mut score = BASE_SCORE - RANK_PENALTY * rank as i64;
            match candidate.role {
                Role::Organization => score += ORGANIZATION_BONUS,
                Role::Volunteer => score += VOLUNTEER_BONUS,
                Role::User => {}
            }
            if is_disaster_relief && candidate.disaster_mode_enabled {
                score += DISASTER_MODE_BONUS;
            }
            ScoredCandidate {
                candidate,
                distance_km,
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score.cmp(&a.score).then_with(|| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    scored
}
