//! Geospatial matching: candidate ranking and fallback routing.

pub mod actions;
pub mod fallback;
pub mod models;
pub mod utils;

pub use actions::{find_matches, MatchReport};
pub use fallback::{find_fallback_routes, FallbackRoutes};
pub use models::{Facility, FacilityKind, ReceiverCandidate, Role};
pub use utils::scoring::{score_candidates, ScoredCandidate};
