//! Gamification: points, levels, and badges earned from lifecycle
//! transitions. Lightweight by design — the ledger observes transitions,
//! it never drives them.

pub mod models;
pub mod utils;

pub use models::{Award, GamificationLedger, ImpactProfile};
pub use utils::points::Badge;
