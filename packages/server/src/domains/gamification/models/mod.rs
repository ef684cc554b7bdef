pub mod ledger;

pub use ledger::{Award, GamificationLedger, ImpactProfile};
