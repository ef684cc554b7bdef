//! Time-based transitions: the expiry sweep.

pub mod sweeper;

pub use sweeper::{ExpirySweeper, SweepReport};
