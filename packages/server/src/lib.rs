// FoodLoop - Listing Lifecycle & Geospatial Matching Engine
//
// Matches perishable-food donations to nearby receivers and, failing a
// timely claim, routes them to a fallback consumer before expiry. This
// crate owns the listing state machine, the claim queue, the matching and
// scoring algorithm, fallback routing, and the periodic expiry sweep.
// Transport, auth, and content generation live in collaborating services.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::Config;
