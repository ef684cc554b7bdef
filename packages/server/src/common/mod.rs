// Common types and utilities shared across the application

pub mod actor;
pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod types;
pub mod utils;

pub use actor::Actor;
pub use entity_ids::{FacilityId, ListingId, NotificationId, RequestId, UserId};
pub use errors::CoreError;
pub use id::Id;
pub use types::{GeoPoint, Location};
