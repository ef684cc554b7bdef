//! Typed ID definitions for all domain entities.
//!
//! One alias per entity; the compiler prevents mixing them up.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Listing entities (food donations).
pub struct Listing;

/// Marker type for users (donors, receivers, admins).
pub struct User;

/// Marker type for claim requests (owned by a Listing).
pub struct ClaimRequest;

/// Marker type for fallback facilities (farms, fridges, compost centers).
pub struct Facility;

/// Marker type for notifications.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Listing entities.
pub type ListingId = Id<Listing>;

/// Typed ID for users.
pub type UserId = Id<User>;

/// Typed ID for claim requests.
pub type RequestId = Id<ClaimRequest>;

/// Typed ID for fallback facilities.
pub type FacilityId = Id<Facility>;

/// Typed ID for notifications.
pub type NotificationId = Id<Notification>;
