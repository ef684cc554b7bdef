//! Listing lifecycle: the state machine from creation to terminal
//! disposition, and its first-come claim queue.

pub mod actions;
pub mod events;
pub mod models;

pub use actions::{
    approve_claim, confirm_collection, create_listing, delete_listing, mark_distributed,
    nearby_listings, submit_claim, CreateListingOutcome,
};
pub use events::ListingEvent;
pub use models::{
    ClaimRequest, ClaimRequestStatus, CreateListingInput, FallbackRoute, FoodCategory, Listing,
    ListingStatus, Unit,
};
