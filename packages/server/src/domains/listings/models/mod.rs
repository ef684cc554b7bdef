pub mod listing;

pub use listing::{
    ApprovalOutcome, ClaimRequest, ClaimRequestStatus, CreateListingInput, FallbackRoute,
    FoodCategory, Listing, ListingPin, ListingStatus, Unit,
};
