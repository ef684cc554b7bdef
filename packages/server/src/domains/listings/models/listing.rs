use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::utils::impact;
use crate::common::{Actor, CoreError, GeoPoint, ListingId, Location, RequestId, UserId};
use crate::kernel::geo_index::GeoEntry;

/// Listing - a donor's offer of surplus food
///
/// All lifecycle transitions live here as pure methods; actions wrap them
/// with store I/O. Methods that reject (`Unauthorized`, `InvalidState`,
/// `DuplicatePending`) leave the listing untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub donor_id: UserId,

    // Content
    pub title: String,
    pub description: String,
    pub food_category: FoodCategory,
    pub quantity: f64,
    pub unit: Unit,
    pub expiry_time: DateTime<Utc>,

    // Location
    pub location: Location,

    pub status: ListingStatus,

    /// Arrival order is the queue order; the sole "first come" tie-break.
    pub claim_requests: Vec<ClaimRequest>,

    /// Set exactly once, when a claim request is approved.
    pub claimed_by: Option<UserId>,

    // Write-once transition timestamps
    pub claimed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub collected_at: Option<DateTime<Utc>>,
    pub distributed_at: Option<DateTime<Utc>>,

    /// Set only when status becomes `Fallback`.
    pub fallback_route: FallbackRoute,

    pub is_disaster_relief: bool,
    pub disaster_zone: Option<String>,

    /// Cached at creation from quantity; immutable afterward.
    pub estimated_co2_reduction_kg: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A receiver's request to take a listing. Owned by the listing; never
/// exists independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub id: RequestId,
    pub receiver_id: UserId,
    pub requested_at: DateTime<Utc>,
    pub status: ClaimRequestStatus,
    pub message: Option<String>,
}

/// What an approval did, for notification fan-out.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub approved_receiver: UserId,
    /// Receivers whose pending requests were rejected in the same
    /// operation.
    pub rejected_receivers: Vec<UserId>,
}

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Cooked,
    Raw,
    Packaged,
    Beverages,
    Other,
}

impl std::fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoodCategory::Cooked => write!(f, "cooked"),
            FoodCategory::Raw => write!(f, "raw"),
            FoodCategory::Packaged => write!(f, "packaged"),
            FoodCategory::Beverages => write!(f, "beverages"),
            FoodCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for FoodCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "cooked" => Ok(FoodCategory::Cooked),
            "raw" => Ok(FoodCategory::Raw),
            "packaged" => Ok(FoodCategory::Packaged),
            "beverages" => Ok(FoodCategory::Beverages),
            "other" => Ok(FoodCategory::Other),
            _ => Err(anyhow::anyhow!("Invalid food category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kg,
    Plates,
    Packets,
    Liters,
    Units,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Kg => write!(f, "kg"),
            Unit::Plates => write!(f, "plates"),
            Unit::Packets => write!(f, "packets"),
            Unit::Liters => write!(f, "liters"),
            Unit::Units => write!(f, "units"),
        }
    }
}

/// Listing lifecycle status. `Distributed` and `Fallback` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    PendingApproval,
    Approved,
    Collected,
    Distributed,
    Fallback,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::PendingApproval => write!(f, "pending_approval"),
            ListingStatus::Approved => write!(f, "approved"),
            ListingStatus::Collected => write!(f, "collected"),
            ListingStatus::Distributed => write!(f, "distributed"),
            ListingStatus::Fallback => write!(f, "fallback"),
        }
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "pending_approval" => Ok(ListingStatus::PendingApproval),
            "approved" => Ok(ListingStatus::Approved),
            "collected" => Ok(ListingStatus::Collected),
            "distributed" => Ok(ListingStatus::Distributed),
            "fallback" => Ok(ListingStatus::Fallback),
            _ => Err(anyhow::anyhow!("Invalid listing status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Where unclaimed food was routed at expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackRoute {
    AnimalFarm,
    CommunityFridge,
    CompostCenter,
    None,
}

impl std::fmt::Display for FallbackRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackRoute::AnimalFarm => write!(f, "animal farm"),
            FallbackRoute::CommunityFridge => write!(f, "community fridge"),
            FallbackRoute::CompostCenter => write!(f, "compost center"),
            FallbackRoute::None => write!(f, "none"),
        }
    }
}

// =============================================================================
// Creation
// =============================================================================

/// Attributes for a new listing.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CreateListingInput {
    pub title: String,
    pub description: String,
    pub food_category: FoodCategory,
    pub quantity: f64,
    #[builder(default = Unit::Kg)]
    pub unit: Unit,
    pub expiry_time: DateTime<Utc>,
    pub location: Location,
    #[builder(default)]
    pub is_disaster_relief: bool,
    #[builder(default)]
    pub disaster_zone: Option<String>,
}

impl Listing {
    /// Validates the input and builds a fresh `Active` listing.
    ///
    /// The impact estimate is computed here, once; it never changes even
    /// if clients later reinterpret the quantity.
    pub fn create(
        donor_id: UserId,
        input: CreateListingInput,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if input.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        if !input.quantity.is_finite() || input.quantity <= 0.0 {
            return Err(CoreError::Validation(format!(
                "quantity must be a positive number, got {}",
                input.quantity
            )));
        }
        if input.expiry_time <= now {
            return Err(CoreError::Validation(
                "expiry time must be in the future".into(),
            ));
        }
        if !input.location.point.is_valid() {
            return Err(CoreError::Validation(format!(
                "location coordinates out of range: ({}, {})",
                input.location.point.longitude, input.location.point.latitude
            )));
        }

        Ok(Self {
            id: ListingId::new(),
            donor_id,
            title: input.title,
            description: input.description,
            food_category: input.food_category,
            quantity: input.quantity,
            unit: input.unit,
            expiry_time: input.expiry_time,
            location: input.location,
            status: ListingStatus::Active,
            claim_requests: Vec::new(),
            claimed_by: None,
            claimed_at: None,
            approved_at: None,
            collected_at: None,
            distributed_at: None,
            fallback_route: FallbackRoute::None,
            is_disaster_relief: input.is_disaster_relief,
            disaster_zone: input.disaster_zone,
            estimated_co2_reduction_kg: impact::co2_reduction_kg(input.quantity),
            created_at: now,
            updated_at: now,
        })
    }

    // =========================================================================
    // Lifecycle transitions
    // =========================================================================

    /// Appends a claim request to the queue.
    ///
    /// The first request ever recorded flips `Active` into
    /// `PendingApproval`. A receiver may hold at most one pending request
    /// per listing.
    pub fn submit_claim(
        &mut self,
        receiver_id: UserId,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<RequestId, CoreError> {
        if !self.can_receive_claims() {
            return Err(CoreError::InvalidState(format!(
                "listing is not available for claiming (status: {})",
                self.status
            )));
        }
        let has_pending = self
            .claim_requests
            .iter()
            .any(|r| r.receiver_id == receiver_id && r.status == ClaimRequestStatus::Pending);
        if has_pending {
            return Err(CoreError::DuplicatePending);
        }

        let request = ClaimRequest {
            id: RequestId::new(),
            receiver_id,
            requested_at: now,
            status: ClaimRequestStatus::Pending,
            message,
        };
        let request_id = request.id;
        self.claim_requests.push(request);

        if self.claim_requests.len() == 1 {
            self.status = ListingStatus::PendingApproval;
        }
        self.updated_at = now;
        Ok(request_id)
    }

    /// Donor approves one pending request; every other pending request is
    /// rejected in the same operation, and `claimed_by`/`claimed_at`/
    /// `approved_at` are set together.
    ///
    /// Arrival order is advisory: the donor may approve any pending
    /// request, not necessarily the earliest.
    pub fn approve_claim(
        &mut self,
        request_id: RequestId,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, CoreError> {
        actor.require_user(self.donor_id, "only the donor can approve claims")?;

        if !matches!(
            self.status,
            ListingStatus::Active | ListingStatus::PendingApproval
        ) {
            return Err(CoreError::InvalidState(format!(
                "cannot approve a claim while the listing is {}",
                self.status
            )));
        }

        let target = self
            .claim_requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or(CoreError::NotFound("claim request"))?;
        if target.status != ClaimRequestStatus::Pending {
            return Err(CoreError::InvalidState(
                "claim request is no longer pending".into(),
            ));
        }
        let approved_receiver = target.receiver_id;

        let mut rejected_receivers = Vec::new();
        for request in &mut self.claim_requests {
            if request.id == request_id {
                request.status = ClaimRequestStatus::Approved;
            } else if request.status == ClaimRequestStatus::Pending {
                request.status = ClaimRequestStatus::Rejected;
                rejected_receivers.push(request.receiver_id);
            }
        }

        self.status = ListingStatus::Approved;
        self.claimed_by = Some(approved_receiver);
        self.claimed_at = Some(now);
        self.approved_at = Some(now);
        self.updated_at = now;

        Ok(ApprovalOutcome {
            approved_receiver,
            rejected_receivers,
        })
    }

    /// The approved receiver confirms pickup.
    pub fn confirm_collection(&mut self, actor: Actor, now: DateTime<Utc>) -> Result<(), CoreError> {
        let claimant = self
            .claimed_by
            .ok_or_else(|| CoreError::InvalidState("listing has no approved claim".into()))?;
        actor.require_user(claimant, "only the approved receiver can confirm collection")?;

        if self.status != ListingStatus::Approved {
            return Err(CoreError::InvalidState(format!(
                "listing must be approved before collection (status: {})",
                self.status
            )));
        }

        self.status = ListingStatus::Collected;
        self.collected_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Donor closes out the listing. Valid from `Collected` or directly
    /// from `Approved` (donors may skip the explicit pickup confirmation).
    /// Terminal.
    pub fn mark_distributed(&mut self, actor: Actor, now: DateTime<Utc>) -> Result<(), CoreError> {
        actor.require_user(self.donor_id, "only the donor can mark the listing done")?;

        if !matches!(
            self.status,
            ListingStatus::Collected | ListingStatus::Approved
        ) {
            return Err(CoreError::InvalidState(format!(
                "listing must be collected or approved before marking done (status: {})",
                self.status
            )));
        }

        self.status = ListingStatus::Distributed;
        self.distributed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Sweeper transition: expire into fallback, rejecting every
    /// still-pending request. Returns the receivers whose requests were
    /// just rejected. Terminal.
    pub fn route_to_fallback(
        &mut self,
        route: FallbackRoute,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>, CoreError> {
        if !matches!(
            self.status,
            ListingStatus::Active | ListingStatus::PendingApproval
        ) {
            return Err(CoreError::InvalidState(format!(
                "only claimable listings can be routed to fallback (status: {})",
                self.status
            )));
        }

        let mut rejected = Vec::new();
        for request in &mut self.claim_requests {
            if request.status == ClaimRequestStatus::Pending {
                request.status = ClaimRequestStatus::Rejected;
                rejected.push(request.receiver_id);
            }
        }

        self.status = ListingStatus::Fallback;
        self.fallback_route = route;
        self.updated_at = now;
        Ok(rejected)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether new claim requests are accepted.
    pub fn can_receive_claims(&self) -> bool {
        matches!(
            self.status,
            ListingStatus::Active | ListingStatus::PendingApproval
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ListingStatus::Distributed | ListingStatus::Fallback
        )
    }

    /// The request a receiver currently has pending, if any.
    pub fn pending_request_of(&self, receiver_id: UserId) -> Option<&ClaimRequest> {
        self.claim_requests
            .iter()
            .find(|r| r.receiver_id == receiver_id && r.status == ClaimRequestStatus::Pending)
    }

    /// Projection registered in the geo index at creation.
    pub fn pin(&self) -> ListingPin {
        ListingPin {
            id: self.id,
            point: self.location.point,
        }
    }
}

/// Minimal geo-index projection of a listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingPin {
    pub id: ListingId,
    pub point: GeoPoint,
}

impl GeoEntry for ListingPin {
    fn point(&self) -> GeoPoint {
        self.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn mumbai() -> Location {
        Location::new(GeoPoint::new(72.8777, 19.0760), "Mumbai", "Maharashtra")
    }

    fn listing_at(now: DateTime<Utc>) -> Listing {
        let input = CreateListingInput::builder()
            .title("Wedding buffet surplus".to_string())
            .description("30 plates of veg biryani".to_string())
            .food_category(FoodCategory::Cooked)
            .quantity(12.0)
            .unit(Unit::Kg)
            .expiry_time(now + Duration::hours(4))
            .location(mumbai())
            .build();
        Listing::create(UserId::new(), input, now).unwrap()
    }

    fn donor(listing: &Listing) -> Actor {
        Actor::user(listing.donor_id)
    }

    // -------------------------------------------------------------------------
    // Creation and validation
    // -------------------------------------------------------------------------

    #[test]
    fn creation_caches_the_impact_estimate() {
        let now = Utc::now();
        let listing = listing_at(now);
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.estimated_co2_reduction_kg, 30.0);
        assert_eq!(listing.fallback_route, FallbackRoute::None);
        assert!(listing.claim_requests.is_empty());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let now = Utc::now();
        let input = CreateListingInput::builder()
            .title("Bad".to_string())
            .description("".to_string())
            .food_category(FoodCategory::Other)
            .quantity(0.0)
            .expiry_time(now + Duration::hours(1))
            .location(mumbai())
            .build();
        assert!(matches!(
            Listing::create(UserId::new(), input, now),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn expiry_must_be_strictly_in_the_future() {
        let now = Utc::now();
        let input = CreateListingInput::builder()
            .title("Stale".to_string())
            .description("".to_string())
            .food_category(FoodCategory::Raw)
            .quantity(1.0)
            .expiry_time(now)
            .location(mumbai())
            .build();
        assert!(matches!(
            Listing::create(UserId::new(), input, now),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let now = Utc::now();
        let input = CreateListingInput::builder()
            .title("Nowhere".to_string())
            .description("".to_string())
            .food_category(FoodCategory::Raw)
            .quantity(1.0)
            .expiry_time(now + Duration::hours(1))
            .location(Location::new(GeoPoint::new(372.0, 19.0), "X", "Y"))
            .build();
        assert!(matches!(
            Listing::create(UserId::new(), input, now),
            Err(CoreError::Validation(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Claim queue
    // -------------------------------------------------------------------------

    #[test]
    fn first_claim_flips_active_to_pending_approval() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let r1 = UserId::new();

        listing.submit_claim(r1, None, now).unwrap();
        assert_eq!(listing.status, ListingStatus::PendingApproval);

        // A second receiver's claim appends without changing status
        listing.submit_claim(UserId::new(), None, now).unwrap();
        assert_eq!(listing.status, ListingStatus::PendingApproval);
        assert_eq!(listing.claim_requests.len(), 2);
    }

    #[test]
    fn duplicate_pending_claim_is_rejected() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let receiver = UserId::new();

        listing.submit_claim(receiver, None, now).unwrap();
        let second = listing.submit_claim(receiver, Some("please".into()), now);
        assert!(matches!(second, Err(CoreError::DuplicatePending)));
        assert_eq!(listing.claim_requests.len(), 1);
    }

    #[test]
    fn receiver_may_claim_again_after_rejection() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let loser = UserId::new();
        let winner = UserId::new();

        listing.submit_claim(loser, None, now).unwrap();
        let winning_request = listing.submit_claim(winner, None, now).unwrap();
        listing
            .approve_claim(winning_request, donor(&listing), now)
            .unwrap();

        // The listing is approved now, so the rejected receiver still
        // cannot claim — but the duplicate-pending rule no longer fires.
        let err = listing.submit_claim(loser, None, now).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn queue_preserves_arrival_order() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let receivers: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
        for (i, r) in receivers.iter().enumerate() {
            listing
                .submit_claim(*r, None, now + Duration::seconds(i as i64))
                .unwrap();
        }
        let queued: Vec<UserId> = listing.claim_requests.iter().map(|r| r.receiver_id).collect();
        assert_eq!(queued, receivers);
    }

    // -------------------------------------------------------------------------
    // Approval
    // -------------------------------------------------------------------------

    #[test]
    fn approval_is_exclusive_and_sets_fields_together() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let r1 = UserId::new();
        let r2 = UserId::new();

        listing.submit_claim(r1, None, now).unwrap();
        let second = listing.submit_claim(r2, None, now).unwrap();

        // Donor picks the later request — arrival order is advisory
        let outcome = listing.approve_claim(second, donor(&listing), now).unwrap();

        assert_eq!(listing.status, ListingStatus::Approved);
        assert_eq!(listing.claimed_by, Some(r2));
        assert_eq!(listing.claimed_at, Some(now));
        assert_eq!(listing.approved_at, Some(now));
        assert_eq!(outcome.approved_receiver, r2);
        assert_eq!(outcome.rejected_receivers, vec![r1]);

        let approved: Vec<_> = listing
            .claim_requests
            .iter()
            .filter(|r| r.status == ClaimRequestStatus::Approved)
            .collect();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].receiver_id, r2);
        assert!(listing
            .claim_requests
            .iter()
            .filter(|r| r.receiver_id != r2)
            .all(|r| r.status == ClaimRequestStatus::Rejected));
    }

    #[test]
    fn only_the_donor_may_approve() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let receiver = UserId::new();
        let request = listing.submit_claim(receiver, None, now).unwrap();

        let err = listing
            .approve_claim(request, Actor::user(receiver), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
        assert_eq!(listing.status, ListingStatus::PendingApproval);
        assert!(listing.claimed_by.is_none());
    }

    #[test]
    fn approving_an_unknown_request_is_not_found() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        listing.submit_claim(UserId::new(), None, now).unwrap();

        let err = listing
            .approve_claim(RequestId::new(), donor(&listing), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound("claim request")));
    }

    #[test]
    fn approving_on_a_terminal_listing_changes_nothing() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let receiver = UserId::new();
        let request = listing.submit_claim(receiver, None, now).unwrap();
        listing.approve_claim(request, donor(&listing), now).unwrap();
        listing.mark_distributed(donor(&listing), now).unwrap();

        let before = listing.clone();
        let err = listing
            .approve_claim(request, donor(&listing), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        // no fields changed
        assert_eq!(listing.status, before.status);
        assert_eq!(listing.claimed_by, before.claimed_by);
        assert_eq!(listing.updated_at, before.updated_at);
    }

    #[test]
    fn second_approval_on_the_same_listing_is_invalid() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let loser_request = listing.submit_claim(UserId::new(), None, now).unwrap();
        let winner_request = listing.submit_claim(UserId::new(), None, now).unwrap();
        listing
            .approve_claim(winner_request, donor(&listing), now)
            .unwrap();

        let err = listing
            .approve_claim(loser_request, donor(&listing), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        // the first approval's fields are untouched
        assert_eq!(listing.status, ListingStatus::Approved);
        let approved_count = listing
            .claim_requests
            .iter()
            .filter(|r| r.status == ClaimRequestStatus::Approved)
            .count();
        assert_eq!(approved_count, 1);
    }

    #[test]
    fn no_new_claims_after_approval() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let request = listing.submit_claim(UserId::new(), None, now).unwrap();
        listing.approve_claim(request, donor(&listing), now).unwrap();

        let err = listing.submit_claim(UserId::new(), None, now).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    // -------------------------------------------------------------------------
    // Collection and completion
    // -------------------------------------------------------------------------

    #[test]
    fn only_the_approved_receiver_confirms_collection() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let receiver = UserId::new();
        let request = listing.submit_claim(receiver, None, now).unwrap();
        listing.approve_claim(request, donor(&listing), now).unwrap();

        let err = listing
            .confirm_collection(Actor::user(UserId::new()), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));

        listing
            .confirm_collection(Actor::user(receiver), now)
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Collected);
        assert_eq!(listing.collected_at, Some(now));
    }

    #[test]
    fn collection_requires_approved_status() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let err = listing
            .confirm_collection(Actor::user(UserId::new()), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn donor_may_skip_collection_and_mark_done_from_approved() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let request = listing.submit_claim(UserId::new(), None, now).unwrap();
        listing.approve_claim(request, donor(&listing), now).unwrap();

        listing.mark_distributed(donor(&listing), now).unwrap();
        assert_eq!(listing.status, ListingStatus::Distributed);
        assert_eq!(listing.distributed_at, Some(now));
        assert!(listing.is_terminal());
        // collection was skipped, its timestamp stays unset
        assert!(listing.collected_at.is_none());
    }

    #[test]
    fn mark_done_is_invalid_from_claimable_states() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let err = listing.mark_distributed(donor(&listing), now).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn only_the_donor_marks_done() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let receiver = UserId::new();
        let request = listing.submit_claim(receiver, None, now).unwrap();
        listing.approve_claim(request, donor(&listing), now).unwrap();

        let err = listing
            .mark_distributed(Actor::user(receiver), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    // -------------------------------------------------------------------------
    // Fallback
    // -------------------------------------------------------------------------

    #[test]
    fn fallback_rejects_all_pending_requests() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let r1 = UserId::new();
        let r2 = UserId::new();
        listing.submit_claim(r1, None, now).unwrap();
        listing.submit_claim(r2, None, now).unwrap();

        let rejected = listing
            .route_to_fallback(FallbackRoute::CommunityFridge, now)
            .unwrap();
        assert_eq!(rejected, vec![r1, r2]);
        assert_eq!(listing.status, ListingStatus::Fallback);
        assert_eq!(listing.fallback_route, FallbackRoute::CommunityFridge);
        assert!(listing
            .claim_requests
            .iter()
            .all(|r| r.status == ClaimRequestStatus::Rejected));
    }

    #[test]
    fn fallback_with_no_facility_still_transitions() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        listing.route_to_fallback(FallbackRoute::None, now).unwrap();
        assert_eq!(listing.status, ListingStatus::Fallback);
        assert_eq!(listing.fallback_route, FallbackRoute::None);
    }

    #[test]
    fn approved_listings_cannot_be_routed_to_fallback() {
        let now = Utc::now();
        let mut listing = listing_at(now);
        let request = listing.submit_claim(UserId::new(), None, now).unwrap();
        listing.approve_claim(request, donor(&listing), now).unwrap();

        let err = listing
            .route_to_fallback(FallbackRoute::AnimalFarm, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        assert_eq!(listing.status, ListingStatus::Approved);
    }
}
