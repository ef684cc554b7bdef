//! Listing document store.
//!
//! The persistence engine itself is out of scope; the core talks to this
//! trait. Writes are compare-and-swap on a per-document version, which is
//! the concurrency discipline the lifecycle relies on: two racing
//! approvals (or an approval racing the expiry sweeper) can both read the
//! same version, but only one update lands — the loser re-reads and
//! re-validates against the new status.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::common::{CoreError, ListingId};
use crate::domains::listings::models::{Listing, ListingStatus};

/// A document plus the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,

    /// The expected version no longer matches; someone else wrote first.
    #[error("version conflict")]
    VersionConflict,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CoreError::NotFound("listing"),
            StoreError::VersionConflict => {
                CoreError::InvalidState("listing was modified concurrently".to_string())
            }
            StoreError::Unavailable(reason) => CoreError::DependencyUnavailable(reason),
        }
    }
}

/// Document store for listings.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Inserts a new listing at version 1.
    async fn insert(&self, listing: Listing) -> Result<Versioned<Listing>, StoreError>;

    /// Fetches a listing with its current version.
    async fn get(&self, id: ListingId) -> Result<Versioned<Listing>, StoreError>;

    /// Conditional write: succeeds only if the stored version still equals
    /// `expected_version`; the whole document is replaced atomically.
    async fn update(
        &self,
        listing: Listing,
        expected_version: u64,
    ) -> Result<Versioned<Listing>, StoreError>;

    /// Removes a listing (administrative delete, not a lifecycle step).
    async fn remove(&self, id: ListingId) -> Result<(), StoreError>;

    /// Listings past their expiry time that are still claimable
    /// (`Active` or `PendingApproval`) — the sweep selection predicate.
    async fn find_expired(&self, now: DateTime<Utc>)
        -> Result<Vec<Versioned<Listing>>, StoreError>;
}

/// In-memory store used by the host binary and the test suites.
#[derive(Default)]
pub struct InMemoryListingStore {
    documents: RwLock<HashMap<ListingId, Versioned<Listing>>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn insert(&self, listing: Listing) -> Result<Versioned<Listing>, StoreError> {
        let mut documents = self.documents.write().await;
        let versioned = Versioned {
            record: listing,
            version: 1,
        };
        documents.insert(versioned.record.id, versioned.clone());
        Ok(versioned)
    }

    async fn get(&self, id: ListingId) -> Result<Versioned<Listing>, StoreError> {
        self.documents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(
        &self,
        listing: Listing,
        expected_version: u64,
    ) -> Result<Versioned<Listing>, StoreError> {
        let mut documents = self.documents.write().await;
        let slot = documents.get_mut(&listing.id).ok_or(StoreError::NotFound)?;
        if slot.version != expected_version {
            return Err(StoreError::VersionConflict);
        }
        slot.record = listing;
        slot.version += 1;
        Ok(slot.clone())
    }

    async fn remove(&self, id: ListingId) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn find_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Versioned<Listing>>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .filter(|v| {
                v.record.expiry_time < now
                    && matches!(
                        v.record.status,
                        ListingStatus::Active | ListingStatus::PendingApproval
                    )
            })
            .cloned()
            .collect())
    }
}
