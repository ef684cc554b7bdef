//! Read-model directories the matching engine queries.
//!
//! Receivers live in the user service and facilities in an operations
//! registry; the core only ever asks geospatial questions of them. Both
//! traits are seams so hosts can wire real backends; the in-memory
//! implementations back the host binary and the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::common::{CoreError, GeoPoint, UserId};
use crate::domains::matching::models::{Facility, ReceiverCandidate};

use super::geo_index::GeoIndex;

/// Directory of users who can receive donations.
#[async_trait]
pub trait ReceiverDirectory: Send + Sync {
    /// Looks up a single receiver profile.
    async fn get(&self, id: UserId) -> Result<Option<ReceiverCandidate>, CoreError>;

    /// Eligible receivers (active and verified) within `max_distance_km`
    /// of `origin`, nearest first, at most `limit`.
    async fn nearest_eligible(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<(ReceiverCandidate, f64)>, CoreError>;
}

/// Directory of fallback facilities.
#[async_trait]
pub trait FacilityDirectory: Send + Sync {
    /// Active facilities within `max_distance_km` of `origin`, nearest
    /// first, at most `limit` — any kind; callers group by kind.
    async fn nearest_active(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<(Facility, f64)>, CoreError>;
}

/// In-memory receiver directory over a [`GeoIndex`].
#[derive(Default)]
pub struct InMemoryReceiverDirectory {
    by_id: RwLock<HashMap<UserId, ReceiverCandidate>>,
    index: GeoIndex<ReceiverCandidate>,
}

impl InMemoryReceiverDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, receiver: ReceiverCandidate) {
        let id = receiver.id;
        self.index.remove_where(|r| r.id == id).await;
        self.index.insert(receiver.clone()).await;
        self.by_id.write().await.insert(id, receiver);
    }

    /// Builds the spatial index; without this, queries use the bounded
    /// scan path.
    pub async fn build_index(&self) {
        self.index.rebuild().await;
    }
}

#[async_trait]
impl ReceiverDirectory for InMemoryReceiverDirectory {
    async fn get(&self, id: UserId) -> Result<Option<ReceiverCandidate>, CoreError> {
        Ok(self.by_id.read().await.get(&id).cloned())
    }

    async fn nearest_eligible(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<(ReceiverCandidate, f64)>, CoreError> {
        Ok(self
            .index
            .nearest(
                origin,
                max_distance_km,
                |r| r.is_active && r.is_verified,
                limit,
            )
            .await)
    }
}

/// In-memory facility directory over a [`GeoIndex`].
#[derive(Default)]
pub struct InMemoryFacilityDirectory {
    index: GeoIndex<Facility>,
}

impl InMemoryFacilityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, facility: Facility) {
        self.index.insert(facility).await;
    }

    pub async fn build_index(&self) {
        self.index.rebuild().await;
    }
}

#[async_trait]
impl FacilityDirectory for InMemoryFacilityDirectory {
    async fn nearest_active(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<(Facility, f64)>, CoreError> {
        Ok(self
            .index
            .nearest(origin, max_distance_km, |f| f.is_active, limit)
            .await)
    }
}
