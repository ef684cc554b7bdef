//! Point, level, and badge bookkeeping.
//!
//! The ledger observes lifecycle transitions (donation created, collection
//! confirmed) and keeps per-user impact profiles plus a global map from
//! food category to accumulated donated quantity. Every update is a single
//! read-modify-write under one write lock — totals never go through
//! lost-update races.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::UserId;
use crate::domains::gamification::utils::points::{
    self, Badge, BadgeInputs,
};

/// A user's accumulated standing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactProfile {
    pub points: i64,
    pub level: u32,
    pub badges: Vec<Badge>,
    pub total_food_donated_kg: f64,
    pub total_co2_reduced_kg: f64,
    pub disaster_donations: u64,
}

/// What one recorded event earned.
#[derive(Debug, Clone)]
pub struct Award {
    pub points_earned: i64,
    pub level: u32,
    pub new_badges: Vec<Badge>,
}

#[derive(Default)]
struct LedgerState {
    profiles: HashMap<UserId, ImpactProfile>,
    /// food category label → accumulated donated kg
    category_totals: HashMap<String, f64>,
}

/// In-process gamification ledger.
#[derive(Default)]
pub struct GamificationLedger {
    state: RwLock<LedgerState>,
}

impl GamificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a donation: donor points (+ first/disaster bonuses), donor
    /// totals, badge checks, and the category total.
    pub async fn record_donation(
        &self,
        donor_id: UserId,
        category: &str,
        quantity_kg: f64,
        co2_reduction_kg: f64,
        is_disaster_relief: bool,
    ) -> Award {
        let mut state = self.state.write().await;

        *state.category_totals.entry(category.to_string()).or_insert(0.0) += quantity_kg;

        let profile = state.profiles.entry(donor_id).or_default();
        let is_first_donation = profile.total_food_donated_kg == 0.0;

        let earned = points::donation_points(quantity_kg, is_first_donation, is_disaster_relief);
        profile.points += earned;
        profile.total_food_donated_kg += quantity_kg;
        profile.total_co2_reduced_kg += co2_reduction_kg;
        if is_disaster_relief {
            profile.disaster_donations += 1;
        }

        let award = settle(profile, earned);
        debug!(donor_id = %donor_id, points = earned, "donation recorded");
        award
    }

    /// Records a confirmed collection: receiver points and badge checks.
    pub async fn record_collection(&self, receiver_id: UserId, quantity_kg: f64) -> Award {
        let mut state = self.state.write().await;
        let profile = state.profiles.entry(receiver_id).or_default();

        let earned = points::collection_points(quantity_kg);
        profile.points += earned;

        let award = settle(profile, earned);
        debug!(receiver_id = %receiver_id, points = earned, "collection recorded");
        award
    }

    /// A user's current profile, if any activity has been recorded.
    pub async fn profile(&self, user_id: UserId) -> Option<ImpactProfile> {
        self.state.read().await.profiles.get(&user_id).cloned()
    }

    /// Snapshot of accumulated donated quantity per food category.
    pub async fn category_totals(&self) -> HashMap<String, f64> {
        self.state.read().await.category_totals.clone()
    }
}

/// Recomputes level and badges after a points change; must run while the
/// write lock is held.
fn settle(profile: &mut ImpactProfile, earned: i64) -> Award {
    profile.level = points::level_for(profile.points);

    let fresh = points::new_badges(
        BadgeInputs {
            total_food_donated_kg: profile.total_food_donated_kg,
            total_co2_reduced_kg: profile.total_co2_reduced_kg,
            disaster_donations: profile.disaster_donations,
            level: profile.level,
        },
        &profile.badges,
    );
    profile.badges.extend(fresh.iter().copied());

    Award {
        points_earned: earned,
        level: profile.level,
        new_badges: fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_donation_earns_the_bonus_and_badge() {
        let ledger = GamificationLedger::new();
        let donor = UserId::new();

        let award = ledger
            .record_donation(donor, "cooked", 5.0, 12.5, false)
            .await;
        assert_eq!(award.points_earned, 100); // 50 + first-donation 50
        assert!(award.new_badges.contains(&Badge::FirstDonation));

        let again = ledger
            .record_donation(donor, "cooked", 5.0, 12.5, false)
            .await;
        assert_eq!(again.points_earned, 50);
        assert!(again.new_badges.is_empty());
    }

    #[tokio::test]
    async fn category_totals_accumulate_across_donors() {
        let ledger = GamificationLedger::new();
        ledger
            .record_donation(UserId::new(), "cooked", 5.0, 12.5, false)
            .await;
        ledger
            .record_donation(UserId::new(), "cooked", 3.0, 7.5, false)
            .await;
        ledger
            .record_donation(UserId::new(), "packaged", 2.0, 5.0, false)
            .await;

        let totals = ledger.category_totals().await;
        assert_eq!(totals["cooked"], 8.0);
        assert_eq!(totals["packaged"], 2.0);
    }

    #[tokio::test]
    async fn concurrent_donations_do_not_lose_updates() {
        let ledger = std::sync::Arc::new(GamificationLedger::new());
        let donor = UserId::new();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.record_donation(donor, "raw", 1.0, 2.5, false).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let profile = ledger.profile(donor).await.unwrap();
        assert_eq!(profile.total_food_donated_kg, 20.0);
        assert_eq!(ledger.category_totals().await["raw"], 20.0);
        // 20 × 10 + one first-donation bonus
        assert_eq!(profile.points, 250);
    }

    #[tokio::test]
    async fn disaster_relief_awards_hero_badge() {
        let ledger = GamificationLedger::new();
        let donor = UserId::new();
        let award = ledger
            .record_donation(donor, "cooked", 4.0, 10.0, true)
            .await;
        assert_eq!(award.points_earned, 40 + 50 + 25);
        assert!(award.new_badges.contains(&Badge::DisasterHero));
    }

    #[tokio::test]
    async fn collections_award_receiver_points() {
        let ledger = GamificationLedger::new();
        let receiver = UserId::new();
        let award = ledger.record_collection(receiver, 10.0).await;
        assert_eq!(award.points_earned, 50);
        assert_eq!(ledger.profile(receiver).await.unwrap().points, 50);
    }
}
