//! Notification production.
//!
//! The core produces one notification per affected user per transition;
//! delivery (push, email, in-app inbox) belongs to an external
//! collaborator behind [`NotificationSink`].

pub mod models;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub use models::{Notification, NotificationKind, Priority};

/// Outbound delivery seam.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Logs deliveries; the default sink for hosts without a delivery backend.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()> {
        info!(
            user_id = %notification.user_id,
            kind = ?notification.kind,
            priority = ?notification.priority,
            "notification: {}",
            notification.title
        );
        debug!(
            payload = %serde_json::to_string(&notification).unwrap_or_default(),
            "notification payload"
        );
        Ok(())
    }
}

/// Captures deliveries in memory; used by the test suites to assert on
/// the exact notifications a transition produced.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    /// Deliveries addressed to one user.
    pub async fn delivered_to(&self, user_id: crate::common::UserId) -> Vec<Notification> {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()> {
        self.delivered.lock().await.push(notification);
        Ok(())
    }
}
