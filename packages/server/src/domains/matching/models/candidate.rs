use serde::{Deserialize, Serialize};

use crate::common::{GeoPoint, UserId};
use crate::kernel::geo_index::GeoEntry;

/// Role a receiver acts under; weighs into match scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Organization,
    Volunteer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Organization => write!(f, "organization"),
            Role::Volunteer => write!(f, "volunteer"),
        }
    }
}

/// Read model of a user who can receive donations.
///
/// Owned by the user directory collaborator; the matching engine only
/// reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverCandidate {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_active: bool,
    pub location: GeoPoint,
    pub disaster_mode_enabled: bool,
}

impl GeoEntry for ReceiverCandidate {
    fn point(&self) -> GeoPoint {
        self.location
    }
}
