use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Engine configuration loaded from environment variables.
///
/// Every knob has a default matching production behavior; the engine runs
/// with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Radius for receiver matching, km.
    pub match_radius_km: f64,
    /// Candidate cap for a match pass.
    pub match_candidate_limit: usize,
    /// How many top-ranked candidates get a "match found" notification.
    pub match_notify_limit: usize,
    /// Radius for fallback facility lookup, km.
    pub fallback_radius_km: f64,
    /// Facility cap for a fallback lookup.
    pub fallback_candidate_limit: usize,
    /// Interval between expiry sweeps.
    pub sweep_interval: Duration,
    /// Deadline for any single store or geo call.
    pub dependency_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_radius_km: 10.0,
            match_candidate_limit: 10,
            match_notify_limit: 5,
            fallback_radius_km: 15.0,
            fallback_candidate_limit: 5,
            sweep_interval: Duration::from_secs(5 * 60),
            dependency_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();
        Ok(Self {
            match_radius_km: parse_var("MATCH_RADIUS_KM", defaults.match_radius_km)?,
            match_candidate_limit: parse_var(
                "MATCH_CANDIDATE_LIMIT",
                defaults.match_candidate_limit,
            )?,
            match_notify_limit: parse_var("MATCH_NOTIFY_LIMIT", defaults.match_notify_limit)?,
            fallback_radius_km: parse_var("FALLBACK_RADIUS_KM", defaults.fallback_radius_km)?,
            fallback_candidate_limit: parse_var(
                "FALLBACK_CANDIDATE_LIMIT",
                defaults.fallback_candidate_limit,
            )?,
            sweep_interval: Duration::from_secs(parse_var(
                "SWEEP_INTERVAL_SECS",
                5 * 60,
            )?),
            dependency_timeout: Duration::from_secs(parse_var("DEPENDENCY_TIMEOUT_SECS", 10)?),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a valid value, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
