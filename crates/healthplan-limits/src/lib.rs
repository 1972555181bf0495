//! Per-user, per-action hourly rate limiting.
//!
//! The limiter is the only shared mutable state in the pipeline. It is an
//! owned component; callers construct and inject it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use healthplan_core::{Error, RateLimits, Result};

/// Rate-limited action categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    DocumentUpload,
    Generation,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentUpload => write!(f, "document_upload"),
            Self::Generation => write!(f, "generation"),
        }
    }
}

/// Quota left in the current window after a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateStatus {
    pub remaining: u32,
    #[serde(rename = "resetAt")]
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Fixed hourly window counter keyed by user and action.
pub struct RateLimiter {
    limits: RateLimits,
    window: Duration,
    entries: Mutex<HashMap<(String, Action), Window>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            window: Duration::hours(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit_for(&self, action: Action) -> u32 {
        match action {
            Action::DocumentUpload => self.limits.document_upload_per_hour,
            Action::Generation => self.limits.generation_per_hour,
        }
    }

    /// Count one call against the quota, rejecting it when exhausted.
    pub fn check(&self, user_id: &str, action: Action) -> Result<RateStatus> {
        self.check_at(user_id, action, Utc::now())
    }

    /// `check` with an explicit clock.
    pub fn check_at(
        &self,
        user_id: &str,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<RateStatus> {
        let limit = self.limit_for(action);
        let mut entries = self.entries.lock();
        let window = entries
            .entry((user_id.to_string(), action))
            .or_insert(Window {
                count: 0,
                reset_at: now + self.window,
            });

        // Stale windows are replaced on access rather than swept.
        if now >= window.reset_at {
            *window = Window {
                count: 0,
                reset_at: now + self.window,
            };
        }

        if window.count >= limit {
            let retry_after_secs = (window.reset_at - now).num_seconds().max(1) as u64;
            warn!(
                "Rate limit hit: user {} action {} ({}/h), retry in {}s",
                user_id, action, limit, retry_after_secs
            );
            return Err(Error::RateLimited {
                action: action.to_string(),
                retry_after_secs,
            });
        }

        window.count += 1;
        debug!(
            "Rate check: user {} action {} {}/{}",
            user_id, action, window.count, limit
        );
        Ok(RateStatus {
            remaining: limit - window.count,
            reset_at: window.reset_at,
        })
    }

    /// Number of tracked user/action windows, stale ones included.
    pub fn tracked(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimits::default())
    }
}
