//! Daily play quotas.

use dashmap::DashMap;

use crate::session::UserId;

/// Failure of a quota backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuotaError {
    #[error("quota backend unavailable: {0}")]
    Unavailable(String),
}

/// Decides whether a user may begin a playthrough and counts completions.
///
/// The engine asks before every start and records exactly once when a
/// playthrough reaches an ending. Failures never touch session state.
pub trait QuotaGate {
    fn may_start(&self, user: &UserId) -> Result<bool, QuotaError>;

    fn record_completion(&self, user: &UserId) -> Result<(), QuotaError>;
}

impl<T: QuotaGate + ?Sized> QuotaGate for &T {
    fn may_start(&self, user: &UserId) -> Result<bool, QuotaError> {
        (**self).may_start(user)
    }

    fn record_completion(&self, user: &UserId) -> Result<(), QuotaError> {
        (**self).record_completion(user)
    }
}

impl<T: QuotaGate + ?Sized> QuotaGate for std::sync::Arc<T> {
    fn may_start(&self, user: &UserId) -> Result<bool, QuotaError> {
        (**self).may_start(user)
    }

    fn record_completion(&self, user: &UserId) -> Result<(), QuotaError> {
        (**self).record_completion(user)
    }
}

/// Never limits anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl QuotaGate for Unlimited {
    fn may_start(&self, _user: &UserId) -> Result<bool, QuotaError> {
        Ok(true)
    }

    fn record_completion(&self, _user: &UserId) -> Result<(), QuotaError> {
        Ok(())
    }
}

/// In-memory count of completed playthroughs per user.
///
/// Counts only grow until [`DailyQuota::reset`]; the host schedules the reset
/// at the start of each day.
#[derive(Debug, Default)]
pub struct DailyQuota {
    /// Completions allowed per day. Zero disables the limit.
    limit: u32,
    completions: DashMap<UserId, u32>,
}

impl DailyQuota {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            completions: DashMap::new(),
        }
    }

    /// Completions recorded for a user since the last reset.
    pub fn count(&self, user: &UserId) -> u32 {
        self.completions.get(user).map(|c| *c).unwrap_or(0)
    }

    /// Forget all counts.
    pub fn reset(&self) {
        self.completions.clear();
        tracing::info!("Daily quota counts reset");
    }
}

impl QuotaGate for DailyQuota {
    fn may_start(&self, user: &UserId) -> Result<bool, QuotaError> {
        if self.limit == 0 {
            return Ok(true);
        }
        let count = self.count(user);
        if count >= self.limit {
            tracing::info!(user = %user, count, limit = self.limit, "Daily limit reached");
            return Ok(false);
        }
        Ok(true)
    }

    fn record_completion(&self, user: &UserId) -> Result<(), QuotaError> {
        let mut count = self.completions.entry(user.clone()).or_insert(0);
        *count += 1;
        tracing::info!(user = %user, count = *count, "Completion recorded");
        Ok(())
    }
}
