//! Login lockout state, attempt records, policy and errors.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reason logged for attempts made while the account is locked.
pub const REASON_ACCOUNT_LOCKED: &str = "account_locked";

/// Thresholds and durations of the lockout state machine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LockoutPolicy {
    /// Failures within the window that lock the account.
    pub max_attempts: u32,
    pub window_minutes: i64,
    pub lockout_minutes: i64,
    /// How long an issued unlock code stays valid.
    pub unlock_code_minutes: i64,
    /// Attempt records older than this are purged.
    pub retention_days: i64,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_minutes: 10,
            lockout_minutes: 10,
            unlock_code_minutes: 15,
            retention_days: 90,
        }
    }
}

impl LockoutPolicy {
    pub fn window(&self) -> Duration {
        Duration::minutes(self.window_minutes)
    }

    pub fn lockout_duration(&self) -> Duration {
        Duration::minutes(self.lockout_minutes)
    }

    pub fn code_validity(&self) -> Duration {
        Duration::minutes(self.unlock_code_minutes)
    }

    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    Success,
    Failure,
}

/// One login attempt, as kept in the attempt log.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoginAttemptRecord {
    pub account_key: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: LoginOutcome,
    pub failure_reason: Option<String>,
}

impl LoginAttemptRecord {
    pub fn success(account_key: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            account_key: account_key.into(),
            timestamp,
            outcome: LoginOutcome::Success,
            failure_reason: None,
        }
    }

    pub fn failure(
        account_key: impl Into<String>,
        timestamp: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Self {
        Self {
            account_key: account_key.into(),
            timestamp,
            outcome: LoginOutcome::Failure,
            failure_reason: reason.map(str::to_string),
        }
    }
}

/// Per-account lockout state.
///
/// `failure_count_in_window` caches the windowed failure count of the attempt log.
/// Attempts with a log sequence at or below `counted_after` never count; every reset
/// moves it forward, so failures logged at the same instant as a reset are excluded too.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccountLockoutState {
    pub account_key: String,
    pub locked_until: Option<DateTime<Utc>>,
    pub unlock_code: Option<String>,
    pub unlock_code_expires_at: Option<DateTime<Utc>>,
    pub failure_count_in_window: u32,
    pub counted_after: Option<u64>,
}

impl AccountLockoutState {
    /// Fresh, unlocked state.
    pub fn new(account_key: impl Into<String>) -> Self {
        Self {
            account_key: account_key.into(),
            locked_until: None,
            unlock_code: None,
            unlock_code_expires_at: None,
            failure_count_in_window: 0,
            counted_after: None,
        }
    }

    /// Locked iff `locked_until` is strictly in the future.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// A lock was set but has run out.
    pub fn lock_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until <= now)
    }

    /// Back to UNLOCKED with a zero count; attempts up to sequence `after` are ignored from now on.
    pub fn reset(&mut self, after: Option<u64>) {
        self.locked_until = None;
        self.unlock_code = None;
        self.unlock_code_expires_at = None;
        self.failure_count_in_window = 0;
        self.counted_after = after.or(self.counted_after);
    }

    pub fn lock(
        &mut self,
        locked_until: DateTime<Utc>,
        unlock_code: String,
        code_expires_at: DateTime<Utc>,
    ) {
        self.locked_until = Some(locked_until);
        self.unlock_code = Some(unlock_code);
        self.unlock_code_expires_at = Some(code_expires_at);
    }

    /// Whether `code` matches the issued code and is still valid at `now`.
    pub fn accepts_code(&self, code: &str, now: DateTime<Utc>) -> bool {
        match (&self.unlock_code, self.unlock_code_expires_at) {
            (Some(expected), Some(expires_at)) => expected == code.trim() && now < expires_at,
            _ => false,
        }
    }
}

/// Result of recording one login attempt.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Successful login; counters reset.
    Accepted,
    /// Failure recorded, still under the threshold.
    Rejected { attempts_remaining: u32 },
    /// Failure recorded and the threshold was just reached.
    Locked {
        locked_until: DateTime<Utc>,
        unlock_code: String,
    },
}

/// Answer of a lock-status query.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LockStatus {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockStatus {
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            locked_until: None,
        }
    }
}

/// Failure of the lockout state store.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("lockout store unavailable: {0}")]
    Unavailable(String),
}

/// Failure to deliver an unlock code.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum NotifyError {
    #[error("could not send unlock code: {0}")]
    Send(String),
}

/// Errors returned by the lockout tracker.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LockoutError {
    #[error("Account locked until {locked_until} ({remaining_minutes} min remaining)")]
    AccountLocked {
        locked_until: DateTime<Utc>,
        remaining_minutes: i64,
    },
    #[error("Invalid or expired unlock code")]
    InvalidUnlockCode,
    #[error("Account is not locked")]
    NotLocked,
    #[error(transparent)]
    Store(#[from] StoreError),
}
