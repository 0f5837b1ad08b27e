//! Persistence port for lockout state and the login attempt log, plus an in-memory store.

use crate::models::{AccountLockoutState, LoginAttemptRecord, LoginOutcome, StoreError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage used by [`LoginLockoutTracker`](crate::LoginLockoutTracker).
///
/// The tracker serializes calls per account; implementations only need each call to be atomic.
pub trait LockoutStore: Send + Sync {
    fn load_state(&self, account_key: &str) -> Result<Option<AccountLockoutState>, StoreError>;

    fn save_state(&self, state: &AccountLockoutState) -> Result<(), StoreError>;

    /// Append to the attempt log; returns the record's sequence number, increasing across the store.
    fn append_attempt(&self, record: LoginAttemptRecord) -> Result<u64, StoreError>;

    /// Highest sequence number handed out so far, if any.
    fn last_sequence(&self) -> Result<Option<u64>, StoreError>;

    /// Failed attempts for `account_key` at or after `since` whose sequence is above `after`.
    fn count_failures_since(
        &self,
        account_key: &str,
        since: DateTime<Utc>,
        after: Option<u64>,
    ) -> Result<u32, StoreError>;

    /// Delete attempt records strictly before `before`; returns how many were removed.
    fn purge_attempts_before(&self, before: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Process-local store backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryLockoutStore {
    states: RwLock<HashMap<String, AccountLockoutState>>,
    attempts: RwLock<AttemptLog>,
}

#[derive(Debug, Default)]
struct AttemptLog {
    last_sequence: Option<u64>,
    records: Vec<(u64, LoginAttemptRecord)>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl InMemoryLockoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All attempts recorded for an account, oldest first.
    pub fn attempts_for(&self, account_key: &str) -> Result<Vec<LoginAttemptRecord>, StoreError> {
        let g = self.attempts.read().map_err(poisoned)?;
        Ok(g.records
            .iter()
            .filter(|(_, r)| r.account_key == account_key)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl LockoutStore for InMemoryLockoutStore {
    fn load_state(&self, account_key: &str) -> Result<Option<AccountLockoutState>, StoreError> {
        let g = self.states.read().map_err(poisoned)?;
        Ok(g.get(account_key).cloned())
    }

    fn save_state(&self, state: &AccountLockoutState) -> Result<(), StoreError> {
        let mut g = self.states.write().map_err(poisoned)?;
        g.insert(state.account_key.clone(), state.clone());
        Ok(())
    }

    fn append_attempt(&self, record: LoginAttemptRecord) -> Result<u64, StoreError> {
        let mut g = self.attempts.write().map_err(poisoned)?;
        let sequence = g.last_sequence.map_or(0, |s| s + 1);
        g.last_sequence = Some(sequence);
        g.records.push((sequence, record));
        Ok(sequence)
    }

    fn last_sequence(&self) -> Result<Option<u64>, StoreError> {
        Ok(self.attempts.read().map_err(poisoned)?.last_sequence)
    }

    fn count_failures_since(
        &self,
        account_key: &str,
        since: DateTime<Utc>,
        after: Option<u64>,
    ) -> Result<u32, StoreError> {
        let g = self.attempts.read().map_err(poisoned)?;
        let count = g
            .records
            .iter()
            .filter(|(sequence, r)| {
                r.account_key == account_key
                    && r.outcome == LoginOutcome::Failure
                    && r.timestamp >= since
                    && after.map_or(true, |a| *sequence > a)
            })
            .count();
        Ok(count as u32)
    }

    fn purge_attempts_before(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut g = self.attempts.write().map_err(poisoned)?;
        let len_before = g.records.len();
        g.records.retain(|(_, r)| r.timestamp >= before);
        Ok((len_before - g.records.len()) as u64)
    }
}
