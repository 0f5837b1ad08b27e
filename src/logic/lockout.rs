//! Login brute-force protection: windowed failure counting, timed lockout, unlock codes.

use crate::logic::lockout_store::LockoutStore;
use crate::logic::notify::UnlockNotifier;
use crate::models::{
    AccountLockoutState, AttemptOutcome, LockStatus, LockoutError, LockoutPolicy,
    LoginAttemptRecord, REASON_ACCOUNT_LOCKED,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Failure reason logged for plain bad-credential attempts.
const REASON_INVALID_CREDENTIALS: &str = "invalid_credentials";

/// A random 6-digit numeric code.
pub fn generate_unlock_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

/// Whole minutes until `until`, rounded up, at least 1.
fn remaining_minutes(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (until - now).num_seconds();
    ((secs + 59) / 60).max(1)
}

/// Tracks login attempts per account and decides when to lock.
///
/// Every mutating call runs under a per-account mutex, so two concurrent failures for
/// the same account cannot both miss the threshold.
pub struct LoginLockoutTracker<S, N> {
    policy: LockoutPolicy,
    store: S,
    notifier: N,
    account_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: LockoutStore, N: UnlockNotifier> LoginLockoutTracker<S, N> {
    pub fn new(policy: LockoutPolicy, store: S, notifier: N) -> Self {
        Self {
            policy,
            store,
            notifier,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn account_lock(&self, account_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .account_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(account_key.to_string()).or_default().clone()
    }

    fn load(&self, account_key: &str) -> Result<AccountLockoutState, LockoutError> {
        Ok(self
            .store
            .load_state(account_key)?
            .unwrap_or_else(|| AccountLockoutState::new(account_key)))
    }

    /// Current stored state, if the account ever failed a login.
    pub fn state(&self, account_key: &str) -> Result<Option<AccountLockoutState>, LockoutError> {
        Ok(self.store.load_state(account_key)?)
    }

    /// Record one login attempt and return what the caller should tell the user.
    ///
    /// Fails with `AccountLocked` while a lock is active; the attempt is still logged.
    pub fn record_attempt(
        &self,
        account_key: &str,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome, LockoutError> {
        let lock = self.account_lock(account_key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self.load(account_key)?;

        if let Some(locked_until) = state.locked_until.filter(|_| state.is_locked_at(now)) {
            self.store.append_attempt(LoginAttemptRecord::failure(
                account_key,
                now,
                Some(REASON_ACCOUNT_LOCKED),
            ))?;
            log::debug!("Login attempt for locked account {}", account_key);
            return Err(LockoutError::AccountLocked {
                locked_until,
                remaining_minutes: remaining_minutes(locked_until, now),
            });
        }

        if let Some(expired_at) = state.locked_until.filter(|_| state.lock_expired_at(now)) {
            // Everything logged so far, attempts made during the lock included, stops counting.
            state.reset(self.store.last_sequence()?);
            log::info!("Lock on {} expired at {}", account_key, expired_at);
        }

        if success {
            let sequence = self
                .store
                .append_attempt(LoginAttemptRecord::success(account_key, now))?;
            state.reset(Some(sequence));
            self.store.save_state(&state)?;
            return Ok(AttemptOutcome::Accepted);
        }

        self.store.append_attempt(LoginAttemptRecord::failure(
            account_key,
            now,
            Some(REASON_INVALID_CREDENTIALS),
        ))?;
        let failures = self.store.count_failures_since(
            account_key,
            now - self.policy.window(),
            state.counted_after,
        )?;
        state.failure_count_in_window = failures;
        log::debug!(
            "Failed login for {}: {}/{} within window",
            account_key,
            failures,
            self.policy.max_attempts
        );

        if failures < self.policy.max_attempts {
            self.store.save_state(&state)?;
            return Ok(AttemptOutcome::Rejected {
                attempts_remaining: self.policy.max_attempts - failures,
            });
        }

        let locked_until = now + self.policy.lockout_duration();
        let unlock_code = generate_unlock_code();
        state.lock(
            locked_until,
            unlock_code.clone(),
            now + self.policy.code_validity(),
        );
        self.store.save_state(&state)?;
        log::info!(
            "Account {} locked until {} after {} failed attempts",
            account_key,
            locked_until,
            failures
        );

        // The lock stands even if the user never gets the code.
        if let Err(e) = self
            .notifier
            .send_unlock_code(account_key, &unlock_code, locked_until)
        {
            log::warn!("Unlock code for {} not delivered: {}", account_key, e);
        }

        Ok(AttemptOutcome::Locked {
            locked_until,
            unlock_code,
        })
    }

    /// Whether the account is locked at `now`. An expired lock reads as unlocked; nothing is written.
    pub fn is_locked(&self, account_key: &str, now: DateTime<Utc>) -> Result<LockStatus, LockoutError> {
        let Some(state) = self.store.load_state(account_key)? else {
            return Ok(LockStatus::unlocked());
        };
        if state.is_locked_at(now) {
            Ok(LockStatus {
                locked: true,
                locked_until: state.locked_until,
            })
        } else {
            Ok(LockStatus::unlocked())
        }
    }

    /// Pre-login check: `Err(AccountLocked)` while a lock is active.
    pub fn ensure_unlocked(&self, account_key: &str, now: DateTime<Utc>) -> Result<(), LockoutError> {
        match self.is_locked(account_key, now)? {
            LockStatus {
                locked: true,
                locked_until: Some(locked_until),
            } => Err(LockoutError::AccountLocked {
                locked_until,
                remaining_minutes: remaining_minutes(locked_until, now),
            }),
            _ => Ok(()),
        }
    }

    /// Unlock with the emailed code. A wrong or expired code changes nothing.
    pub fn unlock(&self, account_key: &str, code: &str, now: DateTime<Utc>) -> Result<(), LockoutError> {
        let lock = self.account_lock(account_key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self
            .store
            .load_state(account_key)?
            .ok_or(LockoutError::InvalidUnlockCode)?;
        if !state.accepts_code(code, now) {
            log::debug!("Rejected unlock code for {}", account_key);
            return Err(LockoutError::InvalidUnlockCode);
        }
        state.reset(self.store.last_sequence()?);
        self.store.save_state(&state)?;
        log::info!("Account {} unlocked with code", account_key);
        Ok(())
    }

    /// Issue a new unlock code for a locked account and send it again.
    pub fn resend_unlock_code(&self, account_key: &str, now: DateTime<Utc>) -> Result<String, LockoutError> {
        let lock = self.account_lock(account_key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self.load(account_key)?;
        let locked_until = state
            .locked_until
            .filter(|_| state.is_locked_at(now))
            .ok_or(LockoutError::NotLocked)?;

        let unlock_code = generate_unlock_code();
        state.lock(locked_until, unlock_code.clone(), now + self.policy.code_validity());
        self.store.save_state(&state)?;

        if let Err(e) = self
            .notifier
            .send_unlock_code(account_key, &unlock_code, locked_until)
        {
            log::warn!("Unlock code for {} not delivered: {}", account_key, e);
        }
        Ok(unlock_code)
    }

    /// Drop attempt records past the retention period and forget idle account mutexes.
    pub fn purge_old_attempts(&self, now: DateTime<Utc>) -> Result<u64, LockoutError> {
        let removed = self
            .store
            .purge_attempts_before(now - self.policy.retention())?;
        self.account_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, m| Arc::strong_count(m) > 1);
        if removed > 0 {
            log::info!("Purged {} login attempt record(s)", removed);
        }
        Ok(removed)
    }
}
