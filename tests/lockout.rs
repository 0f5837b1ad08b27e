//! Integration tests for the login lockout state machine.

use campeonato_web::{
    AttemptOutcome, InMemoryLockoutStore, LockoutError, LockoutPolicy, LoginLockoutTracker,
    LoginOutcome, NotifyError, UnlockNotifier,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

const ACCOUNT: &str = "captain@club.test";

/// Captures sent codes; can be told to fail.
#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String, DateTime<Utc>)>>>,
    fail: bool,
}

impl UnlockNotifier for RecordingNotifier {
    fn send_unlock_code(
        &self,
        account_key: &str,
        unlock_code: &str,
        locked_until: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((
            account_key.to_string(),
            unlock_code.to_string(),
            locked_until,
        ));
        if self.fail {
            Err(NotifyError::Send("smtp down".into()))
        } else {
            Ok(())
        }
    }
}

type Tracker = LoginLockoutTracker<InMemoryLockoutStore, RecordingNotifier>;

fn tracker() -> (Tracker, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let t = LoginLockoutTracker::new(
        LockoutPolicy::default(),
        InMemoryLockoutStore::new(),
        notifier.clone(),
    );
    (t, notifier)
}

fn at(min: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap() + Duration::minutes(min)
}

/// Fail `n` times, one minute apart starting at `start`; returns the last outcome.
fn fail_times(t: &Tracker, start: i64, n: i64) -> AttemptOutcome {
    let mut last = AttemptOutcome::Accepted;
    for i in 0..n {
        last = t.record_attempt(ACCOUNT, false, at(start + i)).unwrap();
    }
    last
}

fn lock_account(t: &Tracker) -> (DateTime<Utc>, String) {
    match fail_times(t, 0, 5) {
        AttemptOutcome::Locked {
            locked_until,
            unlock_code,
        } => (locked_until, unlock_code),
        other => panic!("expected lock, got {other:?}"),
    }
}

#[test]
fn failures_count_down_remaining_attempts() {
    let (t, _) = tracker();
    for (i, remaining) in [4, 3, 2, 1].into_iter().enumerate() {
        assert_eq!(
            t.record_attempt(ACCOUNT, false, at(i as i64)).unwrap(),
            AttemptOutcome::Rejected {
                attempts_remaining: remaining
            }
        );
    }
    assert_eq!(t.state(ACCOUNT).unwrap().unwrap().failure_count_in_window, 4);
}

#[test]
fn fifth_failure_in_window_locks_with_six_digit_code() {
    let (t, notifier) = tracker();
    let (locked_until, code) = lock_account(&t);

    // Fifth failure at minute 4.
    assert_eq!(locked_until, at(4) + Duration::minutes(10));
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let state = t.state(ACCOUNT).unwrap().unwrap();
    assert_eq!(state.unlock_code.as_deref(), Some(code.as_str()));
    assert_eq!(state.unlock_code_expires_at, Some(at(4) + Duration::minutes(15)));
    assert_eq!(state.failure_count_in_window, 5);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], (ACCOUNT.to_string(), code, locked_until));
}

#[test]
fn success_resets_the_count() {
    let (t, _) = tracker();
    fail_times(&t, 0, 4);
    assert_eq!(t.record_attempt(ACCOUNT, true, at(4)).unwrap(), AttemptOutcome::Accepted);
    assert_eq!(t.state(ACCOUNT).unwrap().unwrap().failure_count_in_window, 0);

    // Next failure is #1, not #5.
    assert_eq!(
        t.record_attempt(ACCOUNT, false, at(5)).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
}

#[test]
fn failures_outside_the_window_do_not_count() {
    let (t, _) = tracker();
    fail_times(&t, 0, 4);
    // Minute 12: failures at minutes 0 and 1 have left the 10-minute window.
    assert_eq!(
        t.record_attempt(ACCOUNT, false, at(12)).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 2
        }
    );
    assert_eq!(t.state(ACCOUNT).unwrap().unwrap().failure_count_in_window, 3);
}

#[test]
fn attempts_while_locked_are_refused() {
    let (t, _) = tracker();
    let (locked_until, _) = lock_account(&t);

    for success in [false, true] {
        match t.record_attempt(ACCOUNT, success, at(6)) {
            Err(LockoutError::AccountLocked {
                locked_until: until,
                remaining_minutes,
            }) => {
                assert_eq!(until, locked_until);
                assert_eq!(remaining_minutes, 8);
            }
            other => panic!("expected AccountLocked, got {other:?}"),
        }
    }
    assert!(matches!(
        t.ensure_unlocked(ACCOUNT, at(6)),
        Err(LockoutError::AccountLocked { .. })
    ));

    let log = t.store().attempts_for(ACCOUNT).unwrap();
    assert_eq!(log.len(), 7);
    assert!(log[5..]
        .iter()
        .all(|r| r.outcome == LoginOutcome::Failure
            && r.failure_reason.as_deref() == Some("account_locked")));
}

#[test]
fn lock_expires_on_its_own() {
    let (t, _) = tracker();
    let (locked_until, _) = lock_account(&t);

    let status = t.is_locked(ACCOUNT, at(5)).unwrap();
    assert!(status.locked);
    assert_eq!(status.locked_until, Some(locked_until));

    let status = t.is_locked(ACCOUNT, locked_until).unwrap();
    assert!(!status.locked);
    assert_eq!(status.locked_until, None);
    assert!(t.ensure_unlocked(ACCOUNT, locked_until).is_ok());

    // The query wrote nothing.
    assert_eq!(t.state(ACCOUNT).unwrap().unwrap().locked_until, Some(locked_until));

    // Next attempt sees a fresh counter.
    assert_eq!(
        t.record_attempt(ACCOUNT, false, locked_until + Duration::minutes(1)).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
    let state = t.state(ACCOUNT).unwrap().unwrap();
    assert_eq!(state.locked_until, None);
    assert_eq!(state.unlock_code, None);
    assert_eq!(state.failure_count_in_window, 1);
}

#[test]
fn attempts_during_lock_do_not_count_after_expiry() {
    let (t, _) = tracker();
    let (locked_until, _) = lock_account(&t);
    for m in 5..10 {
        assert!(t.record_attempt(ACCOUNT, false, at(m)).is_err());
    }
    assert_eq!(
        t.record_attempt(ACCOUNT, false, locked_until).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
}

/// Fail `n` times, all at the same instant.
fn fail_at_once(t: &Tracker, when: DateTime<Utc>, n: usize) -> AttemptOutcome {
    let mut last = AttemptOutcome::Accepted;
    for _ in 0..n {
        last = t.record_attempt(ACCOUNT, false, when).unwrap();
    }
    last
}

#[test]
fn success_resets_failures_logged_at_the_same_instant() {
    let (t, _) = tracker();
    let now = at(0);
    fail_at_once(&t, now, 4);
    assert_eq!(t.record_attempt(ACCOUNT, true, now).unwrap(), AttemptOutcome::Accepted);
    assert_eq!(
        t.record_attempt(ACCOUNT, false, now).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
    assert_eq!(t.state(ACCOUNT).unwrap().unwrap().failure_count_in_window, 1);
}

#[test]
fn unlock_resets_failures_logged_at_the_same_instant() {
    let (t, _) = tracker();
    let now = at(0);
    let code = match fail_at_once(&t, now, 5) {
        AttemptOutcome::Locked { unlock_code, .. } => unlock_code,
        other => panic!("expected lock, got {other:?}"),
    };
    // Refused while locked, still logged as a failure.
    assert!(t.record_attempt(ACCOUNT, false, now).is_err());

    t.unlock(ACCOUNT, &code, now).unwrap();
    assert_eq!(
        t.record_attempt(ACCOUNT, false, now).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
}

#[test]
fn expiry_resets_failures_still_inside_the_window() {
    let (t, _) = tracker();
    // Lock and window are both 10 minutes, so at expiry the original failures sit
    // exactly on the inclusive window start.
    let locked_until = match fail_at_once(&t, at(0), 5) {
        AttemptOutcome::Locked { locked_until, .. } => locked_until,
        other => panic!("expected lock, got {other:?}"),
    };
    assert_eq!(locked_until, at(10));

    assert_eq!(
        t.record_attempt(ACCOUNT, false, locked_until).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
    assert_eq!(
        t.record_attempt(ACCOUNT, false, locked_until).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 3
        }
    );
}

#[test]
fn correct_code_unlocks_and_resets() {
    let (t, _) = tracker();
    let (_, code) = lock_account(&t);

    t.unlock(ACCOUNT, &code, at(6)).unwrap();
    assert!(!t.is_locked(ACCOUNT, at(6)).unwrap().locked);
    let state = t.state(ACCOUNT).unwrap().unwrap();
    assert_eq!(state.failure_count_in_window, 0);
    assert_eq!(state.unlock_code, None);

    // Failures before the unlock are forgotten.
    assert_eq!(
        t.record_attempt(ACCOUNT, false, at(7)).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );

    // The code is single use.
    assert_eq!(t.unlock(ACCOUNT, &code, at(8)), Err(LockoutError::InvalidUnlockCode));
}

#[test]
fn wrong_or_expired_code_changes_nothing() {
    let (t, _) = tracker();
    let (locked_until, code) = lock_account(&t);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    assert_eq!(t.unlock(ACCOUNT, wrong, at(6)), Err(LockoutError::InvalidUnlockCode));
    let state = t.state(ACCOUNT).unwrap().unwrap();
    assert_eq!(state.locked_until, Some(locked_until));
    assert!(t.is_locked(ACCOUNT, at(6)).unwrap().locked);

    // Issued at minute 4, valid for 15.
    assert_eq!(t.unlock(ACCOUNT, &code, at(19)), Err(LockoutError::InvalidUnlockCode));
    assert_eq!(t.unlock("nobody@club.test", &code, at(6)), Err(LockoutError::InvalidUnlockCode));
}

#[test]
fn lock_stands_when_notification_fails() {
    let notifier = RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    };
    let t = LoginLockoutTracker::new(
        LockoutPolicy::default(),
        InMemoryLockoutStore::new(),
        notifier.clone(),
    );
    let outcome = fail_times(&t, 0, 5);
    assert!(matches!(outcome, AttemptOutcome::Locked { .. }));
    assert!(t.is_locked(ACCOUNT, at(5)).unwrap().locked);
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
}

#[test]
fn resend_issues_a_fresh_code() {
    let (t, notifier) = tracker();
    assert_eq!(t.resend_unlock_code(ACCOUNT, at(0)), Err(LockoutError::NotLocked));

    let (locked_until, _) = lock_account(&t);
    let fresh = t.resend_unlock_code(ACCOUNT, at(8)).unwrap();

    let state = t.state(ACCOUNT).unwrap().unwrap();
    assert_eq!(state.unlock_code.as_deref(), Some(fresh.as_str()));
    assert_eq!(state.unlock_code_expires_at, Some(at(8) + Duration::minutes(15)));
    assert_eq!(state.locked_until, Some(locked_until));
    assert_eq!(notifier.sent.lock().unwrap().len(), 2);

    t.unlock(ACCOUNT, &fresh, at(20)).unwrap();
    assert_eq!(t.resend_unlock_code(ACCOUNT, at(21)), Err(LockoutError::NotLocked));
}

#[test]
fn accounts_are_tracked_independently() {
    let (t, _) = tracker();
    lock_account(&t);
    assert_eq!(
        t.record_attempt("other@club.test", false, at(5)).unwrap(),
        AttemptOutcome::Rejected {
            attempts_remaining: 4
        }
    );
    assert!(!t.is_locked("other@club.test", at(5)).unwrap().locked);
}

#[test]
fn custom_policy_threshold() {
    let policy = LockoutPolicy {
        max_attempts: 2,
        lockout_minutes: 30,
        ..LockoutPolicy::default()
    };
    let t = LoginLockoutTracker::new(policy, InMemoryLockoutStore::new(), RecordingNotifier::default());
    assert!(matches!(
        t.record_attempt(ACCOUNT, false, at(0)).unwrap(),
        AttemptOutcome::Rejected { attempts_remaining: 1 }
    ));
    match t.record_attempt(ACCOUNT, false, at(1)).unwrap() {
        AttemptOutcome::Locked { locked_until, .. } => assert_eq!(locked_until, at(31)),
        other => panic!("expected lock, got {other:?}"),
    }
}

#[test]
fn purge_drops_records_past_retention() {
    let (t, _) = tracker();
    fail_times(&t, 0, 3);
    assert_eq!(t.purge_old_attempts(at(60)).unwrap(), 0);
    assert_eq!(t.purge_old_attempts(at(0) + Duration::days(91)).unwrap(), 3);
    assert!(t.store().attempts_for(ACCOUNT).unwrap().is_empty());
}

#[test]
fn concurrent_failures_still_lock() {
    let (t, _) = tracker();
    let t = Arc::new(t);
    let handles: Vec<_> = (0..5)
        .map(|i| {
            let t = Arc::clone(&t);
            std::thread::spawn(move || t.record_attempt(ACCOUNT, false, at(0) + Duration::seconds(i)))
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    let locks = outcomes
        .iter()
        .filter(|o| matches!(o, AttemptOutcome::Locked { .. }))
        .count();
    assert_eq!(locks, 1);
    assert!(t.is_locked(ACCOUNT, at(1)).unwrap().locked);
}
