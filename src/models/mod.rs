//! Data structures for the championship: teams, fixtures, results, login lockout.

mod lockout;
mod results;
mod schedule;
mod team;

pub use lockout::{
    AccountLockoutState, AttemptOutcome, LockStatus, LockoutError, LockoutPolicy,
    LoginAttemptRecord, LoginOutcome, NotifyError, StoreError, REASON_ACCOUNT_LOCKED,
};
pub use results::{
    GoalEvent, GoalKind, MatchResult, MatchStatus, PlayerId, ScorerRow, StandingRow,
};
pub use schedule::{KnockoutTie, Leg, ScheduleError, ScheduleParameters, ScheduledMatch};
pub use team::{approved, ApprovalStatus, Team, TeamId};
