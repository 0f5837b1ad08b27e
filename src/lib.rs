//! Indoor-football championship organizer: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    compute_standings, fixture_csv, generate_group_stage, generate_knockout, generate_league,
    generate_unlock_code, parse_slot_time, standings_csv, top_scorers, ExportError,
    InMemoryLockoutStore, LockoutStore, LogNotifier, LoginLockoutTracker, UnlockNotifier,
};
pub use models::{
    approved, AccountLockoutState, ApprovalStatus, AttemptOutcome, GoalEvent, GoalKind,
    KnockoutTie, Leg, LockStatus, LockoutError, LockoutPolicy, LoginAttemptRecord, LoginOutcome,
    MatchResult, MatchStatus, NotifyError, PlayerId, ScheduleError, ScheduleParameters,
    ScheduledMatch, ScorerRow, StandingRow, StoreError, Team, TeamId,
};
