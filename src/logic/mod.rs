//! Championship business logic: fixtures, login lockout, standings, reports.

mod export;
mod fixture;
mod groups;
mod knockout;
mod lockout;
mod lockout_store;
mod notify;
mod standings;

pub use export::{fixture_csv, standings_csv, ExportError};
pub use fixture::{generate_league, parse_slot_time, MAX_DAYS_BETWEEN_ROUNDS};
pub use groups::{generate_group_stage, split_into_groups, MAX_GROUPS, MIN_GROUPS};
pub use knockout::{generate_knockout, round_name};
pub use lockout::{generate_unlock_code, LoginLockoutTracker};
pub use lockout_store::{InMemoryLockoutStore, LockoutStore};
pub use notify::{LogNotifier, UnlockNotifier};
pub use standings::{
    compute_standings, top_scorers, DEFAULT_SCORER_LIMIT, POINTS_FOR_DRAW, POINTS_FOR_WIN,
};
