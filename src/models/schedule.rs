//! Fixture inputs and outputs: schedule parameters, scheduled matches, knockout ties.

use crate::models::team::TeamId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while generating a fixture.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ScheduleError {
    /// Fewer teams than the format needs.
    #[error("Need at least {required} teams to generate a fixture (got {got})")]
    InsufficientTeams { required: usize, got: usize },
    /// A numeric parameter is out of range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// A slot time is not `HH:MM` or `HH:MM:SS`.
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),
}

/// How a championship's fixture is laid out.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduleParameters {
    /// Date of the first round.
    pub start_date: NaiveDate,
    pub days_between_rounds: i64,
    /// Kickoff of even positions within a round.
    pub first_slot_time: String,
    /// Kickoff of odd positions within a round.
    pub second_slot_time: String,
    #[serde(default)]
    pub include_return_leg: bool,
}

/// Which half of a home-and-away schedule a match belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    #[default]
    FirstLeg,
    ReturnLeg,
}

/// One fixture entry. Immutable once generated.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub kickoff: NaiveDateTime,
    /// Home team's venue.
    pub venue: String,
    /// 1-based jornada.
    pub round_number: u32,
    pub leg: Leg,
    /// Group label (`'A'..='H'`) for group-stage fixtures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<char>,
}

/// One tie of a single-elimination bracket.
///
/// Only first-round ties carry teams. A first-round tie without an away team is a bye;
/// later rounds are filled in as results come in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutTie {
    pub round_number: u32,
    pub round_name: String,
    pub kickoff: NaiveDateTime,
    pub home: Option<TeamId>,
    pub away: Option<TeamId>,
    pub venue: Option<String>,
}

impl KnockoutTie {
    pub fn is_bye(&self) -> bool {
        self.round_number == 1 && self.home.is_some() && self.away.is_none()
    }
}
