//! Played matches, goals, and the standings / scorer tables computed from them.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    Cancelled,
}

/// Score of a match. Only `Finished` results count towards the standings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_goals: u32,
    pub away_goals: u32,
    pub status: MatchStatus,
}

impl MatchResult {
    pub fn finished(home_team_id: TeamId, away_team_id: TeamId, home_goals: u32, away_goals: u32) -> Self {
        Self {
            home_team_id,
            away_team_id,
            home_goals,
            away_goals,
            status: MatchStatus::Finished,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    #[default]
    Normal,
    Penalty,
    OwnGoal,
    FreeKick,
}

/// A goal recorded during a match, credited to `player_id`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub player_id: PlayerId,
    pub player_name: String,
    pub shirt_number: Option<u32>,
    #[serde(default)]
    pub kind: GoalKind,
}

/// One line of the league table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: u32,
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

/// One line of the top-scorers table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScorerRow {
    pub position: u32,
    pub player_id: PlayerId,
    pub player_name: String,
    pub shirt_number: Option<u32>,
    pub goals: u32,
}
