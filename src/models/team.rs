//! Team and ApprovalStatus.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Registration status of a team in a championship.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A team registered for a championship.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Home ground; used as the venue of the team's home matches.
    pub venue: String,
    #[serde(default)]
    pub status: ApprovalStatus,
}

impl Team {
    /// Create an approved team with a fresh id.
    pub fn new(name: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            venue: venue.into(),
            status: ApprovalStatus::Approved,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}

/// Approved teams, in input order.
pub fn approved(teams: &[Team]) -> Vec<Team> {
    teams.iter().filter(|t| t.is_approved()).cloned().collect()
}
