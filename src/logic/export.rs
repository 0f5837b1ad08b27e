//! CSV reports: league table and fixture. Output starts with a UTF-8 BOM for spreadsheet apps.

use crate::models::{Leg, ScheduledMatch, StandingRow, Team, TeamId};
use std::collections::HashMap;
use thiserror::Error;

const BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer: {0}")]
    Buffer(String),
    #[error("report is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    Ok(format!("{}{}", BOM, String::from_utf8(bytes)?))
}

/// League table as CSV.
pub fn standings_csv(rows: &[StandingRow]) -> Result<String, ExportError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["Position", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"])?;
    for r in rows {
        w.write_record([
            r.position.to_string(),
            r.team_name.clone(),
            r.played.to_string(),
            r.won.to_string(),
            r.drawn.to_string(),
            r.lost.to_string(),
            r.goals_for.to_string(),
            r.goals_against.to_string(),
            r.goal_difference.to_string(),
            r.points.to_string(),
        ])?;
    }
    finish(w)
}

/// Fixture as CSV, ordered as given. Team ids not in `teams` print as `Unknown`.
pub fn fixture_csv(matches: &[ScheduledMatch], teams: &[Team]) -> Result<String, ExportError> {
    let names: HashMap<TeamId, &str> = teams.iter().map(|t| (t.id, t.name.as_str())).collect();
    let name = |id: &TeamId| names.get(id).copied().unwrap_or("Unknown").to_string();

    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["Round", "Date", "Time", "Home", "Away", "Venue", "Leg"])?;
    for m in matches {
        let leg = match m.leg {
            Leg::FirstLeg => "first",
            Leg::ReturnLeg => "return",
        };
        w.write_record([
            m.round_number.to_string(),
            m.kickoff.format("%Y-%m-%d").to_string(),
            m.kickoff.format("%H:%M").to_string(),
            name(&m.home_team_id),
            name(&m.away_team_id),
            m.venue.clone(),
            leg.to_string(),
        ])?;
    }
    finish(w)
}
