//! League table and top scorers.

use crate::models::{
    GoalEvent, GoalKind, MatchResult, MatchStatus, PlayerId, ScorerRow, StandingRow, Team, TeamId,
};
use std::cmp::Reverse;
use std::collections::HashMap;

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// Default length of the top-scorers table.
pub const DEFAULT_SCORER_LIMIT: usize = 10;

/// Compute the league table from finished results.
///
/// Every team in `teams` gets a row, even without games. Results involving other teams
/// are ignored. Ordered by points, goal difference and goals for (descending), then name.
pub fn compute_standings(teams: &[Team], results: &[MatchResult]) -> Vec<StandingRow> {
    let mut rows: HashMap<TeamId, StandingRow> = teams
        .iter()
        .map(|t| {
            let row = StandingRow {
                team_id: t.id,
                team_name: t.name.clone(),
                ..StandingRow::default()
            };
            (t.id, row)
        })
        .collect();

    for r in results.iter().filter(|r| r.status == MatchStatus::Finished) {
        if !rows.contains_key(&r.home_team_id) || !rows.contains_key(&r.away_team_id) {
            log::debug!(
                "Skipping result between unlisted teams {} and {}",
                r.home_team_id,
                r.away_team_id
            );
            continue;
        }
        apply_result(&mut rows, r.home_team_id, r.home_goals, r.away_goals);
        apply_result(&mut rows, r.away_team_id, r.away_goals, r.home_goals);
    }

    let mut table: Vec<StandingRow> = rows.into_values().collect();
    table.sort_by(|a, b| {
        (Reverse(a.points), Reverse(a.goal_difference), Reverse(a.goals_for), &a.team_name)
            .cmp(&(Reverse(b.points), Reverse(b.goal_difference), Reverse(b.goals_for), &b.team_name))
    });
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
    table
}

/// Add one side of a finished match to that team's row.
fn apply_result(rows: &mut HashMap<TeamId, StandingRow>, team: TeamId, scored: u32, conceded: u32) {
    let Some(row) = rows.get_mut(&team) else {
        return;
    };
    row.played += 1;
    row.goals_for += scored;
    row.goals_against += conceded;
    row.goal_difference = i64::from(row.goals_for) - i64::from(row.goals_against);
    match scored.cmp(&conceded) {
        std::cmp::Ordering::Greater => {
            row.won += 1;
            row.points += POINTS_FOR_WIN;
        }
        std::cmp::Ordering::Equal => {
            row.drawn += 1;
            row.points += POINTS_FOR_DRAW;
        }
        std::cmp::Ordering::Less => row.lost += 1,
    }
}

/// Top scorers: goals per player excluding own goals, most first, at most `limit` rows.
pub fn top_scorers(goals: &[GoalEvent], limit: usize) -> Vec<ScorerRow> {
    let mut tally: HashMap<PlayerId, ScorerRow> = HashMap::new();
    for g in goals.iter().filter(|g| g.kind != GoalKind::OwnGoal) {
        tally
            .entry(g.player_id)
            .or_insert_with(|| ScorerRow {
                position: 0,
                player_id: g.player_id,
                player_name: g.player_name.clone(),
                shirt_number: g.shirt_number,
                goals: 0,
            })
            .goals += 1;
    }

    let mut table: Vec<ScorerRow> = tally.into_values().collect();
    table.sort_by(|a, b| b.goals.cmp(&a.goals).then_with(|| a.player_name.cmp(&b.player_name)));
    table.truncate(limit);
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
    table
}
