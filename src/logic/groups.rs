//! Group stage: teams split into lettered groups, each playing a round robin in its own round.

use crate::logic::fixture::{pair_indices, Calendar};
use crate::models::{Leg, ScheduleError, ScheduleParameters, ScheduledMatch, Team};

pub const MIN_GROUPS: usize = 2;
pub const MAX_GROUPS: usize = 8;

const GROUP_LABELS: [char; MAX_GROUPS] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Split teams into `group_count` groups of `ceil(N / group_count)` consecutive teams.
/// Trailing groups may be smaller (or empty when N is small).
pub fn split_into_groups(teams: &[Team], group_count: usize) -> Vec<(char, Vec<Team>)> {
    let per_group = teams.len().div_ceil(group_count.max(1)).max(1);
    GROUP_LABELS
        .iter()
        .take(group_count)
        .enumerate()
        .map(|(g, &label)| {
            let start = (g * per_group).min(teams.len());
            let end = (start + per_group).min(teams.len());
            (label, teams[start..end].to_vec())
        })
        .collect()
}

/// Generate a group-stage fixture.
///
/// Group `k` (in label order) plays all of its pairs in round `k + 1`. Slots alternate by
/// the match's index across the whole stage. Every group needs at least two teams.
pub fn generate_group_stage(
    teams: &[Team],
    params: &ScheduleParameters,
    group_count: usize,
) -> Result<Vec<ScheduledMatch>, ScheduleError> {
    if !(MIN_GROUPS..=MAX_GROUPS).contains(&group_count) {
        return Err(ScheduleError::InvalidParameter {
            name: "group_count",
            reason: format!(
                "must be between {} and {} (got {})",
                MIN_GROUPS, MAX_GROUPS, group_count
            ),
        });
    }
    let groups = split_into_groups(teams, group_count);
    if groups.iter().any(|(_, members)| members.len() < 2) {
        return Err(ScheduleError::InsufficientTeams {
            required: 2 * group_count,
            got: teams.len(),
        });
    }
    let calendar = Calendar::from_params(params, group_count as u32)?;

    let mut matches = Vec::new();
    for (g, (label, members)) in groups.iter().enumerate() {
        let round_number = g as u32 + 1;
        for (i, j) in pair_indices(members.len()) {
            let (home, away) = (&members[i], &members[j]);
            matches.push(ScheduledMatch {
                home_team_id: home.id,
                away_team_id: away.id,
                kickoff: calendar.kickoff(round_number, matches.len()),
                venue: home.venue.clone(),
                round_number,
                leg: Leg::FirstLeg,
                group: Some(*label),
            });
        }
    }

    log::debug!(
        "Generated group stage: {} teams in {} groups, {} matches",
        teams.len(),
        group_count,
        matches.len()
    );
    Ok(matches)
}
