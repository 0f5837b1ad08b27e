//! Single-elimination bracket: first-round draw plus dated placeholders for later rounds.

use crate::logic::fixture::Calendar;
use crate::models::{KnockoutTie, ScheduleError, ScheduleParameters, Team};

/// Display name of a round by the number of teams still in it.
pub fn round_name(teams_remaining: usize) -> String {
    match teams_remaining {
        2 => "Final".to_string(),
        4 => "Semifinal".to_string(),
        8 => "Quarterfinal".to_string(),
        n => format!("Round of {}", n),
    }
}

/// Generate a knockout bracket.
///
/// The bracket is padded to the next power of two. The first `size - N` teams get a bye
/// (a tie with no away side); the rest are paired in order. Rounds after the first have
/// no teams yet. Each round advances the date by `days_between_rounds`; slots alternate
/// by position within the round.
pub fn generate_knockout(
    teams: &[Team],
    params: &ScheduleParameters,
) -> Result<Vec<KnockoutTie>, ScheduleError> {
    if teams.len() < 2 {
        return Err(ScheduleError::InsufficientTeams {
            required: 2,
            got: teams.len(),
        });
    }
    let size = teams.len().next_power_of_two();
    let calendar = Calendar::from_params(params, size.trailing_zeros())?;
    let byes = size - teams.len();
    let (seeded, drawn) = teams.split_at(byes);

    let first_round = seeded
        .iter()
        .map(|t| (t, None))
        .chain(drawn.chunks_exact(2).map(|pair| (&pair[0], Some(&pair[1]))));

    let mut ties: Vec<KnockoutTie> = first_round
        .enumerate()
        .map(|(position, (home, away))| KnockoutTie {
            round_number: 1,
            round_name: round_name(size),
            kickoff: calendar.kickoff(1, position),
            home: Some(home.id),
            away: away.map(|t| t.id),
            venue: Some(home.venue.clone()),
        })
        .collect();

    let mut remaining = size / 2;
    let mut round_number = 2;
    while remaining >= 2 {
        for position in 0..remaining / 2 {
            ties.push(KnockoutTie {
                round_number,
                round_name: round_name(remaining),
                kickoff: calendar.kickoff(round_number, position),
                home: None,
                away: None,
                venue: None,
            });
        }
        remaining /= 2;
        round_number += 1;
    }

    log::debug!(
        "Generated knockout bracket: {} teams, bracket of {}, {} byes",
        teams.len(),
        size,
        byes
    );
    Ok(ties)
}
