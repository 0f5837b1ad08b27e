//! League fixture: round robin over all approved teams, optionally home and away.

use crate::models::{Leg, ScheduleError, ScheduleParameters, ScheduledMatch, Team};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Upper bound on `days_between_rounds`.
pub const MAX_DAYS_BETWEEN_ROUNDS: i64 = 30;

/// Validated slot times and round dates shared by every fixture format.
#[derive(Clone, Debug)]
pub(crate) struct Calendar {
    round_dates: Vec<NaiveDate>,
    first_slot: NaiveTime,
    second_slot: NaiveTime,
}

impl Calendar {
    /// Validate the parameters for a fixture of `rounds` rounds.
    ///
    /// Every round date is computed up front, so a fixture that would run past the last
    /// representable date fails here instead of partway through generation.
    pub(crate) fn from_params(params: &ScheduleParameters, rounds: u32) -> Result<Self, ScheduleError> {
        if params.days_between_rounds < 1 || params.days_between_rounds > MAX_DAYS_BETWEEN_ROUNDS {
            return Err(ScheduleError::InvalidParameter {
                name: "days_between_rounds",
                reason: format!(
                    "must be between 1 and {} (got {})",
                    MAX_DAYS_BETWEEN_ROUNDS, params.days_between_rounds
                ),
            });
        }
        let first_slot = parse_slot_time(&params.first_slot_time)?;
        let second_slot = parse_slot_time(&params.second_slot_time)?;

        let step = params.days_between_rounds as u64;
        let round_dates = (0..u64::from(rounds.max(1)))
            .map(|r| params.start_date.checked_add_days(Days::new(r * step)))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ScheduleError::InvalidParameter {
                name: "start_date",
                reason: format!(
                    "{} rounds from {} run past the last supported date",
                    rounds, params.start_date
                ),
            })?;

        Ok(Self {
            round_dates,
            first_slot,
            second_slot,
        })
    }

    /// Date of a 1-based round; rounds past the validated range reuse the last date.
    pub(crate) fn round_date(&self, round_number: u32) -> NaiveDate {
        let index = round_number.saturating_sub(1) as usize;
        self.round_dates
            .get(index)
            .or(self.round_dates.last())
            .copied()
            .unwrap_or(NaiveDate::MIN)
    }

    /// Even positions take the first slot, odd positions the second.
    pub(crate) fn slot(&self, position: usize) -> NaiveTime {
        if position % 2 == 0 {
            self.first_slot
        } else {
            self.second_slot
        }
    }

    pub(crate) fn kickoff(&self, round_number: u32, position: usize) -> NaiveDateTime {
        self.round_date(round_number).and_time(self.slot(position))
    }
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`.
pub fn parse_slot_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ScheduleError::InvalidTimeFormat(value.to_string()))
}

/// All unordered pairs `(i, j)` with `i < j`, in enumeration order.
pub(crate) fn pair_indices(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

/// Generate a league fixture.
///
/// 1. Enumerate every pair `(i, j)`, `i < j`; `teams[i]` is at home in the first leg.
/// 2. Slice the pairs, in order, into rounds of `floor(N/2)` matches.
/// 3. Inside a round, even positions kick off at the first slot, odd at the second.
/// 4. Round `r` is played on `start_date + (r - 1) * days_between_rounds`.
/// 5. With a return leg, the same pairs are replayed with home and away swapped,
///    continuing round numbers and dates.
///
/// Slicing does not guarantee that a team plays at most once per round for every N.
pub fn generate_league(
    teams: &[Team],
    params: &ScheduleParameters,
) -> Result<Vec<ScheduledMatch>, ScheduleError> {
    if teams.len() < 2 {
        return Err(ScheduleError::InsufficientTeams {
            required: 2,
            got: teams.len(),
        });
    }
    let per_round = teams.len() / 2;
    let pairs = pair_indices(teams.len());
    let first_leg_rounds = pairs.len().div_ceil(per_round) as u32;
    let legs: &[Leg] = if params.include_return_leg {
        &[Leg::FirstLeg, Leg::ReturnLeg]
    } else {
        &[Leg::FirstLeg]
    };
    let calendar = Calendar::from_params(params, first_leg_rounds * legs.len() as u32)?;

    let mut matches = Vec::with_capacity(pairs.len() * 2);

    for (leg_index, &leg) in legs.iter().enumerate() {
        let round_offset = leg_index as u32 * first_leg_rounds;
        for (chunk_index, chunk) in pairs.chunks(per_round).enumerate() {
            let round_number = round_offset + chunk_index as u32 + 1;
            for (position, &(i, j)) in chunk.iter().enumerate() {
                let (home, away) = match leg {
                    Leg::FirstLeg => (&teams[i], &teams[j]),
                    Leg::ReturnLeg => (&teams[j], &teams[i]),
                };
                matches.push(ScheduledMatch {
                    home_team_id: home.id,
                    away_team_id: away.id,
                    kickoff: calendar.kickoff(round_number, position),
                    venue: home.venue.clone(),
                    round_number,
                    leg,
                    group: None,
                });
            }
        }
    }

    log::debug!(
        "Generated league fixture: {} teams, {} matches, {} rounds",
        teams.len(),
        matches.len(),
        first_leg_rounds * legs.len() as u32
    );
    Ok(matches)
}
