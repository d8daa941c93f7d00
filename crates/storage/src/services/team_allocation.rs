use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{BalancingError, RankedPlayer};

/// Smallest team the allocator will produce.
pub const MIN_PLAYERS_PER_TEAM: usize = 2;

/// How the player pool is ordered before the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// Uniform random order, so no one is systematically drafted first.
    #[default]
    Shuffle,
    /// Strongest first.
    ByScore,
}

pub fn validate_pool(player_count: usize, team_count: usize) -> Result<(), BalancingError> {
    if team_count < 2 {
        return Err(BalancingError::TooFewTeams {
            requested: team_count,
        });
    }
    if player_count < team_count * MIN_PLAYERS_PER_TEAM {
        return Err(BalancingError::NotEnoughPlayers {
            players: player_count,
            teams: team_count,
        });
    }
    Ok(())
}

/// Team index for every draft pick, bouncing between the first and last team.
///
/// The walk reverses at each bound, so the bound team picks twice in a row:
/// `0, 1, 2, 2, 1, 0, 0, 1, ...` for three teams.
pub fn serpentine_order(player_count: usize, team_count: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(player_count);
    if team_count == 0 {
        return order;
    }

    let mut index = 0usize;
    let mut forward = true;
    for _ in 0..player_count {
        order.push(index);
        if forward {
            if index + 1 == team_count {
                forward = false;
            } else {
                index += 1;
            }
        } else if index == 0 {
            forward = true;
        } else {
            index -= 1;
        }
    }
    order
}

/// Team index for every pick when dealing whole rounds, reversing the
/// direction after each complete round.
pub fn round_robin_order(player_count: usize, team_count: usize) -> Vec<usize> {
    if team_count == 0 {
        return Vec::new();
    }
    (0..player_count)
        .map(|pick| {
            let round = pick / team_count;
            let position = pick % team_count;
            if round % 2 == 0 {
                position
            } else {
                team_count - 1 - position
            }
        })
        .collect()
}

/// Sorts strongest first; equal scores keep their incoming order.
pub fn rank_by_score(players: &mut [RankedPlayer]) {
    players.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Splits the pool into `team_count` teams with a serpentine draft.
pub fn allocate_teams<R: Rng + ?Sized>(
    mut players: Vec<RankedPlayer>,
    team_count: usize,
    seeding: Seeding,
    rng: &mut R,
) -> Result<Vec<Vec<RankedPlayer>>, BalancingError> {
    validate_pool(players.len(), team_count)?;

    match seeding {
        Seeding::Shuffle => players.shuffle(rng),
        Seeding::ByScore => rank_by_score(&mut players),
    }

    let mut teams: Vec<Vec<RankedPlayer>> = vec![Vec::new(); team_count];
    let order = serpentine_order(players.len(), team_count);
    for (player, team_index) in players.into_iter().zip(order) {
        teams[team_index].push(player);
    }

    Ok(teams)
}

/// Default display name for the `index`-th generated team.
pub fn team_name(index: usize) -> String {
    format!("Team {}", index + 1)
}

/// A team layout chosen by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ManualTeam {
    pub name: String,
    pub player_ids: Vec<Uuid>,
    pub captain_id: Option<Uuid>,
}

pub fn validate_manual_allocation(
    teams: &[ManualTeam],
    registered: &HashSet<Uuid>,
) -> Result<(), BalancingError> {
    if teams.is_empty() {
        return Err(BalancingError::NoTeams);
    }

    let mut seen = HashSet::new();
    for team in teams {
        for &player_id in &team.player_ids {
            if !registered.contains(&player_id) {
                return Err(BalancingError::UnregisteredPlayer(player_id));
            }
            if !seen.insert(player_id) {
                return Err(BalancingError::DuplicatePlayer(player_id));
            }
        }

        if let Some(captain) = team.captain_id
            && !team.player_ids.contains(&captain)
        {
            return Err(BalancingError::CaptainNotMember {
                team: team.name.clone(),
                captain,
            });
        }
    }

    Ok(())
}
