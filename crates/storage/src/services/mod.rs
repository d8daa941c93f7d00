//! Side-effect free scoring and team balancing.
//!
//! Everything in here works on in-memory snapshots. Loading those snapshots and
//! writing results back is the job of [`crate::repository`] and
//! [`crate::unit_of_work`].

pub mod captain_election;
pub mod score_aggregation;
pub mod team_allocation;
pub mod team_rebalancing;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalancingError {
    #[error("At least 2 teams are required, got {requested}")]
    TooFewTeams { requested: usize },

    #[error("Not enough players: {players} players cannot fill {teams} teams with at least 2 members each")]
    NotEnoughPlayers { players: usize, teams: usize },

    #[error("Team {0} is not part of this competition")]
    UnknownTeam(Uuid),

    #[error("Player {0} is assigned to more than one team")]
    DuplicatePlayer(Uuid),

    #[error("Player {0} is not registered for this competition")]
    UnregisteredPlayer(Uuid),

    #[error("Captain {captain} is not a member of team {team}")]
    CaptainNotMember { team: String, captain: Uuid },

    #[error("No teams supplied")]
    NoTeams,
}

/// A player reduced to what the balancing algorithms look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RankedPlayer {
    pub player_id: Uuid,
    pub score: i32,
}

impl RankedPlayer {
    pub fn new(player_id: Uuid, score: i32) -> Self {
        Self { player_id, score }
    }
}

/// Decides whether a player may be moved between teams.
pub trait ReassignmentGuard {
    fn is_protected(&self, player_id: Uuid) -> bool;
}

impl<F> ReassignmentGuard for F
where
    F: Fn(Uuid) -> bool,
{
    fn is_protected(&self, player_id: Uuid) -> bool {
        self(player_id)
    }
}

/// Protects team captains from reassignment.
#[derive(Debug, Clone, Default)]
pub struct CaptainGuard {
    captains: HashSet<Uuid>,
}

impl CaptainGuard {
    pub fn new(captains: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            captains: captains.into_iter().collect(),
        }
    }
}

impl ReassignmentGuard for CaptainGuard {
    fn is_protected(&self, player_id: Uuid) -> bool {
        self.captains.contains(&player_id)
    }
}

/// Tunables for the rebalancing passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancingOptions {
    /// Upper bound on rounds of the iterative balance pass.
    pub max_rounds: usize,
    /// The pass stops once the highest and lowest team averages are closer than this.
    pub convergence_threshold: f64,
    /// Swaps allowed per single-team rebalance.
    pub max_single_team_swaps: usize,
}

impl Default for BalancingOptions {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            convergence_threshold: 5.0,
            max_single_team_swaps: 2,
        }
    }
}

/// Arithmetic mean of the members' scores, 0 for an empty team.
pub fn average_score(members: &[RankedPlayer]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let total: i64 = members.iter().map(|p| i64::from(p.score)).sum();
    total as f64 / members.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_score_empty_team() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn test_average_score() {
        let members = [
            RankedPlayer::new(Uuid::new_v4(), 90),
            RankedPlayer::new(Uuid::new_v4(), 10),
            RankedPlayer::new(Uuid::new_v4(), 50),
        ];
        assert_eq!(average_score(&members), 50.0);
    }

    #[test]
    fn test_closure_guard() {
        let captain = Uuid::new_v4();
        let guard = |id: Uuid| id == captain;
        assert!(guard.is_protected(captain));
        assert!(!guard.is_protected(Uuid::new_v4()));
    }

    #[test]
    fn test_captain_guard() {
        let captain = Uuid::new_v4();
        let guard = CaptainGuard::new([captain]);
        assert!(guard.is_protected(captain));
        assert!(!guard.is_protected(Uuid::new_v4()));
    }
}
