use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use super::team_allocation::{rank_by_score, round_robin_order, validate_pool};
use super::{BalancingError, BalancingOptions, RankedPlayer, ReassignmentGuard, average_score};

/// In-memory view of one team for rebalancing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamRoster {
    pub team_id: Uuid,
    pub captain_id: Option<Uuid>,
    pub members: Vec<RankedPlayer>,
}

impl TeamRoster {
    pub fn average(&self) -> f64 {
        average_score(&self.members)
    }

    fn total(&self) -> i64 {
        self.members.iter().map(|p| i64::from(p.score)).sum()
    }

    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.iter().map(|p| p.player_id).collect()
    }
}

/// Two players trading places: `player_a` leaves `team_a` for `team_b`, `player_b` the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Swap {
    pub player_a: Uuid,
    pub team_a: Uuid,
    pub player_b: Uuid,
    pub team_b: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RebalanceOutcome {
    pub teams: Vec<TeamRoster>,
    pub swaps: Vec<Swap>,
    /// True when members were dealt out from scratch before the balance pass.
    pub redistributed: bool,
    pub spread_before: f64,
    pub spread_after: f64,
}

/// How a single-team rebalance picks its swap partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SwapStrategy {
    /// Keep the team average as close as possible to where it started.
    #[default]
    Balanced,
    /// Take the strongest available replacement.
    Strengthen,
    /// Take the weakest available replacement.
    Weaken,
}

/// Gap between the highest and lowest average among non-empty teams.
pub fn spread(teams: &[TeamRoster]) -> f64 {
    match extreme_teams(teams) {
        Some((high, low)) => teams[high].average() - teams[low].average(),
        None => 0.0,
    }
}

/// Indices of the highest- and lowest-average non-empty teams. First one wins ties.
fn extreme_teams(teams: &[TeamRoster]) -> Option<(usize, usize)> {
    let mut high: Option<usize> = None;
    let mut low: Option<usize> = None;

    for (index, team) in teams.iter().enumerate() {
        if team.members.is_empty() {
            continue;
        }
        let average = team.average();
        if high.is_none_or(|h| average > teams[h].average()) {
            high = Some(index);
        }
        if low.is_none_or(|l| average < teams[l].average()) {
            low = Some(index);
        }
    }

    high.zip(low)
}

fn apply_swap(
    teams: &mut [TeamRoster],
    team_a: usize,
    index_a: usize,
    team_b: usize,
    index_b: usize,
) -> Swap {
    let player_a = teams[team_a].members[index_a];
    let player_b = teams[team_b].members[index_b];
    teams[team_a].members[index_a] = player_b;
    teams[team_b].members[index_b] = player_a;

    Swap {
        player_a: player_a.player_id,
        team_a: teams[team_a].team_id,
        player_b: player_b.player_id,
        team_b: teams[team_b].team_id,
    }
}

/// Best swap between the `high` and `low` teams, if any narrows their gap
/// without widening the overall spread.
fn best_pair_swap<G: ReassignmentGuard + ?Sized>(
    teams: &[TeamRoster],
    high: usize,
    low: usize,
    guard: &G,
) -> Option<(usize, usize)> {
    let high_team = &teams[high];
    let low_team = &teams[low];
    let current_gap = high_team.average() - low_team.average();
    let current_spread = spread(teams);

    let (others_max, others_min) = teams
        .iter()
        .enumerate()
        .filter(|(i, t)| *i != high && *i != low && !t.members.is_empty())
        .map(|(_, t)| t.average())
        .fold((f64::NEG_INFINITY, f64::INFINITY), |(max, min), avg| {
            (max.max(avg), min.min(avg))
        });

    let high_total = high_team.total() as f64;
    let low_total = low_team.total() as f64;
    let high_len = high_team.members.len() as f64;
    let low_len = low_team.members.len() as f64;

    let mut best: Option<(usize, usize, f64)> = None;
    for (i, outgoing) in high_team.members.iter().enumerate() {
        if guard.is_protected(outgoing.player_id) {
            continue;
        }
        for (j, incoming) in low_team.members.iter().enumerate() {
            if guard.is_protected(incoming.player_id) {
                continue;
            }

            let delta = f64::from(incoming.score - outgoing.score);
            let new_high = (high_total + delta) / high_len;
            let new_low = (low_total - delta) / low_len;
            let gap = (new_high - new_low).abs();
            if gap >= current_gap {
                continue;
            }

            let new_spread = others_max.max(new_high).max(new_low)
                - others_min.min(new_high).min(new_low);
            if new_spread > current_spread {
                continue;
            }

            if best.is_none_or(|(_, _, best_gap)| gap < best_gap) {
                best = Some((i, j, gap));
            }
        }
    }

    best.map(|(i, j, _)| (i, j))
}

/// Bounded hill-climb between the strongest and weakest team.
///
/// Runs at most `options.max_rounds` rounds and stops early once the gap is
/// below `options.convergence_threshold`. The spread never grows.
pub fn balance_pass<G: ReassignmentGuard + ?Sized>(
    teams: &mut [TeamRoster],
    guard: &G,
    options: &BalancingOptions,
) -> Vec<Swap> {
    let mut swaps = Vec::new();

    for round in 0..options.max_rounds {
        let Some((high, low)) = extreme_teams(teams) else {
            break;
        };
        let gap = teams[high].average() - teams[low].average();
        if high == low || gap < options.convergence_threshold {
            debug!(round, gap, "Team averages converged");
            break;
        }

        match best_pair_swap(teams, high, low, guard) {
            Some((i, j)) => {
                let swap = apply_swap(teams, high, i, low, j);
                debug!(round, ?swap, "Applied balancing swap");
                swaps.push(swap);
            }
            None => debug!(round, gap, "No improving swap found"),
        }
    }

    swaps
}

/// Deals the pool out again, keeping protected members where they are.
///
/// Protected members stay on their current team as seeds; everyone else in
/// `pool` is ranked by score and dealt round by round, alternating direction.
pub fn redistribute<G: ReassignmentGuard + ?Sized>(
    teams: &[TeamRoster],
    pool: &[RankedPlayer],
    guard: &G,
) -> Vec<TeamRoster> {
    let mut seeded: Vec<TeamRoster> = teams
        .iter()
        .map(|team| TeamRoster {
            team_id: team.team_id,
            captain_id: team.captain_id,
            members: team
                .members
                .iter()
                .copied()
                .filter(|m| guard.is_protected(m.player_id))
                .collect(),
        })
        .collect();

    let kept: HashSet<Uuid> = seeded
        .iter()
        .flat_map(|t| t.members.iter().map(|m| m.player_id))
        .collect();

    let mut remaining: Vec<RankedPlayer> = pool
        .iter()
        .copied()
        .filter(|p| !kept.contains(&p.player_id))
        .collect();
    rank_by_score(&mut remaining);

    let order = round_robin_order(remaining.len(), seeded.len());
    for (player, team_index) in remaining.into_iter().zip(order) {
        seeded[team_index].members.push(player);
    }

    seeded
}

/// Rebalances every team of a competition.
///
/// Competitions whose teams only hold protected members get a full
/// redistribution of `pool` first, subject to the same pool size rules as
/// the allocator. The balance pass always runs afterwards.
pub fn rebalance_competition<G: ReassignmentGuard + ?Sized>(
    teams: Vec<TeamRoster>,
    pool: &[RankedPlayer],
    guard: &G,
    options: &BalancingOptions,
) -> Result<RebalanceOutcome, BalancingError> {
    if teams.len() < 2 {
        return Err(BalancingError::TooFewTeams {
            requested: teams.len(),
        });
    }

    let spread_before = spread(&teams);
    let has_assignments = teams
        .iter()
        .any(|t| t.members.iter().any(|m| !guard.is_protected(m.player_id)));

    let mut teams = if has_assignments {
        teams
    } else {
        validate_pool(pool.len(), teams.len())?;
        redistribute(&teams, pool, guard)
    };

    let swaps = balance_pass(&mut teams, guard, options);
    let spread_after = spread(&teams);

    Ok(RebalanceOutcome {
        teams,
        swaps,
        redistributed: !has_assignments,
        spread_before,
        spread_after,
    })
}

/// Swaps members of one team against the rest of the competition.
///
/// Unprotected members of the target team are visited from weakest to
/// strongest. Each is traded for the unprotected player on another team that
/// best fits `strategy`; nobody moves twice and at most
/// `options.max_single_team_swaps` trades happen.
pub fn rebalance_team<G: ReassignmentGuard + ?Sized>(
    mut teams: Vec<TeamRoster>,
    target_team_id: Uuid,
    strategy: SwapStrategy,
    guard: &G,
    options: &BalancingOptions,
) -> Result<RebalanceOutcome, BalancingError> {
    let target = teams
        .iter()
        .position(|t| t.team_id == target_team_id)
        .ok_or(BalancingError::UnknownTeam(target_team_id))?;

    let spread_before = spread(&teams);
    let target_average = teams[target].average();

    let mut candidates_for_swap: Vec<RankedPlayer> = teams[target]
        .members
        .iter()
        .copied()
        .filter(|m| !guard.is_protected(m.player_id))
        .collect();
    candidates_for_swap.sort_by_key(|m| m.score);

    let mut moved: HashSet<Uuid> = HashSet::new();
    let mut swaps = Vec::new();

    for member in candidates_for_swap {
        if swaps.len() >= options.max_single_team_swaps {
            break;
        }
        let Some(member_index) = teams[target]
            .members
            .iter()
            .position(|m| m.player_id == member.player_id)
        else {
            continue;
        };

        let team_total = teams[target].total() as f64;
        let team_len = teams[target].members.len() as f64;

        let mut best: Option<(usize, usize, f64)> = None;
        for (team_index, team) in teams.iter().enumerate() {
            if team_index == target {
                continue;
            }
            for (candidate_index, candidate) in team.members.iter().enumerate() {
                if guard.is_protected(candidate.player_id)
                    || moved.contains(&candidate.player_id)
                    || candidate.score == member.score
                {
                    continue;
                }

                let new_average =
                    (team_total - f64::from(member.score) + f64::from(candidate.score)) / team_len;
                let key = match strategy {
                    SwapStrategy::Balanced => (new_average - target_average).abs(),
                    SwapStrategy::Strengthen if candidate.score > member.score => -new_average,
                    SwapStrategy::Weaken if candidate.score < member.score => new_average,
                    _ => continue,
                };

                if best.is_none_or(|(_, _, best_key)| key < best_key) {
                    best = Some((team_index, candidate_index, key));
                }
            }
        }

        if let Some((team_index, candidate_index, _)) = best {
            let swap = apply_swap(&mut teams, target, member_index, team_index, candidate_index);
            moved.insert(swap.player_a);
            moved.insert(swap.player_b);
            debug!(?swap, ?strategy, "Applied single-team swap");
            swaps.push(swap);
        }
    }

    let spread_after = spread(&teams);
    Ok(RebalanceOutcome {
        teams,
        swaps,
        redistributed: false,
        spread_before,
        spread_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CaptainGuard;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn player(score: i32) -> RankedPlayer {
        RankedPlayer::new(Uuid::new_v4(), score)
    }

    fn roster(captain: Option<RankedPlayer>, others: &[RankedPlayer]) -> TeamRoster {
        let mut members: Vec<RankedPlayer> = captain.into_iter().collect();
        members.extend_from_slice(others);
        TeamRoster {
            team_id: Uuid::new_v4(),
            captain_id: captain.map(|c| c.player_id),
            members,
        }
    }

    fn guard_for(teams: &[TeamRoster]) -> CaptainGuard {
        CaptainGuard::new(teams.iter().filter_map(|t| t.captain_id))
    }

    fn ids(team: &TeamRoster) -> HashSet<Uuid> {
        team.members.iter().map(|m| m.player_id).collect()
    }

    #[test]
    fn test_single_team_scenario_skips_captain() {
        let p1 = player(90);
        let p2 = player(10);
        let p3 = player(50);
        let p4 = player(50);
        let teams = vec![roster(Some(p1), &[p2]), roster(Some(p3), &[p4])];
        let team_a = teams[0].team_id;
        let guard = guard_for(&teams);

        let outcome = rebalance_team(
            teams,
            team_a,
            SwapStrategy::Balanced,
            &guard,
            &BalancingOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.swaps.len(), 1);
        assert_eq!(ids(&outcome.teams[0]), HashSet::from([p1.player_id, p4.player_id]));
        assert_eq!(ids(&outcome.teams[1]), HashSet::from([p3.player_id, p2.player_id]));
    }

    #[test]
    fn test_single_team_never_moves_best_fitting_captain() {
        let a1 = player(60);
        let a2 = player(40);
        let b1 = player(45);
        let b2 = player(90);
        let teams = vec![roster(Some(a1), &[a2]), roster(Some(b1), &[b2])];
        let team_a = teams[0].team_id;
        let guard = guard_for(&teams);

        let outcome = rebalance_team(
            teams,
            team_a,
            SwapStrategy::Balanced,
            &guard,
            &BalancingOptions::default(),
        )
        .unwrap();

        assert!(ids(&outcome.teams[1]).contains(&b1.player_id));
        assert!(ids(&outcome.teams[0]).contains(&a1.player_id));
        assert_eq!(outcome.swaps[0].player_b, b2.player_id);
    }

    #[test]
    fn test_single_team_limits_swaps() {
        let teams = vec![
            roster(None, &[player(10), player(20), player(30), player(40)]),
            roster(None, &[player(60), player(70), player(80), player(90)]),
        ];
        let target = teams[0].team_id;

        let outcome = rebalance_team(
            teams,
            target,
            SwapStrategy::Strengthen,
            &|_: Uuid| false,
            &BalancingOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.swaps.len(), 2);
        let moved: HashSet<Uuid> = outcome
            .swaps
            .iter()
            .flat_map(|s| [s.player_a, s.player_b])
            .collect();
        assert_eq!(moved.len(), 4);
    }

    #[test]
    fn test_single_team_strengthen_and_weaken_direction() {
        let weak = player(10);
        let strong = player(90);
        let teams = vec![
            roster(None, &[weak, player(50)]),
            roster(None, &[player(30), strong]),
        ];
        let target = teams[0].team_id;

        let strengthened = rebalance_team(
            teams.clone(),
            target,
            SwapStrategy::Strengthen,
            &|_: Uuid| false,
            &BalancingOptions::default(),
        )
        .unwrap();
        assert_eq!(strengthened.swaps[0].player_a, weak.player_id);
        assert_eq!(strengthened.swaps[0].player_b, strong.player_id);

        let weakened = rebalance_team(
            teams,
            target,
            SwapStrategy::Weaken,
            &|_: Uuid| false,
            &BalancingOptions::default(),
        )
        .unwrap();
        assert!(
            weakened
                .swaps
                .iter()
                .all(|s| s.player_a != weak.player_id)
        );
        assert!(weakened.teams[0].average() <= 30.0);
    }

    #[test]
    fn test_single_team_skips_equal_score_swaps() {
        let cap_a = player(90);
        let member = player(50);
        let cap_b = player(10);
        let twin = player(50);
        let teams = vec![roster(Some(cap_a), &[member]), roster(Some(cap_b), &[twin])];
        let target = teams[0].team_id;
        let guard = guard_for(&teams);
        let before = teams.clone();

        for strategy in [
            SwapStrategy::Balanced,
            SwapStrategy::Strengthen,
            SwapStrategy::Weaken,
        ] {
            let outcome = rebalance_team(
                teams.clone(),
                target,
                strategy,
                &guard,
                &BalancingOptions::default(),
            )
            .unwrap();

            assert!(outcome.swaps.is_empty(), "{strategy:?} swapped equal scores");
            assert_eq!(outcome.teams, before);
        }
    }

    #[test]
    fn test_single_team_unknown_team() {
        let teams = vec![roster(None, &[player(10)]), roster(None, &[player(20)])];
        let missing = Uuid::new_v4();
        let err = rebalance_team(
            teams,
            missing,
            SwapStrategy::Balanced,
            &|_: Uuid| false,
            &BalancingOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, BalancingError::UnknownTeam(missing));
    }

    #[test]
    fn test_balance_pass_finds_even_split() {
        let mut teams = vec![
            roster(None, &[player(90), player(80)]),
            roster(None, &[player(20), player(10)]),
        ];

        let swaps = balance_pass(&mut teams, &|_: Uuid| false, &BalancingOptions::default());

        assert_eq!(swaps.len(), 1);
        assert_eq!(spread(&teams), 0.0);
    }

    #[test]
    fn test_balance_pass_keeps_captains() {
        let cap_a = player(90);
        let cap_b = player(20);
        let mut teams = vec![
            roster(Some(cap_a), &[player(80)]),
            roster(Some(cap_b), &[player(10)]),
        ];
        let guard = guard_for(&teams);

        balance_pass(&mut teams, &guard, &BalancingOptions::default());

        assert!(ids(&teams[0]).contains(&cap_a.player_id));
        assert!(ids(&teams[1]).contains(&cap_b.player_id));
        assert_eq!(spread(&teams), 0.0);
    }

    #[test]
    fn test_balance_pass_stops_when_converged() {
        let mut teams = vec![
            roster(None, &[player(52), player(50)]),
            roster(None, &[player(49), player(50)]),
        ];
        let before = teams.clone();

        let swaps = balance_pass(&mut teams, &|_: Uuid| false, &BalancingOptions::default());

        assert!(swaps.is_empty());
        assert_eq!(teams, before);
    }

    #[test]
    fn test_balance_pass_is_bounded_and_never_widens_spread() {
        let mut rng = StdRng::seed_from_u64(2024);
        let options = BalancingOptions::default();

        for _ in 0..200 {
            let team_count = rng.random_range(2..6);
            let mut teams: Vec<TeamRoster> = (0..team_count)
                .map(|_| {
                    let size = rng.random_range(2..7);
                    let members: Vec<RankedPlayer> =
                        (0..size).map(|_| player(rng.random_range(0..=100))).collect();
                    let captain = if rng.random_bool(0.5) {
                        Some(members[0].player_id)
                    } else {
                        None
                    };
                    TeamRoster {
                        team_id: Uuid::new_v4(),
                        captain_id: captain,
                        members,
                    }
                })
                .collect();
            let guard = guard_for(&teams);
            let before = spread(&teams);

            let swaps = balance_pass(&mut teams, &guard, &options);

            assert!(swaps.len() <= options.max_rounds);
            assert!(spread(&teams) <= before + 1e-9);
            for swap in &swaps {
                assert!(!guard.is_protected(swap.player_a));
                assert!(!guard.is_protected(swap.player_b));
            }
        }
    }

    #[test]
    fn test_rebalance_competition_redistributes_captain_only_teams() {
        let cap_a = player(80);
        let cap_b = player(40);
        let others = [player(90), player(70), player(60), player(30), player(20), player(10)];
        let teams = vec![roster(Some(cap_a), &[]), roster(Some(cap_b), &[])];
        let guard = guard_for(&teams);

        let mut pool = vec![cap_a, cap_b];
        pool.extend_from_slice(&others);

        let outcome =
            rebalance_competition(teams, &pool, &guard, &BalancingOptions::default()).unwrap();

        assert!(outcome.redistributed);
        assert!(ids(&outcome.teams[0]).contains(&cap_a.player_id));
        assert!(ids(&outcome.teams[1]).contains(&cap_b.player_id));
        let total: usize = outcome.teams.iter().map(|t| t.members.len()).sum();
        assert_eq!(total, pool.len());
        assert!(outcome.spread_after < outcome.spread_before);
    }

    #[test]
    fn test_rebalance_competition_redistribution_needs_full_pool() {
        let cap_a = player(80);
        let cap_b = player(40);
        let extra = player(60);
        let teams = vec![roster(Some(cap_a), &[]), roster(Some(cap_b), &[])];
        let guard = guard_for(&teams);

        let err = rebalance_competition(
            teams,
            &[cap_a, cap_b, extra],
            &guard,
            &BalancingOptions::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            BalancingError::NotEnoughPlayers {
                players: 3,
                teams: 2
            }
        );
    }

    #[test]
    fn test_rebalance_competition_refines_existing_layout() {
        let teams = vec![
            roster(None, &[player(90), player(80)]),
            roster(None, &[player(20), player(10)]),
        ];

        let outcome =
            rebalance_competition(teams, &[], &|_: Uuid| false, &BalancingOptions::default())
                .unwrap();

        assert!(!outcome.redistributed);
        assert_eq!(outcome.spread_before, 70.0);
        assert_eq!(outcome.spread_after, 0.0);
    }

    #[test]
    fn test_rebalance_competition_needs_two_teams() {
        let teams = vec![roster(None, &[player(10), player(20)])];
        let err = rebalance_competition(teams, &[], &|_: Uuid| false, &BalancingOptions::default())
            .unwrap_err();
        assert_eq!(err, BalancingError::TooFewTeams { requested: 1 });
    }

    #[test]
    fn test_redistribute_deals_round_robin() {
        let teams = vec![roster(None, &[]), roster(None, &[])];
        let pool = [player(10), player(40), player(30), player(20)];

        let dealt = redistribute(&teams, &pool, &|_: Uuid| false);

        let scores: Vec<Vec<i32>> = dealt
            .iter()
            .map(|t| t.members.iter().map(|m| m.score).collect())
            .collect();
        assert_eq!(scores, vec![vec![40, 10], vec![30, 20]]);
    }
}
