use std::collections::{HashMap, HashSet};

use rand::Rng;
use sqlx::PgPool;
use storage::{
    dto::team::{
        CaptainElectionResponse, GenerateTeamsRequest, ManualTeamsRequest, RebalanceResponse,
        TeamResponse,
    },
    error::{Result, StorageError},
    models::{CaptainVote, Player, Team},
    repository::{
        captain_vote::CaptainVoteRepository, competition::CompetitionRepository,
        player::PlayerRepository, team::TeamRepository,
    },
    services::{
        BalancingOptions, CaptainGuard, RankedPlayer,
        captain_election::{self, Ballot},
        team_allocation,
        team_rebalancing::{self, RebalanceOutcome, SwapStrategy, TeamRoster},
    },
    unit_of_work::TeamAssignmentBatch,
};
use tracing::info;
use uuid::Uuid;

fn ranked(player: &Player) -> RankedPlayer {
    RankedPlayer::new(player.player_id, player.proficiency_score)
}

async fn team_responses(pool: &PgPool, teams: Vec<Team>) -> Result<Vec<TeamResponse>> {
    let member_ids: Vec<Uuid> = teams
        .iter()
        .flat_map(|t| t.member_ids.iter().copied())
        .collect();
    let players = PlayerRepository::new(pool).find_many(&member_ids).await?;

    Ok(teams
        .into_iter()
        .map(|team| TeamResponse::from_team(team, &players))
        .collect())
}

/// Registered players plus anyone already listed on a team, keyed by id.
async fn known_players(
    pool: &PgPool,
    competition_id: Uuid,
    teams: &[Team],
) -> Result<HashMap<Uuid, RankedPlayer>> {
    let players = PlayerRepository::new(pool);
    let mut known: HashMap<Uuid, RankedPlayer> = players
        .list_registered(competition_id)
        .await?
        .iter()
        .map(|p| (p.player_id, ranked(p)))
        .collect();

    let missing: Vec<Uuid> = teams
        .iter()
        .flat_map(|t| t.member_ids.iter().copied())
        .filter(|id| !known.contains_key(id))
        .collect();
    if !missing.is_empty() {
        for player in players.find_many(&missing).await? {
            known.insert(player.player_id, ranked(&player));
        }
    }

    Ok(known)
}

fn rosters(teams: &[Team], known: &HashMap<Uuid, RankedPlayer>) -> Vec<TeamRoster> {
    teams
        .iter()
        .map(|team| TeamRoster {
            team_id: team.team_id,
            captain_id: team.captain_id,
            members: team
                .member_ids
                .iter()
                .filter_map(|id| known.get(id).copied())
                .collect(),
        })
        .collect()
}

/// List the teams of a competition with their members
pub async fn list_teams(pool: &PgPool, competition_id: Uuid) -> Result<Vec<TeamResponse>> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let teams = TeamRepository::new(pool)
        .list_by_competition(competition_id)
        .await?;
    team_responses(pool, teams).await
}

/// Draft the registered players into `team_count` teams
pub async fn generate_teams<R: Rng + ?Sized>(
    pool: &PgPool,
    competition_id: Uuid,
    request: &GenerateTeamsRequest,
    rng: &mut R,
) -> Result<Vec<TeamResponse>> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let players: Vec<RankedPlayer> = PlayerRepository::new(pool)
        .list_registered(competition_id)
        .await?
        .iter()
        .map(ranked)
        .collect();
    let player_count = players.len();

    let drafted =
        team_allocation::allocate_teams(players, request.team_count, request.seeding, rng)?;

    let mut batch = TeamAssignmentBatch::new(competition_id);
    if request.replace_existing {
        batch.replace_existing_teams();
    }
    for (index, members) in drafted.iter().enumerate() {
        batch.create_team(
            team_allocation::team_name(index),
            None,
            members.iter().map(|m| m.player_id).collect(),
        );
    }

    let teams = batch.commit(pool).await?;
    info!(
        %competition_id,
        players = player_count,
        teams = teams.len(),
        seeding = ?request.seeding,
        "Teams generated"
    );

    team_responses(pool, teams).await
}

/// Persist an administrator-defined team layout
pub async fn create_manual_teams(
    pool: &PgPool,
    competition_id: Uuid,
    request: &ManualTeamsRequest,
) -> Result<Vec<TeamResponse>> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let registered = PlayerRepository::new(pool)
        .registered_ids(competition_id)
        .await?;
    team_allocation::validate_manual_allocation(&request.teams, &registered)?;

    let mut batch = TeamAssignmentBatch::new(competition_id);
    if request.replace_existing {
        batch.replace_existing_teams();
    }
    for team in &request.teams {
        batch.create_team(team.name.clone(), team.captain_id, team.player_ids.clone());
    }

    let teams = batch.commit(pool).await?;
    info!(%competition_id, teams = teams.len(), "Manual teams created");

    team_responses(pool, teams).await
}

async fn persist_outcome(
    pool: &PgPool,
    competition_id: Uuid,
    outcome: &RebalanceOutcome,
    changed: &HashSet<Uuid>,
) -> Result<()> {
    let mut batch = TeamAssignmentBatch::new(competition_id);
    for team in outcome
        .teams
        .iter()
        .filter(|t| changed.contains(&t.team_id))
    {
        batch.set_members(team.team_id, team.member_ids());
    }
    batch.commit(pool).await?;
    Ok(())
}

async fn rebalance_response(
    pool: &PgPool,
    competition_id: Uuid,
    outcome: RebalanceOutcome,
) -> Result<RebalanceResponse> {
    let teams = TeamRepository::new(pool)
        .list_by_competition(competition_id)
        .await?;

    Ok(RebalanceResponse {
        competition_id,
        swap_count: outcome.swaps.len(),
        redistributed: outcome.redistributed,
        spread_before: outcome.spread_before,
        spread_after: outcome.spread_after,
        swaps: outcome.swaps,
        teams: team_responses(pool, teams).await?,
    })
}

/// Even out team averages across the whole competition
pub async fn rebalance_competition(
    pool: &PgPool,
    competition_id: Uuid,
) -> Result<RebalanceResponse> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let teams = TeamRepository::new(pool)
        .list_by_competition(competition_id)
        .await?;
    let known = known_players(pool, competition_id, &teams).await?;
    let guard = CaptainGuard::new(teams.iter().filter_map(|t| t.captain_id));

    let mut player_pool: Vec<RankedPlayer> = known.values().copied().collect();
    player_pool.sort_by_key(|p| p.player_id);

    let outcome = team_rebalancing::rebalance_competition(
        rosters(&teams, &known),
        &player_pool,
        &guard,
        &BalancingOptions::default(),
    )?;

    let changed: HashSet<Uuid> = if outcome.redistributed {
        outcome.teams.iter().map(|t| t.team_id).collect()
    } else {
        outcome
            .swaps
            .iter()
            .flat_map(|s| [s.team_a, s.team_b])
            .collect()
    };
    if !changed.is_empty() {
        persist_outcome(pool, competition_id, &outcome, &changed).await?;
    }

    info!(
        %competition_id,
        swaps = outcome.swaps.len(),
        redistributed = outcome.redistributed,
        spread_before = outcome.spread_before,
        spread_after = outcome.spread_after,
        "Competition rebalanced"
    );

    rebalance_response(pool, competition_id, outcome).await
}

/// Trade members of one team with the rest of the competition
pub async fn rebalance_team(
    pool: &PgPool,
    competition_id: Uuid,
    team_id: Uuid,
    strategy: SwapStrategy,
) -> Result<RebalanceResponse> {
    let repo = TeamRepository::new(pool);
    repo.find(competition_id, team_id).await?;

    let teams = repo.list_by_competition(competition_id).await?;
    let known = known_players(pool, competition_id, &teams).await?;
    let guard = CaptainGuard::new(teams.iter().filter_map(|t| t.captain_id));

    let outcome = team_rebalancing::rebalance_team(
        rosters(&teams, &known),
        team_id,
        strategy,
        &guard,
        &BalancingOptions::default(),
    )?;

    let changed: HashSet<Uuid> = outcome
        .swaps
        .iter()
        .flat_map(|s| [s.team_a, s.team_b])
        .collect();
    if !changed.is_empty() {
        persist_outcome(pool, competition_id, &outcome, &changed).await?;
    }

    info!(
        %competition_id,
        %team_id,
        ?strategy,
        swaps = outcome.swaps.len(),
        "Team rebalanced"
    );

    rebalance_response(pool, competition_id, outcome).await
}

/// Record a member's vote for their team's captain
pub async fn cast_captain_vote(
    pool: &PgPool,
    competition_id: Uuid,
    team_id: Uuid,
    voter_id: Uuid,
    candidate_id: Uuid,
) -> Result<CaptainVote> {
    let team = TeamRepository::new(pool)
        .find(competition_id, team_id)
        .await?;

    if !team.has_member(voter_id) {
        return Err(StorageError::Validation(format!(
            "Voter {voter_id} is not a member of team {team_id}"
        )));
    }
    if !team.has_member(candidate_id) {
        return Err(StorageError::Validation(format!(
            "Candidate {candidate_id} is not a member of team {team_id}"
        )));
    }

    CaptainVoteRepository::new(pool)
        .cast(team_id, voter_id, candidate_id)
        .await
}

/// Count the votes and store the winner as captain
pub async fn elect_captain(
    pool: &PgPool,
    competition_id: Uuid,
    team_id: Uuid,
) -> Result<CaptainElectionResponse> {
    let repo = TeamRepository::new(pool);
    let team = repo.find(competition_id, team_id).await?;

    let members: Vec<RankedPlayer> = PlayerRepository::new(pool)
        .find_many(&team.member_ids)
        .await?
        .iter()
        .map(ranked)
        .collect();
    let ballots: Vec<Ballot> = CaptainVoteRepository::new(pool)
        .list_for_team(team_id)
        .await?
        .into_iter()
        .map(|v| Ballot {
            voter_id: v.voter_id,
            candidate_id: v.candidate_id,
        })
        .collect();

    let tallies = captain_election::tally_votes(&members, &ballots);
    let captain_id = match tallies.first() {
        Some(winner) if team.captain_id != Some(winner.candidate_id) => {
            let updated = repo.set_captain(team_id, winner.candidate_id).await?;
            info!(%team_id, captain_id = ?updated.captain_id, "Captain elected");
            updated.captain_id
        }
        _ => team.captain_id,
    };

    Ok(CaptainElectionResponse {
        team_id,
        captain_id,
        tallies,
    })
}
