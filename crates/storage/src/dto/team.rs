use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Player, Team};
use crate::services::average_score;
use crate::services::captain_election::CandidateTally;
use crate::services::team_allocation::{ManualTeam, Seeding};
use crate::services::team_rebalancing::{Swap, SwapStrategy};
use crate::services::RankedPlayer;

/// Request payload for automatic team formation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenerateTeamsRequest {
    #[validate(range(min = 2, max = 64, message = "Team count must be between 2 and 64"))]
    pub team_count: usize,

    #[serde(default)]
    pub seeding: Seeding,

    /// Remove the competition's current teams first.
    #[serde(default = "default_replace_existing")]
    pub replace_existing: bool,
}

/// Request payload for an administrator-defined team layout
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ManualTeamsRequest {
    #[validate(length(min = 1, message = "At least one team is required"))]
    pub teams: Vec<ManualTeam>,

    #[serde(default = "default_replace_existing")]
    pub replace_existing: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RebalanceTeamRequest {
    #[serde(default)]
    pub strategy: SwapStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaptainVoteRequest {
    pub voter_id: Uuid,
    pub candidate_id: Uuid,
}

fn default_replace_existing() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamMember {
    pub player_id: Uuid,
    pub name: String,
    pub proficiency_score: i32,
    pub is_captain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team_id: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    pub score: i32,
    pub max_score: i32,
    pub captain_id: Option<Uuid>,
    pub members: Vec<TeamMember>,
    pub average_score: f64,
}

impl TeamResponse {
    /// Builds the response from a team and the players it lists. Unknown ids are skipped.
    pub fn from_team(team: Team, players: &[Player]) -> Self {
        let members: Vec<TeamMember> = team
            .member_ids
            .iter()
            .filter_map(|id| players.iter().find(|p| p.player_id == *id))
            .map(|p| TeamMember {
                player_id: p.player_id,
                name: p.name.clone(),
                proficiency_score: p.proficiency_score,
                is_captain: team.is_captain(p.player_id),
            })
            .collect();

        let ranked: Vec<RankedPlayer> = members
            .iter()
            .map(|m| RankedPlayer::new(m.player_id, m.proficiency_score))
            .collect();

        Self {
            team_id: team.team_id,
            competition_id: team.competition_id,
            name: team.name,
            score: team.score,
            max_score: team.max_score,
            captain_id: team.captain_id,
            average_score: average_score(&ranked),
            members,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RebalanceResponse {
    pub competition_id: Uuid,
    pub swap_count: usize,
    pub swaps: Vec<Swap>,
    pub redistributed: bool,
    pub spread_before: f64,
    pub spread_after: f64,
    pub teams: Vec<TeamResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaptainElectionResponse {
    pub team_id: Uuid,
    pub captain_id: Option<Uuid>,
    pub tallies: Vec<CandidateTally>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, score: i32) -> Player {
        Player {
            player_id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            proficiency_score: score,
            created_at: Default::default(),
        }
    }

    #[test]
    fn test_team_response_lists_members_and_average() {
        let captain = player("ayesha", 80);
        let member = player("bilal", 40);
        let team = Team {
            team_id: Uuid::new_v4(),
            competition_id: Uuid::new_v4(),
            name: "Team 1".to_string(),
            score: 0,
            max_score: 0,
            captain_id: Some(captain.player_id),
            member_ids: vec![captain.player_id, member.player_id],
            created_at: Default::default(),
        };

        let response = TeamResponse::from_team(team, &[member.clone(), captain.clone()]);

        assert_eq!(response.members.len(), 2);
        assert_eq!(response.members[0].player_id, captain.player_id);
        assert!(response.members[0].is_captain);
        assert!(!response.members[1].is_captain);
        assert_eq!(response.average_score, 60.0);
    }

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateTeamsRequest = serde_json::from_str(r#"{ "team_count": 4 }"#).unwrap();
        assert_eq!(req.seeding, Seeding::Shuffle);
        assert!(req.replace_existing);
        assert!(req.validate().is_ok());

        let too_few: GenerateTeamsRequest =
            serde_json::from_str(r#"{ "team_count": 1, "seeding": "by_score" }"#).unwrap();
        assert_eq!(too_few.seeding, Seeding::ByScore);
        assert!(too_few.validate().is_err());
    }
}
