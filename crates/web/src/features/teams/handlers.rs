use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rand::{SeedableRng, rngs::StdRng};
use storage::{
    Database,
    dto::team::{
        CaptainElectionResponse, CaptainVoteRequest, GenerateTeamsRequest, ManualTeamsRequest,
        RebalanceResponse, RebalanceTeamRequest, TeamResponse,
    },
    models::CaptainVote,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/teams",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    responses(
        (status = 200, description = "Teams of the competition", body = Vec<TeamResponse>),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Json<Vec<TeamResponse>>, WebError> {
    let teams = services::list_teams(db.pool(), competition_id).await?;

    Ok(Json(teams))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/teams/generate",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = GenerateTeamsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Teams created", body = Vec<TeamResponse>),
        (status = 400, description = "Too few teams or players"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn generate_teams(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<GenerateTeamsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let mut rng = StdRng::from_os_rng();
    let teams = services::generate_teams(db.pool(), competition_id, &req, &mut rng).await?;

    Ok((StatusCode::CREATED, Json(teams)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/teams/manual",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = ManualTeamsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Teams created", body = Vec<TeamResponse>),
        (status = 400, description = "Invalid team layout"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn create_manual_teams(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<ManualTeamsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let teams = services::create_manual_teams(db.pool(), competition_id, &req).await?;

    Ok((StatusCode::CREATED, Json(teams)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/teams/rebalance",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Teams rebalanced", body = RebalanceResponse),
        (status = 400, description = "Fewer than two teams"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn rebalance_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Json<RebalanceResponse>, WebError> {
    let response = services::rebalance_competition(db.pool(), competition_id).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/teams/{team_id}/rebalance",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    request_body = RebalanceTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team rebalanced", body = RebalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn rebalance_team(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RebalanceTeamRequest>,
) -> Result<Json<RebalanceResponse>, WebError> {
    let response =
        services::rebalance_team(db.pool(), competition_id, team_id, req.strategy).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/teams/{team_id}/captain-votes",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    request_body = CaptainVoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = CaptainVote),
        (status = 400, description = "Voter or candidate is not a member"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn cast_captain_vote(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CaptainVoteRequest>,
) -> Result<Response, WebError> {
    let vote = services::cast_captain_vote(
        db.pool(),
        competition_id,
        team_id,
        req.voter_id,
        req.candidate_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(vote)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/teams/{team_id}/captain/elect",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Votes tallied", body = CaptainElectionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn elect_captain(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CaptainElectionResponse>, WebError> {
    let response = services::elect_captain(db.pool(), competition_id, team_id).await?;

    Ok(Json(response))
}
