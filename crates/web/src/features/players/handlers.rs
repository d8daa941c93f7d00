use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        player::{
            CompetitionRegistrationRequest, PlayerResponse, ProficiencyOverrideRequest,
            RegisterPlayerRequest,
        },
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/players",
    params(PaginationParams),
    responses(
        (status = 200, description = "Players retrieved successfully", body = PaginatedResponse<PlayerResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "players"
)]
pub async fn list_players(
    State(db): State<Database>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let response = services::list_players(db.pool(), &params).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players",
    request_body = RegisterPlayerRequest,
    responses(
        (status = 201, description = "Player registered", body = PlayerResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "players"
)]
pub async fn register_player(
    State(db): State<Database>,
    Json(req): Json<RegisterPlayerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let player = services::register_player(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(PlayerResponse::from(player))).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/registrations",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = CompetitionRegistrationRequest,
    responses(
        (status = 201, description = "Player entered the competition", body = PlayerResponse),
        (status = 404, description = "Competition or player not found")
    ),
    tag = "players"
)]
pub async fn register_for_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<CompetitionRegistrationRequest>,
) -> Result<Response, WebError> {
    let player =
        services::register_for_competition(db.pool(), competition_id, req.player_id).await?;

    Ok((StatusCode::CREATED, Json(PlayerResponse::from(player))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/players/{player_id}/proficiency",
    params(
        ("player_id" = Uuid, Path, description = "Player ID")
    ),
    request_body = ProficiencyOverrideRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Proficiency updated", body = PlayerResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn override_proficiency(
    State(db): State<Database>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<ProficiencyOverrideRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let player =
        services::override_proficiency(db.pool(), player_id, req.proficiency_score).await?;

    Ok(Json(PlayerResponse::from(player)).into_response())
}
