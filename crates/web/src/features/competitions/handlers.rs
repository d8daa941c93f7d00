use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::competition::{
        CompetitionResponse, CreateCompetitionRequest, UpdateCompetitionStatusRequest,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "List all competitions successfully", body = Vec<CompetitionResponse>)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(
    State(db): State<Database>,
) -> Result<Json<Vec<CompetitionResponse>>, WebError> {
    let competitions = services::list_competitions(db.pool()).await?;

    let response: Vec<CompetitionResponse> = competitions
        .into_iter()
        .map(CompetitionResponse::from)
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    responses(
        (status = 200, description = "Competition found", body = CompetitionResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let competition = services::get_competition(db.pool(), competition_id).await?;

    Ok(Json(CompetitionResponse::from(competition)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/active",
    responses(
        (status = 200, description = "The active competition, or null when none is active", body = Option<CompetitionResponse>)
    ),
    tag = "competitions"
)]
pub async fn get_active_competition(
    State(db): State<Database>,
) -> Result<Json<Option<CompetitionResponse>>, WebError> {
    let competition = services::get_active_competition(db.pool()).await?;

    Ok(Json(competition.map(CompetitionResponse::from)))
}

#[utoipa::path(
    post,
    path = "/api/competitions",
    request_body = CreateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created successfully", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(db): State<Database>,
    Json(req): Json<CreateCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competition = services::create_competition(db.pool(), &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::from(competition)),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}/status",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = UpdateCompetitionStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition status updated", body = CompetitionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn update_competition_status(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<UpdateCompetitionStatusRequest>,
) -> Result<Response, WebError> {
    let updated = services::update_status(db.pool(), competition_id, req.status).await?;

    Ok(Json(CompetitionResponse::from(updated)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/activate",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition is now the active one", body = CompetitionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn activate_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let competition = services::activate(db.pool(), competition_id).await?;

    Ok(Json(CompetitionResponse::from(competition)).into_response())
}
