use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::score::{
        GenerateScoresResponse, RatingSubmissionResponse, SubmitPeerRatingRequest,
        SubmitSelfScoreRequest,
    },
    services::score_aggregation::ScoreSummary,
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}/self-scores",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = SubmitSelfScoreRequest,
    responses(
        (status = 200, description = "Self-score stored", body = RatingSubmissionResponse),
        (status = 400, description = "Player not registered for the competition")
    ),
    tag = "scores"
)]
pub async fn submit_self_score(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<SubmitSelfScoreRequest>,
) -> Result<Response, WebError> {
    let response = services::submit_self_score(db.pool(), competition_id, &req).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}/peer-ratings",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = SubmitPeerRatingRequest,
    responses(
        (status = 200, description = "Peer rating stored", body = RatingSubmissionResponse),
        (status = 400, description = "Self-rating, unregistered player or not teammates"),
        (status = 404, description = "Player not found")
    ),
    tag = "scores"
)]
pub async fn submit_peer_rating(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<SubmitPeerRatingRequest>,
) -> Result<Response, WebError> {
    let response = services::submit_peer_rating(db.pool(), competition_id, &req).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/players/{player_id}/score-summary",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("player_id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Score breakdown", body = ScoreSummary),
        (status = 400, description = "Player not registered for the competition")
    ),
    tag = "scores"
)]
pub async fn get_score_summary(
    State(db): State<Database>,
    Path((competition_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ScoreSummary>, WebError> {
    let summary = services::score_summary(db.pool(), competition_id, player_id).await?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/scores/generate",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Proficiency scores recomputed", body = GenerateScoresResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "scores"
)]
pub async fn generate_scores(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Json<GenerateScoresResponse>, WebError> {
    let response = services::generate_scores(db.pool(), competition_id).await?;

    Ok(Json(response))
}
