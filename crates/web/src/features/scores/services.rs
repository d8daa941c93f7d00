use sqlx::PgPool;
use storage::{
    dto::score::{
        GenerateScoresResponse, RatingSubmissionResponse, SubmitPeerRatingRequest,
        SubmitSelfScoreRequest,
    },
    error::{Result, StorageError},
    repository::{
        competition::CompetitionRepository, player::PlayerRepository, score::ScoreRepository,
    },
    services::score_aggregation::{self, ScoreSummary},
};
use tracing::info;
use uuid::Uuid;

async fn ensure_registered(pool: &PgPool, competition_id: Uuid, player_id: Uuid) -> Result<()> {
    if PlayerRepository::new(pool)
        .is_registered(competition_id, player_id)
        .await?
    {
        Ok(())
    } else {
        Err(StorageError::Validation(format!(
            "Player {player_id} is not registered for competition {competition_id}"
        )))
    }
}

/// Store or replace a player's self-assessment
pub async fn submit_self_score(
    pool: &PgPool,
    competition_id: Uuid,
    request: &SubmitSelfScoreRequest,
) -> Result<RatingSubmissionResponse> {
    ensure_registered(pool, competition_id, request.player_id).await?;

    let repo = ScoreRepository::new(pool);
    let stored = repo
        .upsert_self_score(competition_id, request.player_id, &request.ratings)
        .await?;

    Ok(RatingSubmissionResponse {
        competition_id,
        player_id: stored.player_id,
        accepted_ratings: score_aggregation::extract_ratings(&stored.ratings),
    })
}

/// Store or replace one teammate's rating of another
pub async fn submit_peer_rating(
    pool: &PgPool,
    competition_id: Uuid,
    request: &SubmitPeerRatingRequest,
) -> Result<RatingSubmissionResponse> {
    score_aggregation::check_peer_rating(request.rater_id, request.rated_player_id, None, None)
        .map_err(|e| StorageError::Validation(e.to_string()))?;

    ensure_registered(pool, competition_id, request.rater_id).await?;
    ensure_registered(pool, competition_id, request.rated_player_id).await?;

    let players = PlayerRepository::new(pool);
    let rater_team = players
        .team_in_competition(competition_id, request.rater_id)
        .await?;
    let rated_team = players
        .team_in_competition(competition_id, request.rated_player_id)
        .await?;
    score_aggregation::check_peer_rating(
        request.rater_id,
        request.rated_player_id,
        rater_team,
        rated_team,
    )
    .map_err(|e| StorageError::Validation(e.to_string()))?;

    let repo = ScoreRepository::new(pool);
    let stored = repo
        .upsert_peer_rating(
            competition_id,
            request.rater_id,
            request.rated_player_id,
            &request.ratings,
        )
        .await?;

    Ok(RatingSubmissionResponse {
        competition_id,
        player_id: stored.rated_player_id,
        accepted_ratings: score_aggregation::extract_ratings(&stored.ratings),
    })
}

/// Breakdown of how a player's proficiency would be computed right now
pub async fn score_summary(
    pool: &PgPool,
    competition_id: Uuid,
    player_id: Uuid,
) -> Result<ScoreSummary> {
    ensure_registered(pool, competition_id, player_id).await?;

    let repo = ScoreRepository::new(pool);
    let self_scores = repo.self_scores_for_player(competition_id, player_id).await?;
    let peer_ratings = repo
        .peer_ratings_for_player(competition_id, player_id)
        .await?;

    let summary = score_aggregation::aggregate_scores(&[player_id], &self_scores, &peer_ratings)
        .into_iter()
        .next()
        .ok_or(StorageError::NotFound)?;

    Ok(summary)
}

/// Recompute and persist the proficiency score of every registered player
pub async fn generate_scores(pool: &PgPool, competition_id: Uuid) -> Result<GenerateScoresResponse> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let roster: Vec<Uuid> = PlayerRepository::new(pool)
        .list_registered(competition_id)
        .await?
        .into_iter()
        .map(|p| p.player_id)
        .collect();

    let repo = ScoreRepository::new(pool);
    let self_scores = repo.list_self_scores(competition_id).await?;
    let peer_ratings = repo.list_peer_ratings(competition_id).await?;

    let scores = score_aggregation::aggregate_scores(&roster, &self_scores, &peer_ratings);
    let updates: Vec<(Uuid, i32)> = scores
        .iter()
        .map(|s| (s.player_id, s.proficiency_score))
        .collect();

    let updated = PlayerRepository::new(pool)
        .update_proficiency_scores(&updates)
        .await?;

    info!(
        %competition_id,
        players = roster.len(),
        updated,
        "Proficiency scores generated"
    );

    Ok(GenerateScoresResponse {
        competition_id,
        updated_count: updated as usize,
        scores,
    })
}
