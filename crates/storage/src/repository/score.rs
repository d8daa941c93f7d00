use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{PeerRating, SelfScore};

const SELF_SCORE_COLUMNS: &str = "self_score_id, competition_id, player_id, ratings, submitted_at";
const PEER_RATING_COLUMNS: &str =
    "peer_rating_id, competition_id, rater_id, rated_player_id, ratings, submitted_at";

pub struct ScoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_self_score(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
        ratings: &Value,
    ) -> Result<SelfScore> {
        let score = sqlx::query_as::<_, SelfScore>(&format!(
            r#"
            INSERT INTO self_scores (competition_id, player_id, ratings)
            VALUES ($1, $2, $3)
            ON CONFLICT (competition_id, player_id)
            DO UPDATE SET
                ratings = EXCLUDED.ratings,
                submitted_at = CURRENT_TIMESTAMP
            RETURNING {SELF_SCORE_COLUMNS}
            "#
        ))
        .bind(competition_id)
        .bind(player_id)
        .bind(Json(ratings))
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).with_constraint_message("Unknown competition or player"))?;

        Ok(score)
    }

    pub async fn upsert_peer_rating(
        &self,
        competition_id: Uuid,
        rater_id: Uuid,
        rated_player_id: Uuid,
        ratings: &Value,
    ) -> Result<PeerRating> {
        let rating = sqlx::query_as::<_, PeerRating>(&format!(
            r#"
            INSERT INTO peer_ratings (competition_id, rater_id, rated_player_id, ratings)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (competition_id, rater_id, rated_player_id)
            DO UPDATE SET
                ratings = EXCLUDED.ratings,
                submitted_at = CURRENT_TIMESTAMP
            RETURNING {PEER_RATING_COLUMNS}
            "#
        ))
        .bind(competition_id)
        .bind(rater_id)
        .bind(rated_player_id)
        .bind(Json(ratings))
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).with_constraint_message("Unknown competition or player"))?;

        Ok(rating)
    }

    pub async fn list_self_scores(&self, competition_id: Uuid) -> Result<Vec<SelfScore>> {
        let scores = sqlx::query_as::<_, SelfScore>(&format!(
            "SELECT {SELF_SCORE_COLUMNS} FROM self_scores WHERE competition_id = $1"
        ))
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }

    pub async fn list_peer_ratings(&self, competition_id: Uuid) -> Result<Vec<PeerRating>> {
        let ratings = sqlx::query_as::<_, PeerRating>(&format!(
            "SELECT {PEER_RATING_COLUMNS} FROM peer_ratings WHERE competition_id = $1"
        ))
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ratings)
    }

    pub async fn self_scores_for_player(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
    ) -> Result<Vec<SelfScore>> {
        let scores = sqlx::query_as::<_, SelfScore>(&format!(
            "SELECT {SELF_SCORE_COLUMNS} FROM self_scores WHERE competition_id = $1 AND player_id = $2"
        ))
        .bind(competition_id)
        .bind(player_id)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }

    pub async fn peer_ratings_for_player(
        &self,
        competition_id: Uuid,
        rated_player_id: Uuid,
    ) -> Result<Vec<PeerRating>> {
        let ratings = sqlx::query_as::<_, PeerRating>(&format!(
            r#"
            SELECT {PEER_RATING_COLUMNS} FROM peer_ratings
            WHERE competition_id = $1 AND rated_player_id = $2
            "#
        ))
        .bind(competition_id)
        .bind(rated_player_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ratings)
    }
}
