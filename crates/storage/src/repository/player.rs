use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::dto::player::RegisterPlayerRequest;
use crate::error::{Result, StorageError};
use crate::models::{DEFAULT_PROFICIENCY, Player};

const PLAYER_COLUMNS: &str = "player_id, name, email, proficiency_score, created_at";

pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List players by name, one page at a time
    pub async fn list(&self, params: &PaginationParams) -> Result<(Vec<Player>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(self.pool)
            .await?;

        let players = sqlx::query_as::<_, Player>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY name, created_at LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((players, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(player)
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(players)
    }

    pub async fn create(&self, req: &RegisterPlayerRequest) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            r#"
            INSERT INTO players (name, email, proficiency_score)
            VALUES ($1, $2, $3)
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(&req.name)
        .bind(req.email.to_lowercase())
        .bind(DEFAULT_PROFICIENCY)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).with_constraint_message("Email already registered"))?;

        Ok(player)
    }

    /// Enter a player into a competition. Registering twice is a no-op.
    pub async fn register_for_competition(&self, competition_id: Uuid, player_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO competition_registrations (competition_id, player_id)
            VALUES ($1, $2)
            ON CONFLICT (competition_id, player_id) DO NOTHING
            "#,
        )
        .bind(competition_id)
        .bind(player_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).with_constraint_message("Unknown competition or player")
        })?;

        Ok(())
    }

    /// Players registered for a competition, in registration order
    pub async fn list_registered(&self, competition_id: Uuid) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT p.player_id, p.name, p.email, p.proficiency_score, p.created_at
            FROM players p
            INNER JOIN competition_registrations r ON r.player_id = p.player_id
            WHERE r.competition_id = $1
            ORDER BY r.registered_at, p.player_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(players)
    }

    pub async fn registered_ids(&self, competition_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT player_id FROM competition_registrations WHERE competition_id = $1",
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    pub async fn is_registered(&self, competition_id: Uuid, player_id: Uuid) -> Result<bool> {
        let registered: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM competition_registrations
                WHERE competition_id = $1 AND player_id = $2
            )
            "#,
        )
        .bind(competition_id)
        .bind(player_id)
        .fetch_one(self.pool)
        .await?;

        Ok(registered)
    }

    /// The player's team within one competition, if they have been placed on one
    pub async fn team_in_competition(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<Uuid>> {
        let team_id: Option<Option<Uuid>> = sqlx::query_scalar(
            r#"
            SELECT team_id FROM competition_registrations
            WHERE competition_id = $1 AND player_id = $2
            "#,
        )
        .bind(competition_id)
        .bind(player_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(team_id.flatten())
    }

    /// Manual proficiency override
    pub async fn set_proficiency(&self, player_id: Uuid, score: i32) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            r#"
            UPDATE players
            SET proficiency_score = $2
            WHERE player_id = $1
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(player_id)
        .bind(score)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(player)
    }

    /// Writes many proficiency scores in one transaction. Returns the number of rows touched.
    pub async fn update_proficiency_scores(&self, scores: &[(Uuid, i32)]) -> Result<u64> {
        if scores.is_empty() {
            return Ok(0);
        }

        let (ids, values): (Vec<Uuid>, Vec<i32>) = scores.iter().copied().unzip();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE players AS p
            SET proficiency_score = s.score
            FROM UNNEST($1::uuid[], $2::int4[]) AS s(player_id, score)
            WHERE p.player_id = s.player_id
            "#,
        )
        .bind(&ids)
        .bind(&values)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
