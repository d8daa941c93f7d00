use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::competition::CreateCompetitionRequest;
use crate::error::{Result, StorageError};
use crate::models::{Competition, CompetitionStatus};

const COMPETITION_COLUMNS: &str = "competition_id, name, year, status, created_at";

/// Repository for Competition database operations
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    /// Create a new CompetitionRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all competitions, newest first
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions ORDER BY year DESC, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    /// Get a competition by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// The competition currently marked active, if any
    pub async fn find_active(&self) -> Result<Option<Competition>> {
        let competition = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE status = 'active' LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(competition)
    }

    /// Create a new competition. Creating it as active goes through [`Self::activate`].
    pub async fn create(&self, req: &CreateCompetitionRequest) -> Result<Competition> {
        let initial_status = match req.status {
            CompetitionStatus::Active => CompetitionStatus::Inactive,
            other => other,
        };

        let competition = sqlx::query_as::<_, Competition>(&format!(
            r#"
            INSERT INTO competitions (name, year, status)
            VALUES ($1, $2, $3)
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(&req.name)
        .bind(req.year)
        .bind(initial_status)
        .fetch_one(self.pool)
        .await?;

        if req.status == CompetitionStatus::Active {
            return self.activate(competition.competition_id).await;
        }

        Ok(competition)
    }

    /// Move a competition to a new status
    pub async fn update_status(&self, id: Uuid, status: CompetitionStatus) -> Result<Competition> {
        if status == CompetitionStatus::Active {
            return self.activate(id).await;
        }

        let competition = sqlx::query_as::<_, Competition>(&format!(
            r#"
            UPDATE competitions
            SET status = $2
            WHERE competition_id = $1
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// Mark a competition active, demoting whichever competition held that status.
    ///
    /// The current active row is locked for the duration of the transaction so
    /// two activations cannot both succeed.
    pub async fn activate(&self, id: Uuid) -> Result<Competition> {
        let mut tx = self.pool.begin().await?;

        let previous: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT competition_id FROM competitions
            WHERE status = 'active' AND competition_id <> $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        if !previous.is_empty() {
            sqlx::query("UPDATE competitions SET status = 'inactive' WHERE competition_id = ANY($1)")
                .bind(&previous)
                .execute(&mut *tx)
                .await?;
        }

        let competition = sqlx::query_as::<_, Competition>(&format!(
            r#"
            UPDATE competitions
            SET status = 'active'
            WHERE competition_id = $1
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        tx.commit().await?;

        info!(competition_id = %id, demoted = previous.len(), "Competition activated");
        Ok(competition)
    }
}
