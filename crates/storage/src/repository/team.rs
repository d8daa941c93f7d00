use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Team;
use crate::unit_of_work::TEAM_COLUMNS;

pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_competition(&self, competition_id: Uuid) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE competition_id = $1 ORDER BY created_at, name"
        ))
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    pub async fn find(&self, competition_id: Uuid, team_id: Uuid) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE competition_id = $1 AND team_id = $2"
        ))
        .bind(competition_id)
        .bind(team_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(team)
    }

    /// Sets the captain; the player must already be on the team.
    pub async fn set_captain(&self, team_id: Uuid, captain_id: Uuid) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            r#"
            UPDATE teams
            SET captain_id = $2
            WHERE team_id = $1 AND $2 = ANY(member_ids)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(team_id)
        .bind(captain_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            StorageError::Validation(format!("Player {captain_id} is not a member of team {team_id}"))
        })?;

        Ok(team)
    }
}
