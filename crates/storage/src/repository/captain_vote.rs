use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::CaptainVote;

pub struct CaptainVoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CaptainVoteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Records a vote, replacing the voter's previous choice for this team.
    pub async fn cast(&self, team_id: Uuid, voter_id: Uuid, candidate_id: Uuid) -> Result<CaptainVote> {
        let vote = sqlx::query_as::<_, CaptainVote>(
            r#"
            INSERT INTO captain_votes (team_id, voter_id, candidate_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id, voter_id)
            DO UPDATE SET
                candidate_id = EXCLUDED.candidate_id,
                cast_at = CURRENT_TIMESTAMP
            RETURNING team_id, voter_id, candidate_id, cast_at
            "#,
        )
        .bind(team_id)
        .bind(voter_id)
        .bind(candidate_id)
        .fetch_one(self.pool)
        .await?;

        Ok(vote)
    }

    pub async fn list_for_team(&self, team_id: Uuid) -> Result<Vec<CaptainVote>> {
        let votes = sqlx::query_as::<_, CaptainVote>(
            "SELECT team_id, voter_id, candidate_id, cast_at FROM captain_votes WHERE team_id = $1",
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(votes)
    }
}
