use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CaptainVote {
    pub team_id: Uuid,
    pub voter_id: Uuid,
    pub candidate_id: Uuid,
    pub cast_at: chrono::NaiveDateTime,
}
