use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "competition_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    Inactive,
    Upcoming,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: Uuid,
    pub name: String,
    pub year: i32,
    pub status: CompetitionStatus,
    pub created_at: chrono::NaiveDateTime,
}
