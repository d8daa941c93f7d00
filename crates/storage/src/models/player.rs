use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Proficiency assigned to players nobody has rated yet.
pub const DEFAULT_PROFICIENCY: i32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Player {
    pub player_id: Uuid,
    pub name: String,
    pub email: String,
    pub proficiency_score: i32,
    pub created_at: chrono::NaiveDateTime,
}
