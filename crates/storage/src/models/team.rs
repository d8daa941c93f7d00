use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    pub score: i32,
    pub max_score: i32,
    pub captain_id: Option<Uuid>,
    pub member_ids: Vec<Uuid>,
    pub created_at: chrono::NaiveDateTime,
}

impl Team {
    pub fn has_member(&self, player_id: Uuid) -> bool {
        self.member_ids.contains(&player_id)
    }

    pub fn is_captain(&self, player_id: Uuid) -> bool {
        self.captain_id == Some(player_id)
    }
}
