use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A player's assessment of themselves for one competition.
///
/// `ratings` is kept as raw JSON: a list of values, a category map (optionally
/// with an `overall` entry) or a single number, all on a 1–5 scale.
#[derive(Debug, Clone, FromRow)]
pub struct SelfScore {
    pub self_score_id: Uuid,
    pub competition_id: Uuid,
    pub player_id: Uuid,
    pub ratings: Json<Value>,
    pub submitted_at: chrono::NaiveDateTime,
}

/// A teammate's assessment of `rated_player_id`, same payload shape as [`SelfScore`].
#[derive(Debug, Clone, FromRow)]
pub struct PeerRating {
    pub peer_rating_id: Uuid,
    pub competition_id: Uuid,
    pub rater_id: Uuid,
    pub rated_player_id: Uuid,
    pub ratings: Json<Value>,
    pub submitted_at: chrono::NaiveDateTime,
}
