use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::score_aggregation::ScoreSummary;

/// A player's self-assessment. `ratings` is a list, a category map or a single value on a 1–5 scale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitSelfScoreRequest {
    pub player_id: Uuid,
    #[schema(value_type = Object)]
    pub ratings: Value,
}

/// A teammate's assessment of another player, same `ratings` shape as a self-score.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitPeerRatingRequest {
    pub rater_id: Uuid,
    pub rated_player_id: Uuid,
    #[schema(value_type = Object)]
    pub ratings: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingSubmissionResponse {
    pub competition_id: Uuid,
    pub player_id: Uuid,
    /// Ratings from the payload that will count towards the proficiency score.
    pub accepted_ratings: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateScoresResponse {
    pub competition_id: Uuid,
    pub updated_count: usize,
    pub scores: Vec<ScoreSummary>,
}
