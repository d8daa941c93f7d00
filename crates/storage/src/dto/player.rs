use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Player;

/// Request payload for signing up a new player
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterPlayerRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

/// Request payload for entering a player into a competition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionRegistrationRequest {
    pub player_id: Uuid,
}

/// Manual proficiency override by an administrator
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProficiencyOverrideRequest {
    #[validate(range(min = 0, max = 100, message = "Proficiency must be between 0 and 100"))]
    pub proficiency_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerResponse {
    pub player_id: Uuid,
    pub name: String,
    pub proficiency_score: i32,
    pub created_at: NaiveDateTime,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            player_id: player.player_id,
            name: player.name,
            proficiency_score: player.proficiency_score,
            created_at: player.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_email() {
        let req = RegisterPlayerRequest {
            name: "Malik".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_proficiency_override_range() {
        assert!(
            ProficiencyOverrideRequest {
                proficiency_score: 100
            }
            .validate()
            .is_ok()
        );
        assert!(
            ProficiencyOverrideRequest {
                proficiency_score: 101
            }
            .validate()
            .is_err()
        );
    }
}
