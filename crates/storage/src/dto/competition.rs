use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Competition, CompetitionStatus};

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,

    #[serde(default = "default_status")]
    pub status: CompetitionStatus,
}

/// Request payload for moving a competition to another status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCompetitionStatusRequest {
    pub status: CompetitionStatus,
}

/// Response containing competition details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub competition_id: Uuid,
    pub name: String,
    pub year: i32,
    pub status: CompetitionStatus,
    pub created_at: chrono::NaiveDateTime,
}

fn default_status() -> CompetitionStatus {
    CompetitionStatus::Inactive
}

impl From<Competition> for CompetitionResponse {
    fn from(comp: Competition) -> Self {
        Self {
            competition_id: comp.competition_id,
            name: comp.name,
            year: comp.year,
            status: comp.status,
            created_at: comp.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_inactive() {
        let req: CreateCompetitionRequest =
            serde_json::from_str(r#"{ "name": "Malik of The Year", "year": 2025 }"#).unwrap();
        assert_eq!(req.status, CompetitionStatus::Inactive);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_name() {
        let req = CreateCompetitionRequest {
            name: String::new(),
            year: 2025,
            status: CompetitionStatus::Upcoming,
        };
        assert!(req.validate().is_err());
    }
}
