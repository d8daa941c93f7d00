use sqlx::PgPool;
use storage::{
    dto::competition::CreateCompetitionRequest,
    error::Result,
    models::{Competition, CompetitionStatus},
    repository::competition::CompetitionRepository,
};
use uuid::Uuid;

/// List all competitions
pub async fn list_competitions(pool: &PgPool) -> Result<Vec<Competition>> {
    let repo = CompetitionRepository::new(pool);
    repo.list().await
}

/// Get competition by ID
pub async fn get_competition(pool: &PgPool, competition_id: Uuid) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.find_by_id(competition_id).await
}

/// The competition currently running, if any
pub async fn get_active_competition(pool: &PgPool) -> Result<Option<Competition>> {
    let repo = CompetitionRepository::new(pool);
    repo.find_active().await
}

/// Create a new competition
pub async fn create_competition(
    pool: &PgPool,
    request: &CreateCompetitionRequest,
) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    let competition = repo.create(request).await?;
    tracing::info!(competition_id = %competition.competition_id, "Competition created");
    Ok(competition)
}

/// Change a competition's status
pub async fn update_status(
    pool: &PgPool,
    competition_id: Uuid,
    status: CompetitionStatus,
) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.update_status(competition_id, status).await
}

/// Make a competition the single active one
pub async fn activate(pool: &PgPool, competition_id: Uuid) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.activate(competition_id).await
}
