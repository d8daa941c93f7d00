use sqlx::PgPool;
use storage::{
    dto::{
        common::{PaginatedResponse, PaginationParams},
        player::{PlayerResponse, RegisterPlayerRequest},
    },
    error::Result,
    models::Player,
    repository::{competition::CompetitionRepository, player::PlayerRepository},
};
use uuid::Uuid;

/// List players one page at a time
pub async fn list_players(
    pool: &PgPool,
    params: &PaginationParams,
) -> Result<PaginatedResponse<PlayerResponse>> {
    let repo = PlayerRepository::new(pool);
    let (players, total) = repo.list(params).await?;

    let data = players.into_iter().map(PlayerResponse::from).collect();
    Ok(PaginatedResponse::new(data, params, total))
}

/// Sign up a new player
pub async fn register_player(pool: &PgPool, request: &RegisterPlayerRequest) -> Result<Player> {
    let repo = PlayerRepository::new(pool);
    let player = repo.create(request).await?;
    tracing::info!(player_id = %player.player_id, "Player registered");
    Ok(player)
}

/// Enter a player into a competition
pub async fn register_for_competition(
    pool: &PgPool,
    competition_id: Uuid,
    player_id: Uuid,
) -> Result<Player> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let repo = PlayerRepository::new(pool);
    let player = repo.find_by_id(player_id).await?;
    repo.register_for_competition(competition_id, player_id)
        .await?;

    tracing::info!(%competition_id, %player_id, "Player entered competition");
    Ok(player)
}

/// Administrator override of a player's proficiency score
pub async fn override_proficiency(pool: &PgPool, player_id: Uuid, score: i32) -> Result<Player> {
    let repo = PlayerRepository::new(pool);
    let player = repo.set_proficiency(player_id, score).await?;
    tracing::info!(%player_id, score, "Proficiency overridden");
    Ok(player)
}
