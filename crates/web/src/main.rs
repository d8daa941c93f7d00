use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use features::{competitions, players, scores, teams};
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        competitions::handlers::list_competitions,
        competitions::handlers::get_active_competition,
        competitions::handlers::get_competition,
        competitions::handlers::create_competition,
        competitions::handlers::update_competition_status,
        competitions::handlers::activate_competition,
        players::handlers::list_players,
        players::handlers::register_player,
        players::handlers::register_for_competition,
        players::handlers::override_proficiency,
        scores::handlers::submit_self_score,
        scores::handlers::submit_peer_rating,
        scores::handlers::get_score_summary,
        scores::handlers::generate_scores,
        teams::handlers::list_teams,
        teams::handlers::generate_teams,
        teams::handlers::create_manual_teams,
        teams::handlers::rebalance_competition,
        teams::handlers::rebalance_team,
        teams::handlers::cast_captain_vote,
        teams::handlers::elect_captain,
    ),
    components(
        schemas(
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::UpdateCompetitionStatusRequest,
            storage::dto::competition::CompetitionResponse,
            storage::dto::player::RegisterPlayerRequest,
            storage::dto::player::CompetitionRegistrationRequest,
            storage::dto::player::ProficiencyOverrideRequest,
            storage::dto::player::PlayerResponse,
            storage::dto::score::SubmitSelfScoreRequest,
            storage::dto::score::SubmitPeerRatingRequest,
            storage::dto::score::RatingSubmissionResponse,
            storage::dto::score::GenerateScoresResponse,
            storage::dto::team::GenerateTeamsRequest,
            storage::dto::team::ManualTeamsRequest,
            storage::dto::team::RebalanceTeamRequest,
            storage::dto::team::CaptainVoteRequest,
            storage::dto::team::TeamMember,
            storage::dto::team::TeamResponse,
            storage::dto::team::RebalanceResponse,
            storage::dto::team::CaptainElectionResponse,
            storage::dto::common::PaginationMeta,
            storage::models::CompetitionStatus,
            storage::models::CaptainVote,
            storage::services::RankedPlayer,
            storage::services::score_aggregation::ScoreSummary,
            storage::services::team_allocation::Seeding,
            storage::services::team_allocation::ManualTeam,
            storage::services::team_rebalancing::Swap,
            storage::services::team_rebalancing::SwapStrategy,
            storage::services::captain_election::CandidateTally,
        )
    ),
    tags(
        (name = "competitions", description = "Competition lifecycle endpoints"),
        (name = "players", description = "Player registration endpoints"),
        (name = "scores", description = "Self-score, peer rating and proficiency endpoints"),
        (name = "teams", description = "Team formation, balancing and captain endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Malik of The Year API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("No API keys configured, admin endpoints will reject every request");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let app = Router::new()
        .nest("/api", features::api_routes(api_keys))
        .with_state(db)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
