use axum::{
    Router, middleware,
    routing::{get, post},
};
use storage::Database;

use super::handlers::{
    cast_captain_vote, create_manual_teams, elect_captain, generate_teams, list_teams,
    rebalance_competition, rebalance_team,
};
use crate::middleware::auth::{ApiKeys, require_auth};

/// Mounted under `/api/competitions`.
pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:competition_id/teams/generate", post(generate_teams))
        .route("/:competition_id/teams/manual", post(create_manual_teams))
        .route("/:competition_id/teams/rebalance", post(rebalance_competition))
        .route(
            "/:competition_id/teams/:team_id/rebalance",
            post(rebalance_team),
        )
        .route(
            "/:competition_id/teams/:team_id/captain/elect",
            post(elect_captain),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:competition_id/teams", get(list_teams))
        .route(
            "/:competition_id/teams/:team_id/captain-votes",
            post(cast_captain_vote),
        )
        .merge(protected)
}
