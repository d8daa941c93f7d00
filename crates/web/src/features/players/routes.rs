use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{list_players, override_proficiency, register_for_competition, register_player};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:player_id/proficiency", put(override_proficiency))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_players).post(register_player))
        .merge(protected)
}

/// Mounted under `/api/competitions`.
pub fn competition_routes() -> Router<Database> {
    Router::new().route("/:competition_id/registrations", post(register_for_competition))
}
