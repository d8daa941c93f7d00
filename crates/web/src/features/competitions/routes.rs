use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{
    activate_competition, create_competition, get_active_competition, get_competition,
    list_competitions, update_competition_status,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(create_competition))
        .route("/:competition_id/status", put(update_competition_status))
        .route("/:competition_id/activate", post(activate_competition))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_competitions))
        .route("/active", get(get_active_competition))
        .route("/:competition_id", get(get_competition))
        .merge(protected)
}
