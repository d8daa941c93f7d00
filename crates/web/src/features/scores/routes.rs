use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{generate_scores, get_score_summary, submit_peer_rating, submit_self_score};
use crate::middleware::auth::{ApiKeys, require_auth};

/// Mounted under `/api/competitions`.
pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:competition_id/scores/generate", post(generate_scores))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:competition_id/self-scores", put(submit_self_score))
        .route("/:competition_id/peer-ratings", put(submit_peer_rating))
        .route(
            "/:competition_id/players/:player_id/score-summary",
            get(get_score_summary),
        )
        .merge(protected)
}
