pub mod competitions;
pub mod players;
pub mod scores;
pub mod teams;

use axum::Router;
use storage::Database;

use crate::middleware::auth::ApiKeys;

pub fn api_routes(api_keys: ApiKeys) -> Router<Database> {
    let competitions = competitions::routes::routes(api_keys.clone())
        .merge(players::routes::competition_routes())
        .merge(scores::routes::routes(api_keys.clone()))
        .merge(teams::routes::routes(api_keys.clone()));

    Router::new()
        .nest("/competitions", competitions)
        .nest("/players", players::routes::routes(api_keys))
}
