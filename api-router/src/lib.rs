use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{liveness::live, readiness::ready, search::search_get, search::search_post};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes are public (for k8s/systemd); search is the one real endpoint,
    // accepting both a JSON body and query parameters.
    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .route("/search", post(search_post).get(search_get))
}
