pub mod config;
pub mod connection;
pub mod dispatch;
pub mod state;
pub mod ws;

pub use config::HubConfig;
pub use state::Hub;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Builds the hub's router: the WebSocket route plus a liveness probe, over
/// shared `Hub` state.
pub fn build_router(hub: Hub) -> Router {
    Router::new()
        .route("/", get(ws::upgrade))
        .route("/healthz", get(healthz))
        .with_state(hub)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}
