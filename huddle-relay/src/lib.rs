//! Websocket relay that groups participants and forwards their signaling
//! frames to one another.

pub mod config;
pub mod group;
pub mod signaling;

pub use config::RelayConfig;
pub use group::GroupManager;
pub use signaling::{RouteError, SignalingService, ice_servers_handler, ws_handler};

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// `GET /signaling/{group_id}` upgrades to a member socket,
/// `GET /ice-servers` lists the advertised ICE servers.
pub fn router(service: SignalingService) -> Router {
    // Browser clients are served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/signaling/{group_id}", get(ws_handler))
        .route("/ice-servers", get(ice_servers_handler))
        .layer(cors)
        .with_state(service)
}

pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    serve_on(listener, config).await
}

/// Runs the relay on an already bound listener.
pub async fn serve_on(listener: TcpListener, config: RelayConfig) -> anyhow::Result<()> {
    let service = SignalingService::new(config.ice_servers);
    info!("Signaling relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service)).await?;
    Ok(())
}
