//! HTTP service exposing the rail_core calculation tools.
//!
//! One POST endpoint per tool plus a health probe. The service is
//! stateless: every request is validated, calculated, and answered in one
//! pass, so any number of instances can run behind a balancer.

use axum::routing::{get, post};

mod handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let app = axum::Router::new()
        .route("/health", get(handlers::health))
        .route("/braking/calculate", post(handlers::braking))
        .route("/hydraulic/calculate", post(handlers::hydraulic))
        .route("/axle-load/calculate", post(handlers::axle_load))
        .route(
            "/load-distribution/calculate",
            post(handlers::load_distribution),
        )
        .route(
            "/tractive-effort/calculate",
            post(handlers::tractive_effort),
        )
        .route(
            "/vehicle-performance/calculate",
            post(handlers::vehicle_performance),
        );

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
