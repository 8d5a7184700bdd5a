use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub const HEALTH_BODY: &str = "OK";

/// `GET /` answers `200 OK` with body `OK`; every other path is 404.
pub fn build_router() -> Router {
    Router::new()
        .route("/", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    HEALTH_BODY
}

/// Bind `0.0.0.0:{port}` and serve until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    serve_on(listener).await
}

/// Serve on a pre-bound listener so callers can bind port 0 and read the
/// actual port first.
pub async fn serve_on(listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();
    tracing::info!(port, "health server listening");
    axum::serve(listener, build_router()).await?;
    Ok(())
}
