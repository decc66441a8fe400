//! Bomberweb - Static frontend serving binary

use axum::{
    Router,
    body::Body,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bomber::{Config, GameConfig};
use rust_embed::RustEmbed;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Embedded static assets from client/web
#[derive(RustEmbed)]
#[folder = "../client/web"]
struct Assets;

const INJECT_POINT: &str = "// BOMBER_TARGET_INJECT_POINT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Bomberweb - Frontend Static Server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  Game server: {}", config.game.url());
    info!("  Reconnect: {}", config.game.reconnect);

    let target = Arc::new(target_script(&config.game)?);

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/index.html", get(serve_index))
        .fallback(move |uri: Uri| static_handler(uri, target.clone()))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr: SocketAddr = format!("{}:{}", config.web.bind, config.web.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Frontend server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Script line defining `window.BOMBER_TARGET` for the client.
fn target_script(game: &GameConfig) -> anyhow::Result<String> {
    Ok(format!(
        "window.BOMBER_TARGET = {}; // Auto-injected by bomberweb",
        serde_json::to_string(game)?
    ))
}

async fn serve_index() -> Response {
    serve_static_file("index.html", None)
}

async fn static_handler(uri: Uri, target: Arc<String>) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return serve_static_file("index.html", None);
    }
    serve_static_file(path, Some(&target))
}

/// Serve a static file from embedded assets; `main.js` gets the target injected.
fn serve_static_file(path: &str, target: Option<&str>) -> Response {
    let Some(content) = Assets::get(path) else {
        warn!("Static file not found: {}", path);
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let body = match (path, target, std::str::from_utf8(&content.data)) {
        ("main.js", Some(target), Ok(script)) => Body::from(script.replacen(INJECT_POINT, target, 1)),
        _ => Body::from(content.data.to_vec()),
    };

    ([(header::CONTENT_TYPE, mime.as_ref().to_string())], body).into_response()
}
