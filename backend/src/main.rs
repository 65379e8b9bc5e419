use axum::{
    Router,
    routing::{delete, get, post, put},
};
use axum::http::{HeaderValue, Method};
use chrono::Utc;
use proximity::{AppState, Config, handlers, utils};
use std::time::Duration;
use tokio::time;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let state = AppState::new(config.clone());

    spawn_stale_sweep(state.clone());

    let port = config.port;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors_layer = create_cors_layer();

    Router::new()
        .route("/health", get(health_check))
        // Position reporting
        .route("/api/positions", post(handlers::report_position))
        .route("/api/positions/{user_id}", delete(handlers::remove_position))
        // Profiles
        .route("/api/profiles", put(handlers::upsert_profile))
        // Discovery feed
        .route("/api/discover", post(handlers::discover))
        // Connection lifecycle
        .route("/api/interests", post(handlers::send_interest))
        .route(
            "/api/connections/{connection_id}/resolve",
            post(handlers::resolve_interest),
        )
        .route("/api/connections/{user_id}", get(handlers::list_connections))
        // Crossed-paths history
        .route(
            "/api/history/{user_id}",
            get(handlers::list_crossed_paths).delete(handlers::clear_crossed_paths),
        )
        .layer(cors_layer)
        .with_state(state)
}

/// Periodic removal of positions whose owner went silent. Runs on its own
/// task so a sweep never sits in the path of a request.
fn spawn_stale_sweep(state: AppState) {
    let interval_secs = state.config.sweep_interval_secs;
    let ttl = state.config.position_ttl();

    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(interval_secs.max(1)));
        let mut iter_count: usize = 0;

        loop {
            interval.tick().await;
            iter_count += 1;

            let removed = state.geo.expire_stale(Utc::now(), ttl);
            if removed > 0 {
                tracing::info!("Sweep {} removed {} stale positions", iter_count, removed);
            } else if iter_count % 10 == 0 {
                tracing::debug!(
                    "Sweep {} found nothing stale ({} active)",
                    iter_count,
                    state.geo.active_count()
                );
            }
        }
    });
}

fn create_cors_layer() -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    // Check if ALLOWED_ORIGINS environment variable is set for multiple domains
    if let Ok(cors_origins) = std::env::var("ALLOWED_ORIGINS") {
        let origins: Vec<HeaderValue> = cors_origins
            .split(',')
            .filter_map(|origin| {
                let trimmed = origin.trim();
                if !trimmed.is_empty() {
                    trimmed.parse().ok()
                } else {
                    None
                }
            })
            .collect();

        if !origins.is_empty() {
            cors = cors.allow_origin(origins);
        } else {
            // Fallback to permissive if parsing fails
            cors = cors.allow_origin(Any);
        }
    } else {
        // Default to permissive for development
        cors = cors.allow_origin(Any);
    }

    cors
}

async fn health_check() -> &'static str {
    "OK"
}
