//! API Routes
//!
//! Configures the Axum router with all sizing service endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    debug_handler, dirty_handler, health_handler, mesh_handler, override_handler, phase_handler,
    reset_all_handler, reset_handler, restore_handler, scale_handler, settings_handler,
    snapshot_handler, stat_handler, stats_handler, tick_handler, update_settings_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check with the current tick
/// - `PUT /tick` - Advance the tick counter
/// - `PUT /phase` - Enter or leave a load/save pass
/// - `POST /scale` - Size multiplier for an entity
/// - `POST /stat` - Scale a stat value by an entity's size
/// - `POST /mesh` - Scaled mesh handle for an entity
/// - `POST /debug` - Grow, shrink, reset or re-roll an entity's size
/// - `PUT|DELETE /assignments/:id` - Override or forget one size
/// - `GET|PUT|DELETE /assignments` - Snapshot, restore or clear the size table
/// - `GET|PUT /settings` - Read or replace size settings
/// - `GET /dirty` - Drain entities needing a visual refresh
/// - `GET /stats` - Cache statistics
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/tick", put(tick_handler))
        .route("/phase", put(phase_handler))
        .route("/scale", post(scale_handler))
        .route("/stat", post(stat_handler))
        .route("/mesh", post(mesh_handler))
        .route("/debug", post(debug_handler))
        .route(
            "/assignments",
            get(snapshot_handler)
                .put(restore_handler)
                .delete(reset_all_handler),
        )
        .route(
            "/assignments/:id",
            put(override_handler).delete(reset_handler),
        )
        .route("/settings", get(settings_handler).put(update_settings_handler))
        .route("/dirty", get(dirty_handler))
        .route("/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
