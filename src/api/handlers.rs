//! API Handlers
//!
//! HTTP request handlers exposing the sizing engine to an out-of-process host.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use crate::clock::{TickClock, TickSource};
use crate::config::Config;
use crate::engine::SizingEngine;
use crate::error::{Result, SizingError};
use crate::models::{
    AssignmentResponse, DebugRequest, DirtyResponse, HealthResponse, MeshRequest, MeshResponse,
    OverrideRequest, PhaseRequest, ResetResponse, RestoreResponse, ScaleRequest, ScaleResponse,
    StatRequest, StatResponse, StatsResponse, TickRequest, TickResponse,
};
use crate::persistence::{self, AssignmentSnapshot};
use crate::sizing::{Dimensions, Entity, SizeSettings, StableId};

/// Application state shared across all handlers.
///
/// The engine is not internally synchronised, so it sits behind an
/// `Arc<RwLock<>>`. Every size query may populate a cache, so nearly all
/// handlers take the write lock.
#[derive(Clone)]
pub struct AppState {
    /// Sizing engine for the current session
    pub engine: Arc<RwLock<SizingEngine>>,
    /// Tick counter advanced by the host
    pub clock: Arc<TickClock>,
}

impl AppState {
    /// Creates a new AppState around an engine built on `clock`.
    pub fn new(engine: SizingEngine, clock: Arc<TickClock>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            clock,
        }
    }

    /// Creates a new AppState from configuration and loaded settings.
    pub fn from_config(config: &Config, settings: SizeSettings) -> Self {
        let clock = Arc::new(TickClock::new());
        let engine = SizingEngine::from_config(config, settings, clock.clone());
        Self::new(engine, clock)
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.clock.current_tick()))
}

/// Handler for PUT /tick
///
/// Advances the shared tick counter. Moving it backwards is rejected.
pub async fn tick_handler(
    State(state): State<AppState>,
    Json(req): Json<TickRequest>,
) -> Result<Json<TickResponse>> {
    state.clock.advance_to(req.tick).inspect_err(|err| {
        warn!("rejected tick update: {}", err);
    })?;

    Ok(Json(TickResponse {
        tick: state.clock.current_tick(),
    }))
}

/// Handler for PUT /phase
///
/// Marks the start or end of a host load/save pass.
pub async fn phase_handler(
    State(state): State<AppState>,
    Json(req): Json<PhaseRequest>,
) -> StatusCode {
    let mut engine = state.engine.write().await;
    engine.policy.set_phase(req.phase);
    StatusCode::NO_CONTENT
}

/// Handler for POST /scale
pub async fn scale_handler(
    State(state): State<AppState>,
    Json(req): Json<ScaleRequest>,
) -> Json<ScaleResponse> {
    let mut engine = state.engine.write().await;
    let scale = engine.policy.scaled_value(req.entity.as_ref());

    Json(ScaleResponse {
        id: req.entity.map(|entity| entity.id),
        scale,
    })
}

/// Handler for POST /stat
pub async fn stat_handler(
    State(state): State<AppState>,
    Json(req): Json<StatRequest>,
) -> Result<Json<StatResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(SizingError::InvalidRequest(error_msg));
    }

    let mut engine = state.engine.write().await;
    let value = engine
        .policy
        .adjusted_stat(req.entity.as_ref(), req.stat, req.base);

    Ok(Json(StatResponse {
        stat: req.stat,
        base: req.base,
        value,
    }))
}

/// Handler for POST /mesh
pub async fn mesh_handler(
    State(state): State<AppState>,
    Json(req): Json<MeshRequest>,
) -> Result<Json<MeshResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(SizingError::InvalidRequest(error_msg));
    }

    let mut engine = state.engine.write().await;
    let (handle, dims) = engine.mesh_for(
        req.entity.as_ref(),
        req.kind,
        Dimensions::new(req.width, req.height),
    );

    Ok(Json(MeshResponse {
        kind: req.kind,
        handle,
        width: dims.width,
        height: dims.height,
    }))
}

/// Handler for POST /debug
pub async fn debug_handler(
    State(state): State<AppState>,
    Json(req): Json<DebugRequest>,
) -> Result<Json<AssignmentResponse>> {
    let mut engine = state.engine.write().await;
    let outcome = engine.policy.apply_debug(&req.entity, req.adjustment)?;

    Ok(Json(AssignmentResponse::new(
        req.entity.id,
        outcome.size,
        outcome.message,
    )))
}

/// Handler for PUT /assignments/:id
pub async fn override_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<OverrideRequest>,
) -> Result<Json<AssignmentResponse>> {
    let entity = Entity::new(id, req.kind);

    let mut engine = state.engine.write().await;
    let size = engine.policy.set_assignment(&entity, req.size)?;

    Ok(Json(AssignmentResponse::new(
        entity.id,
        size,
        format!("Size of {} set to {}", entity.id, size),
    )))
}

/// Handler for DELETE /assignments/:id
pub async fn reset_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<ResetResponse> {
    let id = StableId(id);

    let mut engine = state.engine.write().await;
    let cleared = usize::from(engine.policy.assignment(id).is_some());
    engine.policy.reset_assignment(id);

    Json(ResetResponse::new(format!("Size of {} reset", id), cleared))
}

/// Handler for DELETE /assignments
pub async fn reset_all_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut engine = state.engine.write().await;
    let cleared = engine.policy.reset_all();

    Json(ResetResponse::new("All sizes reset", cleared))
}

/// Handler for GET /assignments
pub async fn snapshot_handler(State(state): State<AppState>) -> Json<AssignmentSnapshot> {
    let engine = state.engine.read().await;
    Json(engine.policy.snapshot())
}

/// Handler for PUT /assignments
///
/// Accepts the current snapshot format or a legacy reference-keyed table.
pub async fn restore_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<RestoreResponse>> {
    let snapshot = persistence::load_snapshot(&body)?;

    let mut engine = state.engine.write().await;
    let restored = engine.policy.restore(snapshot);

    Ok(Json(RestoreResponse { restored }))
}

/// Handler for GET /settings
pub async fn settings_handler(State(state): State<AppState>) -> Json<SizeSettings> {
    let engine = state.engine.read().await;
    Json(engine.policy.settings().clone())
}

/// Handler for PUT /settings
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(settings): Json<SizeSettings>,
) -> Result<Json<SizeSettings>> {
    let mut engine = state.engine.write().await;
    engine.policy.update_settings(settings)?;

    Ok(Json(engine.policy.settings().clone()))
}

/// Handler for GET /dirty
///
/// Returns, and forgets, the entities whose visuals need rebuilding.
pub async fn dirty_handler(State(state): State<AppState>) -> Json<DirtyResponse> {
    let mut engine = state.engine.write().await;
    Json(DirtyResponse {
        ids: engine.policy.drain_dirty(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine.read().await;
    Json(StatsResponse::from(engine.policy.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::{DebugAdjustment, MeshKind, PersistencePhase, StatKind};

    fn test_state() -> AppState {
        let config = Config {
            rng_seed: Some(3),
            ..Config::default()
        };
        AppState::from_config(&config, SizeSettings::default())
    }

    fn human(id: u64) -> Entity {
        Entity::new(id, "Human")
    }

    #[tokio::test]
    async fn test_scale_handler_is_stable() {
        let state = test_state();

        let req = ScaleRequest {
            entity: Some(human(1)),
        };
        let first = scale_handler(State(state.clone()), Json(req.clone())).await;
        let second = scale_handler(State(state.clone()), Json(req)).await;

        assert_eq!(first.scale, second.scale);
        assert_eq!(first.id, Some(StableId(1)));
    }

    #[tokio::test]
    async fn test_scale_handler_null_entity() {
        let state = test_state();

        let response = scale_handler(State(state), Json(ScaleRequest { entity: None })).await;
        assert_eq!(response.scale, 1.0);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_tick_handler_rejects_regression() {
        let state = test_state();

        let result = tick_handler(State(state.clone()), Json(TickRequest { tick: 100 })).await;
        assert_eq!(result.unwrap().tick, 100);

        let result = tick_handler(State(state), Json(TickRequest { tick: 50 })).await;
        assert!(matches!(result, Err(SizingError::TickRegression { .. })));
    }

    #[tokio::test]
    async fn test_phase_handler_neutralises_queries() {
        let state = test_state();

        let status = phase_handler(
            State(state.clone()),
            Json(PhaseRequest {
                phase: PersistencePhase::Loading,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let response = scale_handler(
            State(state),
            Json(ScaleRequest {
                entity: Some(human(1)),
            }),
        )
        .await;
        assert_eq!(response.scale, 1.0);
    }

    #[tokio::test]
    async fn test_override_and_reset_handlers() {
        let state = test_state();

        let req = OverrideRequest {
            kind: "Human".to_string(),
            size: 1.4,
        };
        let response = override_handler(State(state.clone()), Path(8), Json(req))
            .await
            .unwrap();
        assert_eq!(response.size, 1.4);

        let response = reset_handler(State(state.clone()), Path(8)).await;
        assert_eq!(response.cleared, 1);

        let response = reset_handler(State(state.clone()), Path(8)).await;
        assert_eq!(response.cleared, 0);

        let dirty = dirty_handler(State(state)).await;
        assert_eq!(dirty.ids, vec![StableId(8)]);
    }

    #[tokio::test]
    async fn test_stat_handler() {
        let state = test_state();
        override_handler(
            State(state.clone()),
            Path(2),
            Json(OverrideRequest {
                kind: "Human".to_string(),
                size: 2.0,
            }),
        )
        .await
        .unwrap();

        let req = StatRequest {
            entity: Some(human(2)),
            stat: StatKind::HealthScale,
            base: 1.5,
        };
        let response = stat_handler(State(state), Json(req)).await.unwrap();
        assert_eq!(response.value, 3.0);
    }

    #[tokio::test]
    async fn test_mesh_handler_rejects_bad_dimensions() {
        let state = test_state();

        let req = MeshRequest {
            entity: Some(human(1)),
            kind: MeshKind::Head,
            width: -1.0,
            height: 1.0,
        };
        let result = mesh_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(SizingError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_debug_handler() {
        let state = test_state();

        let req = DebugRequest {
            entity: human(4),
            adjustment: DebugAdjustment::Reset,
        };
        let response = debug_handler(State(state), Json(req)).await.unwrap();
        assert_eq!(response.size, 1.0);
        assert!(response.message.contains("reset"));
    }

    #[tokio::test]
    async fn test_snapshot_restore_round_trip() {
        let state = test_state();
        let size = scale_handler(
            State(state.clone()),
            Json(ScaleRequest {
                entity: Some(human(77)),
            }),
        )
        .await
        .scale;

        let snapshot = snapshot_handler(State(state.clone())).await;
        let body = serde_json::to_string(&snapshot.0).unwrap();

        reset_all_handler(State(state.clone())).await;
        let restored = restore_handler(State(state.clone()), body).await.unwrap();
        assert_eq!(restored.restored, 1);

        let engine = state.engine.read().await;
        assert_eq!(engine.policy.assignment(StableId(77)), Some(size));
    }

    #[tokio::test]
    async fn test_update_settings_handler_validates() {
        let state = test_state();

        let bad = SizeSettings {
            spread_divisor: 0.5,
            ..SizeSettings::default()
        };
        let result = update_settings_handler(State(state.clone()), Json(bad)).await;
        assert!(matches!(result, Err(SizingError::InvalidSettings(_))));

        let current = settings_handler(State(state)).await;
        assert_eq!(current.spread_divisor, 6.0);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.scalar.hits, 0);
        assert_eq!(response.assignments, 0);
    }
}
