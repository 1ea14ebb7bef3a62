//! Request DTOs for the sizing service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::sizing::{DebugAdjustment, Entity, MeshKind, PersistencePhase, StatKind};

/// Request body for PUT /tick
#[derive(Debug, Clone, Deserialize)]
pub struct TickRequest {
    /// New current tick; must not be lower than the previous one
    pub tick: i64,
}

/// Request body for PUT /phase
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseRequest {
    pub phase: PersistencePhase,
}

/// Request body for POST /scale
///
/// A missing or null entity yields the neutral size.
#[derive(Debug, Clone, Deserialize)]
pub struct ScaleRequest {
    #[serde(default)]
    pub entity: Option<Entity>,
}

/// Request body for POST /stat
#[derive(Debug, Clone, Deserialize)]
pub struct StatRequest {
    #[serde(default)]
    pub entity: Option<Entity>,
    pub stat: StatKind,
    /// Unscaled stat value from the host
    pub base: f32,
}

impl StatRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !self.base.is_finite() {
            return Some("Base value must be finite".to_string());
        }
        None
    }
}

/// Request body for POST /mesh
#[derive(Debug, Clone, Deserialize)]
pub struct MeshRequest {
    #[serde(default)]
    pub entity: Option<Entity>,
    pub kind: MeshKind,
    /// Unscaled mesh width
    pub width: f32,
    /// Unscaled mesh height
    pub height: f32,
}

impl MeshRequest {
    pub fn validate(&self) -> Option<String> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Some("Mesh dimensions must be positive and finite".to_string());
        }
        None
    }
}

/// Request body for POST /debug
#[derive(Debug, Clone, Deserialize)]
pub struct DebugRequest {
    pub entity: Entity,
    pub adjustment: DebugAdjustment,
}

/// Request body for PUT /assignments/:id
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRequest {
    /// Entity kind, recorded for modifiers that look at it
    #[serde(default)]
    pub kind: String,
    pub size: f32,
}
