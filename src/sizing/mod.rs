//! Sizing Module
//!
//! Per-entity size assignment: ranges and settings, random draws, the
//! assignment policy and the geometry caches downstream of it.

mod draw;
mod entity;
mod mesh;
mod policy;
mod range;
mod settings;

pub use draw::SizeSampler;
pub use entity::{Entity, LifeStage, StableId};
pub use mesh::{Dimensions, InternedMeshPool, MeshCaches, MeshHandle, MeshKind, MeshPool};
pub use policy::{
    CacheTtls, DebugAdjustment, DebugOutcome, PersistencePhase, PolicyStats,
    SizeAssignmentPolicy, SizeModifier, StatKind,
};
pub use range::{clamp_to_bounds, round_size, SizeRange, MAX_SIZE, MIN_SIZE, NEUTRAL_SIZE};
pub use settings::{AffectedStats, Distribution, SizeSettings, SPREAD_DIVISOR_RANGE};
