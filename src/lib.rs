//! Varied Sizes - per-entity size assignment with tick-expiring caches
//!
//! Gives every simulated creature a stable random size multiplier, scales
//! stats and mesh geometry by it, and keeps hot lookups behind caches that
//! expire after a fixed number of simulation ticks.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod persistence;
pub mod sizing;
pub mod tasks;

pub use api::AppState;
pub use cache::ExpiringCache;
pub use clock::{TickClock, TickSource};
pub use config::Config;
pub use engine::SizingEngine;
pub use error::{Result, SizingError};
pub use sizing::{Entity, SizeAssignmentPolicy, SizeSettings, StableId};
pub use tasks::spawn_maintenance_task;
