//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Maintenance: sweeps expired cache entries and autosaves the size table

mod maintenance;

pub use maintenance::{run_maintenance_once, spawn_maintenance_task};
