//! Request and Response models for the sizing service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    DebugRequest, MeshRequest, OverrideRequest, PhaseRequest, ScaleRequest, StatRequest,
    TickRequest,
};
pub use responses::{
    AssignmentResponse, DirtyResponse, ErrorResponse, HealthResponse, MeshResponse,
    ResetResponse, RestoreResponse, ScaleResponse, StatResponse, StatsResponse, TickResponse,
};
