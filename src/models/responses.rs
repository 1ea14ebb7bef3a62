//! Response DTOs for the sizing service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::sizing::{MeshHandle, MeshKind, PolicyStats, StableId, StatKind};

/// Response body for POST /scale
#[derive(Debug, Clone, Serialize)]
pub struct ScaleResponse {
    /// Entity the size belongs to, absent for a null entity
    pub id: Option<StableId>,
    pub scale: f32,
}

/// Response body for POST /stat
#[derive(Debug, Clone, Serialize)]
pub struct StatResponse {
    pub stat: StatKind,
    pub base: f32,
    pub value: f32,
}

/// Response body for POST /mesh
#[derive(Debug, Clone, Serialize)]
pub struct MeshResponse {
    pub kind: MeshKind,
    pub handle: MeshHandle,
    /// Scaled dimensions the handle was built for
    pub width: f32,
    pub height: f32,
}

/// Response body for POST /debug and PUT /assignments/:id
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    pub id: StableId,
    pub size: f32,
    pub message: String,
}

impl AssignmentResponse {
    pub fn new(id: StableId, size: f32, message: impl Into<String>) -> Self {
        Self {
            id,
            size,
            message: message.into(),
        }
    }
}

/// Response body for the reset endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub message: String,
    /// Number of durable assignments removed
    pub cleared: usize,
}

impl ResetResponse {
    pub fn new(message: impl Into<String>, cleared: usize) -> Self {
        Self {
            message: message.into(),
            cleared,
        }
    }
}

/// Response body for PUT /tick
#[derive(Debug, Clone, Serialize)]
pub struct TickResponse {
    pub tick: i64,
}

/// Response body for PUT /assignments (restore)
#[derive(Debug, Clone, Serialize)]
pub struct RestoreResponse {
    pub restored: usize,
}

/// Response body for GET /dirty
#[derive(Debug, Clone, Serialize)]
pub struct DirtyResponse {
    /// Entities whose visual state must be rebuilt
    pub ids: Vec<StableId>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Size multiplier cache
    pub scalar: CacheStats,
    /// All mesh caches combined
    pub meshes: CacheStats,
    /// Durable size assignments
    pub assignments: usize,
    /// Hit rate of the size multiplier cache
    pub hit_rate: f64,
}

impl From<PolicyStats> for StatsResponse {
    fn from(stats: PolicyStats) -> Self {
        Self {
            hit_rate: stats.scalar.hit_rate(),
            scalar: stats.scalar,
            meshes: stats.meshes,
            assignments: stats.assignments,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Current host tick
    pub tick: i64,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(tick: i64) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            tick,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_response_serialize() {
        let resp = ScaleResponse {
            id: Some(StableId(12)),
            scale: 1.05,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""id":12"#));
        assert!(json.contains("1.05"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut scalar = CacheStats::new();
        for _ in 0..4 {
            scalar.record_hit();
        }
        scalar.record_miss();
        let resp = StatsResponse::from(PolicyStats {
            scalar,
            meshes: CacheStats::new(),
            assignments: 3,
        });
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.assignments, 3);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(42);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains(r#""tick":42"#));
    }

    #[test]
    fn test_mesh_response_serialize() {
        let resp = MeshResponse {
            kind: MeshKind::Beard,
            handle: MeshHandle(4),
            width: 1.5,
            height: 1.5,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""kind":"beard""#));
        assert!(json.contains(r#""handle":4"#));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
