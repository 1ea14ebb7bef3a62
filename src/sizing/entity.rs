//! Entity descriptors supplied by the host.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Stable Id ==
/// Save/load-invariant numeric identity of an entity.
///
/// Durable state is always keyed by this id, never by an in-memory handle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StableId(pub u64);

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for StableId {
    fn from(id: u64) -> Self {
        StableId(id)
    }
}

// == Life Stage ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeStage {
    Baby,
    Child,
    #[default]
    Adult,
}

// == Entity ==
/// What the host tells us about an entity when it asks for its size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identity
    pub id: StableId,
    /// Entity type name, used to pick a per-kind size range
    pub kind: String,
    /// Developmental stage
    #[serde(default)]
    pub stage: LifeStage,
    /// Mechanical entities can be excluded from variation
    #[serde(default)]
    pub mechanoid: bool,
}

impl Entity {
    /// Creates an adult, organic entity.
    pub fn new(id: impl Into<StableId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            stage: LifeStage::Adult,
            mechanoid: false,
        }
    }

    pub fn with_stage(mut self, stage: LifeStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn as_mechanoid(mut self) -> Self {
        self.mechanoid = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_deserialize_defaults() {
        let json = r#"{"id": 1234, "kind": "Human"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();

        assert_eq!(entity.id, StableId(1234));
        assert_eq!(entity.kind, "Human");
        assert_eq!(entity.stage, LifeStage::Adult);
        assert!(!entity.mechanoid);
    }

    #[test]
    fn test_entity_deserialize_stage() {
        let json = r#"{"id": 5, "kind": "Human", "stage": "baby"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.stage, LifeStage::Baby);
    }

    #[test]
    fn test_stable_id_display() {
        assert_eq!(StableId(42).to_string(), "#42");
    }
}
