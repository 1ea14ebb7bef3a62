//! Sizing Engine
//!
//! One session's worth of state: the assignment policy plus the mesh pool
//! that backs its geometry caches.

use std::sync::Arc;

use crate::clock::TickSource;
use crate::config::Config;
use crate::sizing::{
    CacheTtls, Dimensions, Entity, InternedMeshPool, MeshHandle, MeshKind, SizeAssignmentPolicy,
    SizeSettings,
};

#[derive(Debug)]
pub struct SizingEngine {
    pub policy: SizeAssignmentPolicy<MeshHandle>,
    pub mesh_pool: InternedMeshPool,
}

impl SizingEngine {
    pub fn new(policy: SizeAssignmentPolicy<MeshHandle>) -> Self {
        Self {
            policy,
            mesh_pool: InternedMeshPool::new(),
        }
    }

    /// Builds an engine from process configuration and already-loaded settings.
    pub fn from_config(
        config: &Config,
        settings: SizeSettings,
        ticks: Arc<dyn TickSource>,
    ) -> Self {
        let ttls = CacheTtls {
            scalar: config.scalar_ttl_ticks,
            mesh: config.mesh_ttl_ticks,
        };
        let policy = SizeAssignmentPolicy::new(settings, ttls, ticks);
        let policy = match config.rng_seed {
            Some(seed) => policy.with_seed(seed),
            None => policy,
        };
        Self::new(policy)
    }

    /// Looks up or builds scaled geometry, returning the handle and its dimensions.
    pub fn mesh_for(
        &mut self,
        entity: Option<&Entity>,
        kind: MeshKind,
        base: Dimensions,
    ) -> (MeshHandle, Dimensions) {
        let handle = self
            .policy
            .mesh_for(entity, kind, base, &mut self.mesh_pool);
        let dims = self.mesh_pool.dimensions(handle).unwrap_or(base);
        (handle, dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;

    #[test]
    fn test_from_config_uses_seed() {
        let config = Config {
            rng_seed: Some(1),
            ..Config::default()
        };
        let clock = Arc::new(TickClock::new());
        let mut a = SizingEngine::from_config(&config, SizeSettings::default(), clock.clone());
        let mut b = SizingEngine::from_config(&config, SizeSettings::default(), clock);
        let entity = Entity::new(1u64, "Human");

        assert_eq!(
            a.policy.scaled_value(Some(&entity)),
            b.policy.scaled_value(Some(&entity))
        );
    }

    #[test]
    fn test_mesh_for_reports_dimensions() {
        let clock = Arc::new(TickClock::new());
        let mut engine =
            SizingEngine::from_config(&Config::default(), SizeSettings::default(), clock);
        let entity = Entity::new(1u64, "Human");
        engine.policy.set_assignment(&entity, 2.0).unwrap();

        let (_, dims) = engine.mesh_for(Some(&entity), MeshKind::Overlay, Dimensions::new(1.3, 1.3));
        assert!((dims.width - 2.6).abs() < 1e-6);
    }
}
