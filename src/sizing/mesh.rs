//! Mesh Cache Module
//!
//! Per-kind caches of scaled geometry handles, downstream of the size scalar.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, ExpiringCache};
use crate::clock::TickSource;
use crate::sizing::StableId;

// == Mesh Kind ==
/// Visual artifact kinds that get their own cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    Head,
    Body,
    Hair,
    Beard,
    Overlay,
}

impl MeshKind {
    pub const ALL: [MeshKind; 5] = [
        MeshKind::Head,
        MeshKind::Body,
        MeshKind::Hair,
        MeshKind::Beard,
        MeshKind::Overlay,
    ];

    fn index(self) -> usize {
        match self {
            MeshKind::Head => 0,
            MeshKind::Body => 1,
            MeshKind::Hair => 2,
            MeshKind::Beard => 3,
            MeshKind::Overlay => 4,
        }
    }
}

// == Dimensions ==
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

// == Mesh Pool ==
/// Source of geometry for a requested size. The caches never build geometry
/// themselves; they only decide which dimensions to ask for.
pub trait MeshPool {
    type Handle: Clone;

    /// Returns a geometry handle for the given dimensions.
    fn mesh_set(&mut self, dims: Dimensions) -> Self::Handle;
}

// == Interned Mesh Pool ==
/// Handle to an interned mesh set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshHandle(pub u32);

/// Mesh pool that hands out one handle per distinct size.
///
/// Dimensions are keyed to a thousandth of a unit so nearly identical
/// requests share a mesh set.
#[derive(Debug, Default)]
pub struct InternedMeshPool {
    by_size: HashMap<(i64, i64), MeshHandle>,
    sizes: Vec<Dimensions>,
}

impl InternedMeshPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dimensions a handle was created for.
    pub fn dimensions(&self, handle: MeshHandle) -> Option<Dimensions> {
        self.sizes.get(handle.0 as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl MeshPool for InternedMeshPool {
    type Handle = MeshHandle;

    fn mesh_set(&mut self, dims: Dimensions) -> MeshHandle {
        let key = (
            (f64::from(dims.width) * 1000.0).round() as i64,
            (f64::from(dims.height) * 1000.0).round() as i64,
        );
        let sizes = &mut self.sizes;
        *self.by_size.entry(key).or_insert_with(|| {
            sizes.push(dims);
            MeshHandle((sizes.len() - 1) as u32)
        })
    }
}

// == Mesh Caches ==
/// One expiring cache per [`MeshKind`], keyed by entity.
#[derive(Debug)]
pub struct MeshCaches<H> {
    caches: Vec<ExpiringCache<StableId, H>>,
}

impl<H: Clone> MeshCaches<H> {
    pub fn new(ttl: i64, ticks: Arc<dyn TickSource>) -> Self {
        Self {
            caches: MeshKind::ALL
                .iter()
                .map(|_| ExpiringCache::new(ttl, ticks.clone()))
                .collect(),
        }
    }

    pub fn get(&mut self, kind: MeshKind, id: StableId) -> Option<H> {
        self.caches[kind.index()].get(&id).cloned()
    }

    pub fn store(&mut self, kind: MeshKind, id: StableId, handle: H) -> H {
        self.caches[kind.index()].set_and_get(id, handle).clone()
    }

    pub fn contains(&mut self, kind: MeshKind, id: StableId) -> bool {
        self.caches[kind.index()].contains(&id)
    }

    // == Invalidate ==
    /// Drops every cached mesh for one entity.
    pub fn invalidate(&mut self, id: StableId) {
        for cache in &mut self.caches {
            cache.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        for cache in &mut self.caches {
            cache.clear();
        }
    }

    pub fn purge_expired(&mut self) -> usize {
        self.caches.iter_mut().map(|cache| cache.purge_expired()).sum()
    }

    /// Combined statistics across every kind.
    pub fn stats(&self) -> CacheStats {
        let mut total = CacheStats::new();
        for cache in &self.caches {
            total.merge(&cache.stats());
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;

    #[test]
    fn test_pool_interns_equal_sizes() {
        let mut pool = InternedMeshPool::new();

        let a = pool.mesh_set(Dimensions::new(1.5, 1.5));
        let b = pool.mesh_set(Dimensions::new(1.5, 1.5));
        let c = pool.mesh_set(Dimensions::new(1.65, 1.65));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.dimensions(c), Some(Dimensions::new(1.65, 1.65)));
    }

    #[test]
    fn test_dimensions_scaled() {
        let dims = Dimensions::new(1.5, 1.0).scaled(2.0);
        assert_eq!(dims, Dimensions::new(3.0, 2.0));
    }

    #[test]
    fn test_caches_are_per_kind() {
        let clock = Arc::new(TickClock::new());
        let mut caches: MeshCaches<u32> = MeshCaches::new(360, clock);

        caches.store(MeshKind::Head, StableId(1), 10);

        assert_eq!(caches.get(MeshKind::Head, StableId(1)), Some(10));
        assert_eq!(caches.get(MeshKind::Body, StableId(1)), None);
    }

    #[test]
    fn test_invalidate_clears_every_kind() {
        let clock = Arc::new(TickClock::new());
        let mut caches: MeshCaches<u32> = MeshCaches::new(360, clock);

        for kind in MeshKind::ALL {
            caches.store(kind, StableId(1), 1);
            caches.store(kind, StableId(2), 2);
        }
        caches.invalidate(StableId(1));

        for kind in MeshKind::ALL {
            assert!(!caches.contains(kind, StableId(1)));
            assert!(caches.contains(kind, StableId(2)));
        }
        assert_eq!(caches.stats().total_entries, 5);
    }

    #[test]
    fn test_mesh_caches_expire() {
        let clock = Arc::new(TickClock::new());
        let mut caches: MeshCaches<u32> = MeshCaches::new(100, clock.clone());

        caches.store(MeshKind::Hair, StableId(3), 7);
        clock.advance_to(101).unwrap();

        assert_eq!(caches.purge_expired(), 1);
        assert_eq!(caches.get(MeshKind::Hair, StableId(3)), None);
    }
}
