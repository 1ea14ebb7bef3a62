//! Size Assignment Policy Module
//!
//! Assigns each entity a durable size multiplier and fronts it with
//! short-lived caches for the scalar and the geometry derived from it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, ExpiringCache};
use crate::clock::TickSource;
use crate::error::{Result, SizingError};
use crate::persistence::AssignmentSnapshot;
use crate::sizing::{
    clamp_to_bounds, Dimensions, Entity, LifeStage, MeshCaches, MeshHandle, MeshKind, MeshPool,
    SizeSampler, SizeSettings, StableId, MAX_SIZE, MIN_SIZE, NEUTRAL_SIZE,
};

/// Post-processing hook applied to a size before it is cached.
pub type SizeModifier = Box<dyn Fn(f32, &Entity) -> f32 + Send + Sync>;

// == Cache TTLs ==
/// Expiry windows, in ticks, for the transient caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub scalar: i64,
    pub mesh: i64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            scalar: 1800,
            mesh: 3600,
        }
    }
}

// == Persistence Phase ==
/// Whether the host is in the middle of loading or saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePhase {
    #[default]
    Inactive,
    Loading,
    Saving,
}

// == Stat Kind ==
/// Host stats that can be scaled by entity size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    BodySize,
    HealthScale,
    HungerRate,
    HarvestYield,
    /// Attacker's melee damage factor
    MeleeDamage,
    /// Target's chance to dodge a melee attack, divided by size
    MeleeDodgeChance,
    /// Lactation charge gained per interval, divided by size
    LactationCharge,
}

// == Debug Adjustment ==
/// Manual size changes issued from developer tooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DebugAdjustment {
    /// +1%, or +10% when large
    Grow {
        #[serde(default)]
        large: bool,
    },
    /// -1%, or -10% when large
    Shrink {
        #[serde(default)]
        large: bool,
    },
    /// Back to the neutral size
    Reset,
    /// Fresh draw from the entity's configured range
    Randomize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugOutcome {
    pub size: f32,
    pub message: String,
}

// == Policy Stats ==
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStats {
    pub scalar: CacheStats,
    pub meshes: CacheStats,
    pub assignments: usize,
}

// == Size Assignment Policy ==
/// Owns the durable per-entity size table and the caches in front of it.
///
/// One instance lives per simulation session. Like the caches it holds, it
/// is not internally synchronised.
pub struct SizeAssignmentPolicy<H = MeshHandle> {
    settings: SizeSettings,
    /// Durable sizes keyed by stable id
    assignments: HashMap<StableId, f32>,
    /// Short-lived front for `assignments`, modifiers already applied
    scalar_cache: ExpiringCache<StableId, f32>,
    meshes: MeshCaches<H>,
    sampler: SizeSampler,
    modifiers: Vec<SizeModifier>,
    phase: PersistencePhase,
    /// Entities whose externally owned visual state must be rebuilt
    dirty: BTreeSet<StableId>,
}

impl<H> fmt::Debug for SizeAssignmentPolicy<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeAssignmentPolicy")
            .field("assignments", &self.assignments.len())
            .field("scalar_cache", &self.scalar_cache)
            .field("modifiers", &self.modifiers.len())
            .field("phase", &self.phase)
            .finish()
    }
}

impl<H: Clone> SizeAssignmentPolicy<H> {
    // == Constructor ==
    /// Creates a policy with an entropy-seeded sampler.
    ///
    /// The tick source is not read until the first query.
    pub fn new(settings: SizeSettings, ttls: CacheTtls, ticks: Arc<dyn TickSource>) -> Self {
        Self {
            settings,
            assignments: HashMap::new(),
            scalar_cache: ExpiringCache::new(ttls.scalar, ticks.clone()),
            meshes: MeshCaches::new(ttls.mesh, ticks),
            sampler: SizeSampler::from_entropy(),
            modifiers: Vec::new(),
            phase: PersistencePhase::Inactive,
            dirty: BTreeSet::new(),
        }
    }

    /// Replaces the sampler with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sampler = SizeSampler::seeded(seed);
        self
    }

    // == Scaled Value ==
    /// Returns the size multiplier for an entity.
    ///
    /// Yields the neutral size for a missing entity, while a load or save is
    /// in progress, and for ignored mechanoids. Otherwise the cached value is
    /// returned, or the durable assignment (drawn on first use) is passed
    /// through the registered modifiers and cached.
    pub fn scaled_value(&mut self, entity: Option<&Entity>) -> f32 {
        let Some(entity) = entity else {
            return NEUTRAL_SIZE;
        };
        if self.phase != PersistencePhase::Inactive {
            return NEUTRAL_SIZE;
        }
        if entity.mechanoid && self.settings.ignore_mechanoids {
            return NEUTRAL_SIZE;
        }

        if let Some(&cached) = self.scalar_cache.get(&entity.id) {
            return cached;
        }

        let assigned = self.assignment_or_draw(entity);
        let size = self.apply_modifiers(assigned, entity);
        if !size.is_finite() {
            warn!(id = %entity.id, "size modifier produced {}, using neutral size", size);
            return NEUTRAL_SIZE;
        }

        debug!(id = %entity.id, size, "size cache refreshed");
        self.scalar_cache.set(entity.id, size);
        size
    }

    // == Adjusted Stat ==
    /// Scales a host stat by the entity's size when that stat is enabled.
    ///
    /// Dodge chance and lactation charge are divided by the size instead.
    pub fn adjusted_stat(&mut self, entity: Option<&Entity>, stat: StatKind, base: f32) -> f32 {
        let affect = &self.settings.affect;
        let enabled = match stat {
            StatKind::BodySize => affect.body_size,
            StatKind::HealthScale => affect.health_scale,
            StatKind::HungerRate => affect.hunger_rate,
            StatKind::HarvestYield => affect.harvest_yield,
            StatKind::MeleeDamage => affect.melee_damage,
            StatKind::MeleeDodgeChance => affect.melee_dodge_chance,
            StatKind::LactationCharge => affect.lactation_charge,
        };
        if !enabled {
            return base;
        }

        let scale = self.scaled_value(entity);
        let value = match stat {
            // Larger creatures dodge less and fill up slower
            StatKind::MeleeDodgeChance | StatKind::LactationCharge if scale > 0.0 => base / scale,
            StatKind::MeleeDodgeChance | StatKind::LactationCharge => base,
            _ => base * scale,
        };
        match stat {
            // Babies have to stay small enough for cribs
            StatKind::BodySize if entity.is_some_and(|e| e.stage == LifeStage::Baby) => {
                value.min(MIN_SIZE)
            }
            StatKind::HarvestYield => value.round(),
            _ => value,
        }
    }

    // == Mesh For ==
    /// Returns geometry for one artifact kind, scaled by the entity's size.
    ///
    /// Neutral results (no entity, or a persistence pass in progress) are
    /// requested from the pool unscaled and not cached.
    pub fn mesh_for<P>(
        &mut self,
        entity: Option<&Entity>,
        kind: MeshKind,
        base: Dimensions,
        pool: &mut P,
    ) -> H
    where
        P: MeshPool<Handle = H>,
    {
        let cacheable = entity.filter(|_| self.phase == PersistencePhase::Inactive);
        let Some(entity) = cacheable else {
            return pool.mesh_set(base);
        };

        if let Some(handle) = self.meshes.get(kind, entity.id) {
            return handle;
        }

        let scale = self.scaled_value(Some(entity));
        let handle = pool.mesh_set(base.scaled(scale));
        self.meshes.store(kind, entity.id, handle)
    }

    pub fn has_cached_mesh(&mut self, kind: MeshKind, id: StableId) -> bool {
        self.meshes.contains(kind, id)
    }

    // == Reset ==
    /// Forgets one entity's size. The next query draws a new one.
    pub fn reset_assignment(&mut self, id: StableId) {
        self.assignments.remove(&id);
        self.scalar_cache.remove(&id);
        self.meshes.invalidate(id);
        self.dirty.insert(id);
        debug!(%id, "size assignment reset");
    }

    /// Forgets every size. Returns how many assignments were dropped.
    pub fn reset_all(&mut self) -> usize {
        let cleared = self.assignments.len();
        self.dirty.extend(self.assignments.keys().copied());
        self.assignments.clear();
        self.scalar_cache.clear();
        self.meshes.clear();
        info!(cleared, "all size assignments reset");
        cleared
    }

    // == Set Assignment ==
    /// Overrides one entity's durable size, bounded to the absolute limits.
    pub fn set_assignment(&mut self, entity: &Entity, size: f32) -> Result<f32> {
        self.ensure_writable()?;
        if !size.is_finite() {
            return Err(SizingError::InvalidRequest(format!(
                "size must be finite, got {}",
                size
            )));
        }

        let size = clamp_to_bounds(size);
        self.reset_assignment(entity.id);
        self.assignments.insert(entity.id, size);

        // Seed the front cache directly so the new value is visible at once
        let modified = self.apply_modifiers(size, entity);
        if modified.is_finite() {
            self.scalar_cache.set(entity.id, modified);
        }
        info!(id = %entity.id, size, "size assignment overridden");
        Ok(size)
    }

    // == Debug Adjustments ==
    pub fn apply_debug(
        &mut self,
        entity: &Entity,
        adjustment: DebugAdjustment,
    ) -> Result<DebugOutcome> {
        self.ensure_writable()?;
        let current = self.assignment_or_draw(entity);
        let step = |large: bool| if large { 0.1 } else { 0.01 };

        let (size, message) = match adjustment {
            DebugAdjustment::Grow { large } => {
                let change = step(large);
                let grown = current + change;
                if grown > MAX_SIZE {
                    (
                        MAX_SIZE,
                        format!(
                            "Size of {} increased by {} but was limited to the maximum value of {}",
                            entity.id,
                            percent(change),
                            percent(MAX_SIZE)
                        ),
                    )
                } else {
                    (
                        grown,
                        format!(
                            "Size of {} increased by {} to {}",
                            entity.id,
                            percent(change),
                            percent(grown)
                        ),
                    )
                }
            }
            DebugAdjustment::Shrink { large } => {
                let change = step(large);
                let shrunk = current - change;
                if shrunk < MIN_SIZE {
                    (
                        MIN_SIZE,
                        format!(
                            "Size of {} decreased by {} but was limited to the minimum value of {}",
                            entity.id,
                            percent(change),
                            percent(MIN_SIZE)
                        ),
                    )
                } else {
                    (
                        shrunk,
                        format!(
                            "Size of {} decreased by {} to {}",
                            entity.id,
                            percent(change),
                            percent(shrunk)
                        ),
                    )
                }
            }
            DebugAdjustment::Reset => (
                NEUTRAL_SIZE,
                format!("Size of {} reset to {}", entity.id, percent(NEUTRAL_SIZE)),
            ),
            DebugAdjustment::Randomize => {
                let range = self.settings.range_for(&entity.kind);
                let drawn = self.sampler.draw(range, &self.settings);
                (
                    drawn,
                    format!(
                        "Size of {} randomized in the set range to {}",
                        entity.id,
                        percent(drawn)
                    ),
                )
            }
        };

        let size = self.set_assignment(entity, size)?;
        Ok(DebugOutcome { size, message })
    }

    // == Settings ==
    pub fn settings(&self) -> &SizeSettings {
        &self.settings
    }

    /// Validates and applies new settings.
    ///
    /// Transient caches are dropped; durable assignments are kept.
    pub fn update_settings(&mut self, settings: SizeSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.scalar_cache.clear();
        self.meshes.clear();
        info!("size settings updated, caches cleared");
        Ok(())
    }

    // == Phase ==
    pub fn phase(&self) -> PersistencePhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: PersistencePhase) {
        if phase != self.phase {
            debug!(?phase, "persistence phase changed");
        }
        self.phase = phase;
    }

    // == Modifiers ==
    /// Registers a hook run, in registration order, on every freshly cached size.
    pub fn register_modifier<F>(&mut self, modifier: F)
    where
        F: Fn(f32, &Entity) -> f32 + Send + Sync + 'static,
    {
        self.modifiers.push(Box::new(modifier));
        self.scalar_cache.clear();
        self.meshes.clear();
    }

    // == Dirty Set ==
    /// Returns and clears the ids whose visual state needs rebuilding.
    pub fn drain_dirty(&mut self) -> Vec<StableId> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    // == Durable Table ==
    pub fn assignment(&self, id: StableId) -> Option<f32> {
        self.assignments.get(&id).copied()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn snapshot(&self) -> AssignmentSnapshot {
        AssignmentSnapshot::from_map(&self.assignments)
    }

    /// Replaces the durable table with a loaded snapshot.
    ///
    /// All transient caches are dropped and every affected entity is marked dirty.
    pub fn restore(&mut self, snapshot: AssignmentSnapshot) -> usize {
        self.dirty.extend(self.assignments.keys().copied());
        self.assignments = snapshot.into_map();
        self.dirty.extend(self.assignments.keys().copied());
        self.scalar_cache.clear();
        self.meshes.clear();
        info!(count = self.assignments.len(), "size assignments restored");
        self.assignments.len()
    }

    // == Maintenance ==
    /// Sweeps expired entries out of every transient cache.
    pub fn purge_expired(&mut self) -> usize {
        self.scalar_cache.purge_expired() + self.meshes.purge_expired()
    }

    pub fn stats(&self) -> PolicyStats {
        PolicyStats {
            scalar: self.scalar_cache.stats(),
            meshes: self.meshes.stats(),
            assignments: self.assignments.len(),
        }
    }

    fn assignment_or_draw(&mut self, entity: &Entity) -> f32 {
        if let Some(&size) = self.assignments.get(&entity.id) {
            return size;
        }

        let range = self.settings.range_for(&entity.kind);
        let size = self.sampler.draw(range, &self.settings);
        self.assignments.insert(entity.id, size);

        if self.settings.verbose_logging {
            info!(id = %entity.id, kind = %entity.kind, size, "assigned size");
        } else {
            debug!(id = %entity.id, kind = %entity.kind, size, "assigned size");
        }
        size
    }

    fn apply_modifiers(&self, size: f32, entity: &Entity) -> f32 {
        self.modifiers
            .iter()
            .fold(size, |size, modifier| modifier(size, entity))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.phase != PersistencePhase::Inactive {
            return Err(SizingError::InvalidRequest(format!(
                "cannot change sizes while {:?}",
                self.phase
            )));
        }
        Ok(())
    }
}

fn percent(size: f32) -> String {
    format!("{:.0}%", size * 100.0)
}
