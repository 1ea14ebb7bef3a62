//! Save/Load of the durable size table
//!
//! The table is stored as JSON keyed by stable id. Older saves keyed sizes
//! by object-reference strings (`"Thing_Human1234"`); those are migrated by
//! recovering the numeric suffix, skipping entries that cannot be recovered.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, SizingError};
use crate::sizing::{clamp_to_bounds, StableId};

/// Version number for the snapshot format (increment when format changes)
pub const SNAPSHOT_VERSION: u32 = 2;

// == Snapshot ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: StableId,
    pub size: f32,
}

/// Serializable copy of the durable size table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSnapshot {
    pub version: u32,
    pub assignments: Vec<AssignmentRecord>,
}

impl Default for AssignmentSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            assignments: Vec::new(),
        }
    }
}

impl AssignmentSnapshot {
    /// Builds a snapshot ordered by id.
    pub fn from_map(assignments: &HashMap<StableId, f32>) -> Self {
        let mut records: Vec<AssignmentRecord> = assignments
            .iter()
            .map(|(id, size)| AssignmentRecord {
                id: *id,
                size: *size,
            })
            .collect();
        records.sort_by_key(|record| record.id);

        Self {
            version: SNAPSHOT_VERSION,
            assignments: records,
        }
    }

    /// Converts into a table, dropping non-finite sizes and bounding the rest
    /// to `[MIN_SIZE, MAX_SIZE]`.
    pub fn into_map(self) -> HashMap<StableId, f32> {
        self.assignments
            .into_iter()
            .filter(|record| {
                let keep = record.size.is_finite();
                if !keep {
                    warn!(id = %record.id, "skipping non-finite stored size");
                }
                keep
            })
            .map(|record| (record.id, bounded(record.id, record.size)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

// == Legacy Format ==
/// Reference-keyed table written by older versions, as parallel lists.
#[derive(Debug, Deserialize)]
struct LegacySnapshot {
    keys: Vec<Value>,
    values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Current(AssignmentSnapshot),
    Legacy(LegacySnapshot),
}

/// Result of converting a legacy table.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub snapshot: AssignmentSnapshot,
    pub migrated: usize,
    pub skipped: usize,
}

fn bounded(id: StableId, size: f32) -> f32 {
    let clamped = clamp_to_bounds(size);
    if clamped != size {
        warn!(%id, size, clamped, "stored size out of bounds, clamped");
    }
    clamped
}

// == Legacy Id ==
/// Recovers the stable id from a legacy reference string such as
/// `"Thing_Human1234"`, i.e. its trailing decimal digits.
pub fn parse_legacy_id(reference: &str) -> Option<StableId> {
    let digits_start = reference
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(index, _)| index)?;

    reference[digits_start..].parse::<u64>().ok().map(StableId)
}

fn migrate_legacy(legacy: LegacySnapshot) -> Migration {
    let mut table: HashMap<StableId, f32> = HashMap::new();
    let mut skipped = 0;

    if legacy.keys.len() != legacy.values.len() {
        warn!(
            keys = legacy.keys.len(),
            values = legacy.values.len(),
            "legacy size table has mismatched lists, unpaired entries skipped"
        );
        skipped += legacy.keys.len().abs_diff(legacy.values.len());
    }

    for (index, (key, value)) in legacy.keys.iter().zip(legacy.values.iter()).enumerate() {
        let id = key.as_str().and_then(parse_legacy_id);
        let size = value
            .as_f64()
            .map(|size| size as f32)
            .filter(|size| size.is_finite());

        match (id, size) {
            (Some(id), Some(size)) => {
                if table.insert(id, bounded(id, size)).is_some() {
                    warn!(%id, "duplicate legacy size entry, keeping the later one");
                }
            }
            _ => {
                warn!(index, %key, %value, "skipping unreadable legacy size entry");
                skipped += 1;
            }
        }
    }

    let snapshot = AssignmentSnapshot::from_map(&table);
    Migration {
        migrated: snapshot.len(),
        snapshot,
        skipped,
    }
}

// == Load ==
/// Decodes a snapshot in either the current or the legacy format.
pub fn load_snapshot(text: &str) -> Result<AssignmentSnapshot> {
    let document: SnapshotDocument = serde_json::from_str(text)?;

    match document {
        SnapshotDocument::Current(snapshot) => {
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(SizingError::Persistence(format!(
                    "unsupported snapshot version {}",
                    snapshot.version
                )));
            }
            Ok(snapshot)
        }
        SnapshotDocument::Legacy(legacy) => {
            let migration = migrate_legacy(legacy);
            info!(
                migrated = migration.migrated,
                skipped = migration.skipped,
                "migrated legacy size table"
            );
            Ok(migration.snapshot)
        }
    }
}

/// Loads a snapshot from disk. A missing file is not an error.
pub fn load_from_path(path: &Path) -> Result<Option<AssignmentSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    load_snapshot(&text).map(Some)
}

// == Save ==
/// Writes a snapshot to disk via a temporary sibling file.
pub fn save_to_path(snapshot: &AssignmentSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let staging = path.with_extension("tmp");
    fs::write(&staging, json)?;
    fs::rename(&staging, path)?;
    Ok(())
}
