//! Size Settings Module
//!
//! User-facing configuration consumed read-only by the assignment policy.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};
use crate::sizing::SizeRange;

/// Allowed range for the standard-deviation divisor
pub const SPREAD_DIVISOR_RANGE: (f32, f32) = (2.0, 20.0);

// == Distribution ==
/// How a size is drawn from its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Every value in the range is equally likely
    Uniform,
    /// Centred on the range midpoint, spread = range width / divisor
    #[default]
    Normal,
}

// == Affected Stats ==
/// Which host stats get multiplied by the entity's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectedStats {
    pub body_size: bool,
    pub health_scale: bool,
    pub hunger_rate: bool,
    pub harvest_yield: bool,
    pub melee_damage: bool,
    pub melee_dodge_chance: bool,
    pub lactation_charge: bool,
}

impl Default for AffectedStats {
    fn default() -> Self {
        Self {
            body_size: true,
            health_scale: true,
            hunger_rate: false,
            harvest_yield: false,
            melee_damage: false,
            melee_dodge_chance: false,
            lactation_charge: false,
        }
    }
}

// == Size Settings ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeSettings {
    /// Range used for kinds without an override
    pub default_range: SizeRange,
    /// Per entity-kind range overrides
    pub kind_ranges: HashMap<String, SizeRange>,
    /// Divides the range width to get the normal draw's standard deviation
    pub spread_divisor: f32,
    pub distribution: Distribution,
    /// Clamp normal draws to the configured range instead of accepting tail samples
    pub clamp_to_range: bool,
    /// Mechanoid entities always get the neutral size
    pub ignore_mechanoids: bool,
    /// Log every new size assignment at info level
    pub verbose_logging: bool,
    pub affect: AffectedStats,
}

impl Default for SizeSettings {
    fn default() -> Self {
        Self {
            default_range: SizeRange::default(),
            kind_ranges: HashMap::new(),
            spread_divisor: 6.0,
            distribution: Distribution::Normal,
            clamp_to_range: false,
            ignore_mechanoids: false,
            verbose_logging: false,
            affect: AffectedStats::default(),
        }
    }
}

impl SizeSettings {
    // == Range For ==
    /// Returns the range for an entity kind, falling back to the default range.
    pub fn range_for(&self, kind: &str) -> SizeRange {
        self.kind_ranges
            .get(kind)
            .copied()
            .unwrap_or(self.default_range)
    }

    // == Validate ==
    pub fn validate(&self) -> Result<()> {
        self.default_range.validate()?;
        for (kind, range) in &self.kind_ranges {
            range.validate().map_err(|err| {
                SizingError::InvalidSettings(format!("range for '{}': {}", kind, err))
            })?;
        }

        let (low, high) = SPREAD_DIVISOR_RANGE;
        if !(low..=high).contains(&self.spread_divisor) {
            return Err(SizingError::InvalidSettings(format!(
                "spread divisor {} outside [{}, {}]",
                self.spread_divisor, low, high
            )));
        }
        Ok(())
    }

    // == From Path ==
    /// Loads and validates settings from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            SizingError::InvalidSettings(format!("cannot read {}: {}", path.display(), err))
        })?;
        let settings: SizeSettings = serde_json::from_str(&text).map_err(|err| {
            SizingError::InvalidSettings(format!("cannot parse {}: {}", path.display(), err))
        })?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = SizeSettings::default();
        assert_eq!(settings.default_range, SizeRange::new(0.9, 1.1));
        assert_eq!(settings.distribution, Distribution::Normal);
        assert!(!settings.clamp_to_range);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_range_for_falls_back_to_default() {
        let mut settings = SizeSettings::default();
        settings
            .kind_ranges
            .insert("Thrumbo".to_string(), SizeRange::new(1.5, 2.5));

        assert_eq!(settings.range_for("Thrumbo"), SizeRange::new(1.5, 2.5));
        assert_eq!(settings.range_for("Human"), settings.default_range);
    }

    #[test]
    fn test_validate_rejects_bad_divisor() {
        let settings = SizeSettings {
            spread_divisor: 1.0,
            ..SizeSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SizingError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_validate_names_bad_kind_range() {
        let mut settings = SizeSettings::default();
        settings
            .kind_ranges
            .insert("Boomalope".to_string(), SizeRange::new(2.0, 1.0));

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Boomalope"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"distribution": "uniform", "default_range": {"min": 0.8, "max": 1.2}}"#;
        let settings: SizeSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.distribution, Distribution::Uniform);
        assert_eq!(settings.default_range, SizeRange::new(0.8, 1.2));
        assert_eq!(settings.spread_divisor, 6.0);
        assert!(settings.affect.body_size);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"spread_divisor": 4.0}"#).unwrap();

        let settings = SizeSettings::from_path(&path).unwrap();
        assert_eq!(settings.spread_divisor, 4.0);
    }
}
