//! # Runtime Settings
//!
//! Everything the effect subsystem reads from the host's options, loaded
//! once at startup from TOML.
//!
//! ```toml
//! detail = "high"
//! effects_enabled = true
//! max_objects = 5000
//! rng_seed = 42
//! ```

use std::path::Path;

use nova_shared::MAX_OBJECTS;
use serde::{Deserialize, Serialize};

use crate::error::{FxError, FxResult};

/// Default warp-hole open/close time in seconds.
pub const DEFAULT_WARP_DURATION: f32 = 2.35;

/// Shortest lifetime a warp hole may be given, in seconds.
pub const MIN_WARP_LIFETIME: f32 = 4.0;

/// Texture detail setting; selects the LOD threshold set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Full texture detail - aggressive LOD thresholds.
    #[default]
    High,
    /// Any lower setting - gentler thresholds.
    Normal,
}

/// Runtime settings for the effect subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Texture detail setting.
    pub detail: DetailLevel,
    /// When false, only warp-family effects may spawn.
    pub effects_enabled: bool,
    /// Global live-object budget.
    pub max_objects: usize,
    /// Slots reserved in the instance pool at every level reset.
    pub initial_capacity: usize,
    /// Dedicated server: never request 3D warp models.
    pub standalone: bool,
    /// Seed for facing and angle randomisation.
    pub rng_seed: u64,
    /// Lower bound applied to requested warp lifetimes.
    pub min_warp_lifetime: f32,
    /// Open/close duration used when a spawn does not supply one.
    pub default_warp_duration: f32,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            detail: DetailLevel::High,
            effects_enabled: true,
            max_objects: MAX_OBJECTS,
            initial_capacity: 256,
            standalone: false,
            rng_seed: 0x5EED,
            min_warp_lifetime: MIN_WARP_LIFETIME,
            default_warp_duration: DEFAULT_WARP_DURATION,
        }
    }
}

impl FxConfig {
    /// Parses settings from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidConfig` if the text is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml_str(text: &str) -> FxResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| FxError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a settings file.
    ///
    /// # Errors
    ///
    /// Returns `FxError::Io` if the file cannot be read, or
    /// `FxError::InvalidConfig` if it does not parse.
    pub fn from_toml_file(path: impl AsRef<Path>) -> FxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> FxResult<()> {
        if self.min_warp_lifetime.is_nan() || self.min_warp_lifetime <= 0.0 {
            return Err(FxError::InvalidConfig(format!(
                "min_warp_lifetime must be positive, got {}",
                self.min_warp_lifetime
            )));
        }
        if self.default_warp_duration.is_nan() || self.default_warp_duration <= 0.0 {
            return Err(FxError::InvalidConfig(format!(
                "default_warp_duration must be positive, got {}",
                self.default_warp_duration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = FxConfig::from_toml_str("").unwrap();
        assert_eq!(config, FxConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = FxConfig::from_toml_str(
            r#"
            detail = "normal"
            effects_enabled = false
            rng_seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.detail, DetailLevel::Normal);
        assert!(!config.effects_enabled);
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.max_objects, MAX_OBJECTS);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            FxConfig::from_toml_str("detail = \"ultra\""),
            Err(FxError::InvalidConfig(_))
        ));
        assert!(matches!(
            FxConfig::from_toml_str("min_warp_lifetime = -1.0"),
            Err(FxError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = FxConfig::from_toml_file("/nonexistent/nova_fx.toml").unwrap_err();
        assert!(matches!(err, FxError::Io { .. }));
    }
}
