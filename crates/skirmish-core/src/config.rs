//! Tunable parameters for the combat core.
//!
//! [`CombatConfig`] carries every constant the resolver, the spatial grid, the
//! pools and the metrics need. It is plain data: serde-friendly, defaulted
//! field by field, and checked once with [`CombatConfig::validate`] before a
//! resolver is built from it.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::CombatConfig;
//!
//! let config = CombatConfig::from_json_str(r#"{ "friendly_fire": true }"#).unwrap();
//! assert!(config.friendly_fire);
//! assert_eq!(config.cell_size, 120.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default broad-phase cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f32 = 120.0;

/// Default number of frames kept in the rolling metrics window.
pub const DEFAULT_METRICS_WINDOW: usize = 120;

/// Errors produced when loading or validating a [`CombatConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A float parameter was NaN, infinite, or not strictly positive.
    #[error("`{field}` must be finite and positive, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A float parameter was NaN, infinite, or negative.
    #[error("`{field}` must be finite and non-negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A count parameter was zero.
    #[error("`{field}` must be at least 1")]
    Zero {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Configuration for a [`CombatResolver`](crate::resolver::CombatResolver)
/// and the [`Arena`](crate::arena::Arena) / [`Debris`](crate::effects::Debris)
/// it works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Edge length of a spatial grid cell.
    pub cell_size: f32,
    /// Whether hostile projectiles can strike hostile combatants.
    pub friendly_fire: bool,
    /// Extra points for a kill caused by a hostile projectile.
    pub friendly_fire_bonus: u32,
    /// Energy a draining projectile spends to remove a full health bar.
    pub drain_energy_scale: f32,
    /// Magnitude of the impulse applied to the player on a non-lethal hit.
    pub knockback_strength: f32,
    /// Radius of a self-destruct detonation.
    pub detonation_radius: f32,
    /// Damage a detonation deals to a player inside its radius.
    pub detonation_damage: u32,
    /// Frames after a kill during which the next kill extends the streak.
    pub streak_window_frames: u32,
    /// Number of recent frames averaged by the rolling metrics.
    pub metrics_window: usize,
    /// Free-list capacity of the projectile pool.
    pub projectile_pool_capacity: usize,
    /// Free-list capacity of the floating text pool.
    pub text_pool_capacity: usize,
    /// Free-list capacity of the death fragment pool.
    pub fragment_pool_capacity: usize,
    /// Free-list capacity of the central burst particle pool.
    pub burst_pool_capacity: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            friendly_fire: false,
            friendly_fire_bonus: 50,
            drain_energy_scale: 30.0,
            knockback_strength: 6.0,
            detonation_radius: 90.0,
            detonation_damage: 1,
            streak_window_frames: 90,
            metrics_window: DEFAULT_METRICS_WINDOW,
            projectile_pool_capacity: 512,
            text_pool_capacity: 64,
            fragment_pool_capacity: 256,
            burst_pool_capacity: 128,
        }
    }
}

impl CombatConfig {
    /// Parses a configuration from JSON and validates it.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error from [`CombatConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        tracing::info!(
            cell_size = config.cell_size,
            friendly_fire = config.friendly_fire,
            "loaded combat config"
        );
        Ok(config)
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", self.cell_size)?;
        positive("drain_energy_scale", self.drain_energy_scale)?;
        non_negative("knockback_strength", self.knockback_strength)?;
        non_negative("detonation_radius", self.detonation_radius)?;
        if self.metrics_window == 0 {
            return Err(ConfigError::Zero {
                field: "metrics_window",
            });
        }
        Ok(())
    }

    /// Returns a copy with friendly fire toggled.
    #[must_use]
    pub fn with_friendly_fire(mut self, enabled: bool) -> Self {
        self.friendly_fire = enabled;
        self
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
