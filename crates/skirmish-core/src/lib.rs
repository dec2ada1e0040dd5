//! # Skirmish Core
//!
//! Real-time combat resolution for a 2D arcade shooter.
//!
//! Every simulation tick the core decides which projectiles strike which
//! combatants, what happens to a struck combatant, and which effects the
//! renderer, mixer and scoreboard should play. Effects leave the core as
//! [`CombatEvent`](effects::CombatEvent)s through an
//! [`EffectSink`](effects::EffectSink); nothing flows back.
//!
//! ## Layout
//!
//! - [`arena`]: live combatants, projectiles and the player
//! - [`spatial`]: per-frame uniform grid broad phase
//! - [`damage`]: outcomes, death policies and lifecycle states
//! - [`entity`]: combatants, projectiles, the player
//! - [`resolver`]: the per-tick collision passes
//! - [`effects`]: event types, sinks and pooled debris
//! - [`pool`]: free-list object pool for short-lived records
//! - [`metrics`]: frame and rolling collision counters
//! - [`config`]: tunables
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::{Arena, CombatConfig, CombatResolver, CombatantKind, Player};
//! use skirmish_core::effects::NullSink;
//! use glam::Vec2;
//!
//! let config = CombatConfig::default();
//! let mut arena = Arena::from_config(&config);
//! arena.set_player(Player::new(Vec2::ZERO));
//! arena.spawn_combatant(CombatantKind::Ranged, Vec2::new(200.0, 0.0));
//!
//! let mut resolver = CombatResolver::new(config);
//! resolver.step(&mut arena, &mut NullSink);
//! assert_eq!(arena.current_tick(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod config;
pub mod damage;
pub mod effects;
pub mod entity;
pub mod metrics;
pub mod pool;
pub mod resolver;
pub mod spatial;

pub use arena::Arena;
pub use config::{CombatConfig, ConfigError};
pub use damage::{DamageOutcome, DamageSource, Hit};
pub use effects::{CombatEvent, EffectSink};
pub use entity::{Combatant, CombatantId, CombatantKind, Player, Projectile};
pub use metrics::PerformanceSnapshot;
pub use resolver::{CombatResolver, MeleeStrike};

#[cfg(test)]
mod tests;
