//! Damage resolution state machine.
//!
//! A combatant moves through the states of [`LifeState`]:
//!
//! ```text
//! Alive ──lethal──▶ Dead
//!   │                ▲
//!   ├─lethal, ArmsExplosion──▶ Exploding ──fuse / lethal──┘
//!   │                                                      │
//!   └─lethal from trigger, Deferred──▶ PendingDeath ──countdown, replay──┘
//! ```
//!
//! Which branch a lethal hit takes is decided by the combatant's
//! [`DeathPolicy`], looked up once from its kind at spawn time. The
//! transition function itself lives on
//! [`Combatant::apply_damage`](crate::entity::Combatant::apply_damage).
//!
//! # Exactly-once death
//!
//! Hits against a combatant in `PendingDeath` or `Dead` are no-ops. A deferred
//! death replays its cached lethal hit exactly once when the countdown
//! elapses, so `Died` is produced at most once per combatant.

pub mod outcome;

use serde::{Deserialize, Serialize};

pub use outcome::{normalize, DamageOutcome, RawDamageResult};

/// Frames a deferred death holds the body before it is removed.
pub const DEFERRED_DEATH_FRAMES: u32 = 45;

/// Frames between arming and detonation for self-destructing combatants.
pub const DETONATION_FUSE_FRAMES: u32 = 30;

/// What dealt a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// A player projectile.
    Projectile,
    /// A player melee strike.
    Melee,
    /// A hostile projectile striking another hostile.
    FriendlyFire,
    /// An area detonation.
    Explosion,
}

/// Parameters of one damage application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Health to remove.
    pub amount: u32,
    /// Direction of travel of whatever struck, in radians.
    pub angle: Option<f32>,
    /// What dealt the hit.
    pub source: DamageSource,
    /// Set when a cached lethal hit is replayed after a deferred death.
    pub replayed: bool,
}

impl Hit {
    /// Creates a hit with no angle.
    #[must_use]
    pub const fn new(amount: u32, source: DamageSource) -> Self {
        Self {
            amount,
            angle: None,
            source,
            replayed: false,
        }
    }

    /// Sets the incoming angle.
    #[must_use]
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = Some(angle);
        self
    }
}

/// How a combatant reacts to a lethal hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathPolicy {
    /// Die on the lethal hit.
    Immediate,
    /// When the lethal hit comes from `trigger`, hold the body for `frames`
    /// before dying.
    Deferred {
        /// Countdown length.
        frames: u32,
        /// Source that triggers the deferral.
        trigger: DamageSource,
    },
    /// The first lethal hit arms a detonation that goes off after `fuse`
    /// frames.
    ArmsExplosion {
        /// Frames until detonation.
        fuse: u32,
    },
}

/// Lifecycle state of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    /// Normal state.
    Alive,
    /// Detonation armed; still alive and collidable.
    Exploding {
        /// Frames left until detonation.
        fuse: u32,
    },
    /// Lethal hit taken, death deferred. Immobile and ignores damage.
    PendingDeath {
        /// Frames left until the cached hit is replayed.
        frames_left: u32,
        /// The cached lethal hit.
        lethal: Hit,
    },
    /// Terminal.
    Dead,
}

impl LifeState {
    /// Returns true if projectiles and strikes can hit this combatant.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        matches!(self, Self::Alive | Self::Exploding { .. })
    }

    /// Returns true if damage applications are ignored.
    #[must_use]
    pub const fn ignores_damage(&self) -> bool {
        matches!(self, Self::PendingDeath { .. } | Self::Dead)
    }
}

/// A state change produced by a lifecycle timer rather than by a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A deferred death completed; the combatant is now dead.
    DeferredDeath,
    /// An armed detonation went off; the combatant is now dead.
    Detonated,
}

/// Energy a draining projectile spends for removing `health_removed` out of
/// `max_health`.
///
/// Proportional to the fraction of the health bar removed, rounded, and never
/// below one so a draining projectile always runs dry eventually.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn drain_cost(health_removed: u32, max_health: u32, scale: f32) -> u32 {
    if max_health == 0 {
        return 1;
    }
    let cost = (scale * health_removed as f32 / max_health as f32).round();
    if cost.is_finite() && cost >= 1.0 {
        cost as u32
    } else {
        1
    }
}
