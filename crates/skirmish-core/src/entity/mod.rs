//! Entity types for the combat core.
//!
//! This module provides the records the resolver reads and mutates each tick:
//! - [`CombatantId`]: Stable identifier used for ownership checks
//! - [`CombatantKind`]: Kind tag selecting a [`KindProfile`]
//! - [`Combatant`]: A hostile unit, including its damage state machine
//! - [`Projectile`]: A friendly or hostile shot
//! - [`Player`]: The singleton victim of hostile fire
//!
//! # Per-kind behaviour
//!
//! Kind-specific rules (health, size, score, and above all what happens on a
//! lethal hit) come from a single table, [`CombatantKind::profile`]. Nothing
//! else in the crate branches on the kind to decide lifecycle behaviour.
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{Combatant, CombatantId, CombatantKind};
//! use skirmish_core::damage::{DamageOutcome, DamageSource, Hit};
//! use glam::Vec2;
//!
//! let mut grunt = Combatant::new(CombatantId::new(1), CombatantKind::Melee, Vec2::ZERO);
//! assert_eq!(grunt.health, 2);
//!
//! assert_eq!(grunt.apply_damage(Hit::new(1, DamageSource::Projectile)), DamageOutcome::Damaged);
//! assert_eq!(grunt.apply_damage(Hit::new(1, DamageSource::Projectile)), DamageOutcome::Died);
//! assert!(grunt.is_marked_for_removal());
//! ```

pub mod player;
pub mod projectile;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::damage::{
    DamageOutcome, DamageSource, DeathPolicy, Hit, LifeState, LifecycleEvent,
    DEFERRED_DEATH_FRAMES, DETONATION_FUSE_FRAMES,
};

pub use player::Player;
pub use projectile::{Projectile, ProjectileKind, ProjectileOwner};

/// Unique identifier for a combatant.
///
/// `CombatantId` stays attached to a combatant for its whole life, unlike its
/// index in the arena which changes when dead combatants are swept. Hostile
/// projectiles record their shooter's id to exclude it from friendly fire.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::CombatantId;
///
/// let a = CombatantId::new(1);
/// let b = CombatantId::new(2);
///
/// assert!(a < b);
/// assert_eq!(a.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates a new `CombatantId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Kind of hostile unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    /// Keeps its distance and shoots.
    Ranged,
    /// Closes in for contact damage.
    Melee,
    /// Slow and tough. Dies slowly when finished off in melee.
    Heavy,
    /// Arms a detonation on its first lethal hit.
    Kamikaze,
}

impl CombatantKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 4] = [Self::Ranged, Self::Melee, Self::Heavy, Self::Kamikaze];

    /// Returns the stat and policy table entry for this kind.
    #[must_use]
    pub const fn profile(self) -> KindProfile {
        match self {
            Self::Ranged => KindProfile {
                max_health: 3,
                size: 14.0,
                score: 100,
                death_policy: DeathPolicy::Immediate,
                shake: 2.0,
            },
            Self::Melee => KindProfile {
                max_health: 2,
                size: 12.0,
                score: 75,
                death_policy: DeathPolicy::Immediate,
                shake: 1.5,
            },
            Self::Heavy => KindProfile {
                max_health: 10,
                size: 24.0,
                score: 300,
                death_policy: DeathPolicy::Deferred {
                    frames: DEFERRED_DEATH_FRAMES,
                    trigger: DamageSource::Melee,
                },
                shake: 6.0,
            },
            Self::Kamikaze => KindProfile {
                max_health: 2,
                size: 12.0,
                score: 150,
                death_policy: DeathPolicy::ArmsExplosion {
                    fuse: DETONATION_FUSE_FRAMES,
                },
                shake: 8.0,
            },
        }
    }
}

impl fmt::Display for CombatantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranged => write!(f, "Ranged"),
            Self::Melee => write!(f, "Melee"),
            Self::Heavy => write!(f, "Heavy"),
            Self::Kamikaze => write!(f, "Kamikaze"),
        }
    }
}

/// Per-kind stats and lifecycle policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindProfile {
    /// Starting and maximum health.
    pub max_health: u32,
    /// Collision radius.
    pub size: f32,
    /// Points awarded for a kill.
    pub score: u32,
    /// Reaction to a lethal hit.
    pub death_policy: DeathPolicy,
    /// Camera shake intensity on death.
    pub shake: f32,
}

bitflags! {
    /// Lifecycle flags on a combatant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LifeFlags: u8 {
        /// Terminal; swept from the arena at end of frame.
        const MARKED_FOR_REMOVAL = 1 << 0;
        /// Movement input is ignored.
        const IMMOBILE = 1 << 1;
    }
}

/// A hostile unit.
///
/// Position, velocity, health and size are plain fields owned by whoever
/// spawns and steers the combatant. The lifecycle state only changes through
/// [`Combatant::apply_damage`] and [`Combatant::advance_lifecycle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    kind: CombatantKind,
    /// World position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Collision radius.
    pub size: f32,
    /// Reaction to a lethal hit.
    pub death_policy: DeathPolicy,
    state: LifeState,
    flags: LifeFlags,
}

impl Combatant {
    /// Creates a combatant with the stats of its kind's profile.
    #[must_use]
    pub fn new(id: CombatantId, kind: CombatantKind, position: Vec2) -> Self {
        let profile = kind.profile();
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            health: profile.max_health,
            max_health: profile.max_health,
            size: profile.size,
            death_policy: profile.death_policy,
            state: LifeState::Alive,
            flags: LifeFlags::empty(),
        }
    }

    /// Returns the combatant's id.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Returns the combatant's kind.
    #[must_use]
    pub const fn kind(&self) -> CombatantKind {
        self.kind
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifeState {
        self.state
    }

    /// Returns the lifecycle flags.
    #[must_use]
    pub const fn flags(&self) -> LifeFlags {
        self.flags
    }

    /// Returns true once the combatant is terminal.
    #[must_use]
    pub const fn is_marked_for_removal(&self) -> bool {
        self.flags.contains(LifeFlags::MARKED_FOR_REMOVAL)
    }

    /// Returns true while a deferred death is counting down.
    #[must_use]
    pub const fn is_pending_death(&self) -> bool {
        matches!(self.state, LifeState::PendingDeath { .. })
    }

    /// Returns true while an armed detonation is counting down.
    #[must_use]
    pub const fn is_exploding(&self) -> bool {
        matches!(self.state, LifeState::Exploding { .. })
    }

    /// Returns true if projectiles and strikes can hit this combatant.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        !self.is_marked_for_removal() && self.state.is_targetable()
    }

    /// Applies one hit and returns the resulting outcome.
    ///
    /// Hits on a combatant that is pending death or dead change nothing and
    /// report [`DamageOutcome::Damaged`], so death effects fire only once.
    pub fn apply_damage(&mut self, hit: Hit) -> DamageOutcome {
        if self.state.ignores_damage() {
            return DamageOutcome::Damaged;
        }

        self.health = self.health.saturating_sub(hit.amount);
        if self.health > 0 {
            return DamageOutcome::Damaged;
        }

        match (self.death_policy, self.state) {
            (DeathPolicy::Deferred { frames, trigger }, LifeState::Alive)
                if hit.source == trigger && !hit.replayed && frames > 0 =>
            {
                self.state = LifeState::PendingDeath {
                    frames_left: frames,
                    lethal: hit,
                };
                self.velocity = Vec2::ZERO;
                self.flags.insert(LifeFlags::IMMOBILE);
                tracing::debug!(id = %self.id, kind = %self.kind, frames, "death deferred");
                DamageOutcome::Exploding
            }
            (DeathPolicy::ArmsExplosion { fuse }, LifeState::Alive) if !hit.replayed && fuse > 0 => {
                self.state = LifeState::Exploding { fuse };
                tracing::debug!(id = %self.id, kind = %self.kind, fuse, "detonation armed");
                DamageOutcome::Exploding
            }
            _ => {
                self.kill();
                DamageOutcome::Died
            }
        }
    }

    /// Advances lifecycle timers by one tick.
    ///
    /// A deferred death replays its cached lethal hit when the countdown
    /// reaches zero; an armed detonation goes off when its fuse runs out.
    pub fn advance_lifecycle(&mut self) -> Option<LifecycleEvent> {
        match self.state {
            LifeState::PendingDeath {
                frames_left,
                lethal,
            } => {
                let frames_left = frames_left.saturating_sub(1);
                if frames_left > 0 {
                    self.state = LifeState::PendingDeath {
                        frames_left,
                        lethal,
                    };
                    return None;
                }
                self.state = LifeState::Alive;
                let replay = Hit {
                    replayed: true,
                    ..lethal
                };
                let outcome = self.apply_damage(replay);
                outcome.is_kill().then_some(LifecycleEvent::DeferredDeath)
            }
            LifeState::Exploding { fuse } => {
                let fuse = fuse.saturating_sub(1);
                if fuse > 0 {
                    self.state = LifeState::Exploding { fuse };
                    return None;
                }
                self.kill();
                Some(LifecycleEvent::Detonated)
            }
            LifeState::Alive | LifeState::Dead => None,
        }
    }

    /// Sets the velocity unless the combatant is immobile.
    pub fn steer(&mut self, velocity: Vec2) {
        if !self.flags.contains(LifeFlags::IMMOBILE) {
            self.velocity = velocity;
        }
    }

    /// Moves the combatant by its velocity unless it is immobile or dead.
    pub fn integrate(&mut self, dt: f32) {
        if self.flags.intersects(LifeFlags::IMMOBILE | LifeFlags::MARKED_FOR_REMOVAL) {
            return;
        }
        self.position += self.velocity * dt;
    }

    fn kill(&mut self) {
        self.health = 0;
        self.state = LifeState::Dead;
        self.flags.insert(LifeFlags::MARKED_FOR_REMOVAL);
        tracing::debug!(id = %self.id, kind = %self.kind, "combatant died");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(kind: CombatantKind) -> Combatant {
        Combatant::new(CombatantId::new(7), kind, Vec2::new(10.0, 20.0))
    }

    fn shot(amount: u32) -> Hit {
        Hit::new(amount, DamageSource::Projectile)
    }

    fn melee(amount: u32) -> Hit {
        Hit::new(amount, DamageSource::Melee)
    }

    mod combatant_id_tests {
        use super::*;

        #[test]
        fn display_and_debug() {
            let id = CombatantId::new(42);
            assert_eq!(format!("{id}"), "42");
            assert_eq!(format!("{id:?}"), "CombatantId(42)");
        }

        #[test]
        fn from_u64() {
            let id: CombatantId = 9.into();
            assert_eq!(id.as_u64(), 9);
        }
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn new_uses_profile_stats() {
            for kind in CombatantKind::ALL {
                let profile = kind.profile();
                let combatant = spawn(kind);
                assert_eq!(combatant.health, profile.max_health);
                assert_eq!(combatant.max_health, profile.max_health);
                assert_eq!(combatant.size, profile.size);
                assert_eq!(combatant.death_policy, profile.death_policy);
                assert_eq!(combatant.state(), LifeState::Alive);
            }
        }

        #[test]
        fn only_heavy_defers_and_only_kamikaze_explodes() {
            for kind in CombatantKind::ALL {
                let policy = kind.profile().death_policy;
                assert_eq!(
                    matches!(policy, DeathPolicy::Deferred { .. }),
                    kind == CombatantKind::Heavy
                );
                assert_eq!(
                    matches!(policy, DeathPolicy::ArmsExplosion { .. }),
                    kind == CombatantKind::Kamikaze
                );
            }
        }
    }

    mod apply_damage_tests {
        use super::*;

        #[test]
        fn two_hits_of_one_kill_two_health() {
            let mut grunt = spawn(CombatantKind::Melee);

            assert_eq!(grunt.apply_damage(shot(1)), DamageOutcome::Damaged);
            assert_eq!(grunt.health, 1);
            assert_eq!(grunt.apply_damage(shot(1)), DamageOutcome::Died);
            assert_eq!(grunt.health, 0);
            assert!(grunt.is_marked_for_removal());
            assert_eq!(grunt.state(), LifeState::Dead);
        }

        #[test]
        fn overkill_clamps_health_at_zero() {
            let mut grunt = spawn(CombatantKind::Ranged);
            assert_eq!(grunt.apply_damage(shot(100)), DamageOutcome::Died);
            assert_eq!(grunt.health, 0);
        }

        #[test]
        fn dead_ignores_further_hits() {
            let mut grunt = spawn(CombatantKind::Melee);
            grunt.apply_damage(shot(5));

            assert_eq!(grunt.apply_damage(shot(5)), DamageOutcome::Damaged);
            assert_eq!(grunt.state(), LifeState::Dead);
        }

        #[test]
        fn zero_damage_is_damaged() {
            let mut grunt = spawn(CombatantKind::Melee);
            assert_eq!(grunt.apply_damage(shot(0)), DamageOutcome::Damaged);
            assert_eq!(grunt.health, 2);
        }
    }

    mod deferred_death_tests {
        use super::*;

        #[test]
        fn melee_lethal_hit_defers() {
            let mut heavy = spawn(CombatantKind::Heavy);
            heavy.velocity = Vec2::new(5.0, 0.0);

            assert_eq!(heavy.apply_damage(melee(10)), DamageOutcome::Exploding);
            assert!(heavy.is_pending_death());
            assert!(!heavy.is_marked_for_removal());
            assert!(!heavy.is_targetable());
            assert_eq!(heavy.velocity, Vec2::ZERO);
            assert!(heavy.flags().contains(LifeFlags::IMMOBILE));
        }

        #[test]
        fn projectile_lethal_hit_dies_immediately() {
            let mut heavy = spawn(CombatantKind::Heavy);
            assert_eq!(heavy.apply_damage(shot(10)), DamageOutcome::Died);
        }

        #[test]
        fn pending_ignores_damage_and_movement() {
            let mut heavy = spawn(CombatantKind::Heavy);
            heavy.apply_damage(melee(10));

            assert_eq!(heavy.apply_damage(shot(3)), DamageOutcome::Damaged);
            assert_eq!(heavy.apply_damage(melee(3)), DamageOutcome::Damaged);
            assert!(heavy.is_pending_death());

            heavy.steer(Vec2::new(9.0, 9.0));
            heavy.integrate(1.0);
            assert_eq!(heavy.velocity, Vec2::ZERO);
            assert_eq!(heavy.position, Vec2::new(10.0, 20.0));
        }

        #[test]
        fn dies_exactly_when_countdown_ends() {
            let mut heavy = spawn(CombatantKind::Heavy);
            heavy.apply_damage(melee(10));

            for _ in 1..DEFERRED_DEATH_FRAMES {
                assert_eq!(heavy.advance_lifecycle(), None);
                assert!(heavy.is_pending_death());
            }
            assert_eq!(
                heavy.advance_lifecycle(),
                Some(LifecycleEvent::DeferredDeath)
            );
            assert!(heavy.is_marked_for_removal());
            assert_eq!(heavy.advance_lifecycle(), None);
        }

        #[test]
        fn zero_frame_deferral_dies_immediately() {
            let mut heavy = spawn(CombatantKind::Heavy);
            heavy.death_policy = DeathPolicy::Deferred {
                frames: 0,
                trigger: DamageSource::Melee,
            };
            assert_eq!(heavy.apply_damage(melee(10)), DamageOutcome::Died);
        }
    }

    mod explosion_tests {
        use super::*;

        #[test]
        fn first_lethal_hit_arms() {
            let mut bomber = spawn(CombatantKind::Kamikaze);
            assert_eq!(bomber.apply_damage(shot(2)), DamageOutcome::Exploding);
            assert!(bomber.is_exploding());
            assert!(bomber.is_targetable());
        }

        #[test]
        fn second_hit_while_armed_kills() {
            let mut bomber = spawn(CombatantKind::Kamikaze);
            bomber.apply_damage(shot(2));
            assert_eq!(bomber.apply_damage(shot(1)), DamageOutcome::Died);
            assert!(bomber.is_marked_for_removal());
        }

        #[test]
        fn fuse_detonates() {
            let mut bomber = spawn(CombatantKind::Kamikaze);
            bomber.apply_damage(shot(2));

            for _ in 1..DETONATION_FUSE_FRAMES {
                assert_eq!(bomber.advance_lifecycle(), None);
            }
            assert_eq!(bomber.advance_lifecycle(), Some(LifecycleEvent::Detonated));
            assert!(bomber.is_marked_for_removal());
        }

        #[test]
        fn armed_bomber_keeps_moving() {
            let mut bomber = spawn(CombatantKind::Kamikaze);
            bomber.apply_damage(shot(2));
            bomber.steer(Vec2::new(1.0, 0.0));
            bomber.integrate(2.0);
            assert_eq!(bomber.position, Vec2::new(12.0, 20.0));
        }
    }
}
