//! Projectiles fired by the player or by hostile combatants.
//!
//! A projectile remembers where it was on the previous frame so collision
//! tests can sweep the whole segment it travelled, not just its endpoint.
//! Projectiles are pooled records (see [`crate::pool`]); their `struck` list
//! keeps its buffer across reuse.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::CombatantId;
use crate::pool::Recyclable;

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileOwner {
    /// The player.
    #[default]
    Player,
    /// A specific hostile combatant.
    Combatant(CombatantId),
}

/// Behaviour of a projectile on contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Destroyed on its first hit.
    #[default]
    Standard,
    /// Survives hits by spending energy; destroyed when energy runs out.
    Draining {
        /// Remaining energy budget.
        energy: u32,
    },
}

/// A projectile in flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Current position.
    pub position: Vec2,
    /// Position on the previous frame.
    pub previous: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Damage dealt per hit.
    pub damage: u32,
    /// Collision radius.
    pub size: f32,
    /// Who fired it.
    pub owner: ProjectileOwner,
    /// Contact behaviour.
    pub kind: ProjectileKind,
    /// Seconds left before it expires.
    pub lifetime: f32,
    struck: Vec<CombatantId>,
}

impl Recyclable for Projectile {
    fn clear(&mut self) {
        self.position = Vec2::ZERO;
        self.previous = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.damage = 0;
        self.size = 0.0;
        self.owner = ProjectileOwner::Player;
        self.kind = ProjectileKind::Standard;
        self.lifetime = 0.0;
        self.struck.clear();
    }
}

impl Projectile {
    /// Places the projectile at `position` moving at `velocity`, with no
    /// sweep history.
    pub fn launch(&mut self, position: Vec2, velocity: Vec2) {
        self.position = position;
        self.previous = position;
        self.velocity = velocity;
    }

    /// Returns the segment travelled since the last frame.
    ///
    /// A non-finite previous position collapses the sweep onto the current
    /// position. If only the previous position is finite it is used for both
    /// ends. Returns `None` when neither is usable.
    #[must_use]
    pub fn sweep(&self) -> Option<(Vec2, Vec2)> {
        match (self.previous.is_finite(), self.position.is_finite()) {
            (true, true) => Some((self.previous, self.position)),
            (false, true) => Some((self.position, self.position)),
            (true, false) => Some((self.previous, self.previous)),
            (false, false) => None,
        }
    }

    /// Returns the collision radius, treating a non-finite or negative size
    /// as zero.
    #[must_use]
    pub fn radius(&self) -> f32 {
        if self.size.is_finite() {
            self.size.max(0.0)
        } else {
            0.0
        }
    }

    /// Returns the unit direction of travel, or zero if stationary.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        let dir = self.velocity.normalize_or_zero();
        if dir != Vec2::ZERO {
            return dir;
        }
        match self.sweep() {
            Some((from, to)) => (to - from).normalize_or_zero(),
            None => Vec2::ZERO,
        }
    }

    /// Returns true if `id` fired this projectile.
    #[must_use]
    pub fn is_owned_by(&self, id: CombatantId) -> bool {
        self.owner == ProjectileOwner::Combatant(id)
    }

    /// Returns true for the energy-draining variant.
    #[must_use]
    pub const fn is_draining(&self) -> bool {
        matches!(self.kind, ProjectileKind::Draining { .. })
    }

    /// Returns the remaining energy of a draining projectile.
    #[must_use]
    pub const fn energy(&self) -> Option<u32> {
        match self.kind {
            ProjectileKind::Draining { energy } => Some(energy),
            ProjectileKind::Standard => None,
        }
    }

    /// Debits `cost` from a draining projectile's energy and returns what is
    /// left. Standard projectiles report zero.
    pub fn drain(&mut self, cost: u32) -> u32 {
        match &mut self.kind {
            ProjectileKind::Draining { energy } => {
                *energy = energy.saturating_sub(cost);
                *energy
            }
            ProjectileKind::Standard => 0,
        }
    }

    /// Returns true if this projectile already hit `id`.
    #[must_use]
    pub fn has_struck(&self, id: CombatantId) -> bool {
        self.struck.contains(&id)
    }

    /// Records a hit on `id`.
    pub fn record_strike(&mut self, id: CombatantId) {
        if !self.has_struck(id) {
            self.struck.push(id);
        }
    }

    /// Moves the projectile one step, remembering the old position.
    pub fn advance(&mut self, dt: f32) {
        self.previous = self.position;
        self.position += self.velocity * dt;
        self.lifetime -= dt;
    }

    /// Returns true once the lifetime has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.lifetime <= 0.0
    }
}
