//! The player ship.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default player health.
pub const PLAYER_HEALTH: u32 = 5;

/// Default player collision radius.
pub const PLAYER_SIZE: f32 = 10.0;

/// The singleton target of hostile projectiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// World position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Collision radius.
    pub size: f32,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    alive: bool,
}

impl Player {
    /// Creates a player at `position` with default health and size.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size: PLAYER_SIZE,
            health: PLAYER_HEALTH,
            max_health: PLAYER_HEALTH,
            alive: true,
        }
    }

    /// Returns false once the player has taken a lethal hit.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Removes health and returns true if this hit was the lethal one.
    ///
    /// A dead player takes no further damage.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Adds an impulse to the velocity.
    pub fn knockback(&mut self, impulse: Vec2) {
        if impulse.is_finite() {
            self.velocity += impulse;
        }
    }
}
