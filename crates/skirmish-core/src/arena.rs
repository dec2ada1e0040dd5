//! Live collections the combat core operates on.
//!
//! The Arena owns every combatant, both projectile collections, the optional
//! player and the projectile pool. Spawners populate it between ticks; the
//! [`CombatResolver`](crate::resolver::CombatResolver) borrows it for the
//! duration of a step.
//!
//! # Removal
//!
//! The two collections are removed from differently:
//!
//! - Projectiles are removed immediately with `swap_remove`, and the record
//!   goes back to the pool. Callers iterate projectile indices in descending
//!   order, so the element swapped into a freed slot has already been
//!   visited.
//! - Combatants are never removed mid-pass. A dead combatant is flagged
//!   `MARKED_FOR_REMOVAL` and dropped by [`Arena::sweep_removed`] at the end
//!   of the frame, so indices held by a spatial grid stay valid for the whole
//!   frame.
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::entity::CombatantKind;
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let id = arena.spawn_combatant(CombatantKind::Ranged, Vec2::new(100.0, 200.0));
//! arena.fire_friendly(|p| {
//!     p.launch(Vec2::ZERO, Vec2::new(300.0, 0.0));
//!     p.damage = 1;
//!     p.lifetime = 2.0;
//! });
//!
//! assert_eq!(arena.combatant(id).map(|c| c.position), Some(Vec2::new(100.0, 200.0)));
//! assert_eq!(arena.friendly().len(), 1);
//! ```

use glam::Vec2;

use crate::config::CombatConfig;
use crate::entity::{Combatant, CombatantId, CombatantKind, Player, Projectile, ProjectileOwner};
use crate::pool::{ObjectPool, PoolStats};

/// Default free-list capacity of the projectile pool.
pub const DEFAULT_PROJECTILE_POOL_CAPACITY: usize = 512;

// =============================================================================
// Volley
// =============================================================================

/// Mutable view of one projectile collection plus the pool its records
/// return to.
#[derive(Debug)]
pub struct Volley<'a> {
    projectiles: &'a mut Vec<Projectile>,
    pool: &'a mut ObjectPool<Projectile>,
}

impl Volley<'_> {
    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Returns the projectile at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Projectile> {
        self.projectiles.get(index)
    }

    /// Returns the projectile at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Projectile> {
        self.projectiles.get_mut(index)
    }

    /// Swap-removes the projectile at `index` and releases it to the pool.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.projectiles.len() {
            let projectile = self.projectiles.swap_remove(index);
            self.pool.release(projectile);
        }
    }
}

/// Disjoint mutable borrows of the arena for one collision pass.
#[derive(Debug)]
pub struct ArenaParts<'a> {
    /// Every combatant, indexed as the spatial grid indexes them.
    pub combatants: &'a mut [Combatant],
    /// The player, if present.
    pub player: Option<&'a mut Player>,
    /// The projectile collection the pass walks.
    pub projectiles: Volley<'a>,
}

// =============================================================================
// Arena
// =============================================================================

/// Storage for everything the combat core resolves.
///
/// Combatant IDs are assigned monotonically and never reused.
#[derive(Debug)]
pub struct Arena {
    /// Monotonically increasing combatant ID counter.
    next_id: u64,
    combatants: Vec<Combatant>,
    friendly: Vec<Projectile>,
    hostile: Vec<Projectile>,
    player: Option<Player>,
    /// Current simulation tick.
    tick: u64,
    projectile_pool: ObjectPool<Projectile>,
}

impl Arena {
    /// Creates an empty arena with the default projectile pool capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pool_capacity(DEFAULT_PROJECTILE_POOL_CAPACITY)
    }

    /// Creates an empty arena whose projectile pool keeps at most
    /// `capacity` free records.
    #[must_use]
    pub fn with_pool_capacity(capacity: usize) -> Self {
        Self {
            next_id: 0,
            combatants: Vec::new(),
            friendly: Vec::new(),
            hostile: Vec::new(),
            player: None,
            tick: 0,
            projectile_pool: ObjectPool::new(capacity),
        }
    }

    /// Creates an empty arena sized from `config`.
    #[must_use]
    pub fn from_config(config: &CombatConfig) -> Self {
        Self::with_pool_capacity(config.projectile_pool_capacity)
    }

    // -------------------------------------------------------------------------
    // Combatants
    // -------------------------------------------------------------------------

    /// Spawns a combatant of `kind` at `position` and returns its ID.
    pub fn spawn_combatant(&mut self, kind: CombatantKind, position: Vec2) -> CombatantId {
        self.spawn_with(kind, position, |_| {})
    }

    /// Spawns a combatant and lets `init` adjust it before insertion.
    pub fn spawn_with(
        &mut self,
        kind: CombatantKind,
        position: Vec2,
        init: impl FnOnce(&mut Combatant),
    ) -> CombatantId {
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;

        let mut combatant = Combatant::new(id, kind, position);
        init(&mut combatant);
        self.combatants.push(combatant);
        id
    }

    /// Returns a combatant by ID.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    /// Returns a combatant by ID, mutably.
    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id() == id)
    }

    /// All combatants, in spawn order minus removals.
    #[must_use]
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// All combatants, mutably. The collection itself cannot be resized.
    pub fn combatants_mut(&mut self) -> &mut [Combatant] {
        &mut self.combatants
    }

    /// Drops every combatant flagged for removal and returns how many went.
    pub fn sweep_removed(&mut self) -> usize {
        let before = self.combatants.len();
        self.combatants.retain(|c| !c.is_marked_for_removal());
        let removed = before - self.combatants.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.combatants.len(), "swept dead combatants");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Projectiles
    // -------------------------------------------------------------------------

    /// Fires a player projectile initialized by `init`.
    ///
    /// The record comes from the projectile pool already cleared; the owner
    /// is forced to [`ProjectileOwner::Player`].
    pub fn fire_friendly(&mut self, init: impl FnOnce(&mut Projectile)) {
        let projectile = self.projectile_pool.acquire(|p| {
            init(p);
            p.owner = ProjectileOwner::Player;
        });
        self.friendly.push(projectile);
    }

    /// Fires a hostile projectile owned by `owner`.
    pub fn fire_hostile(&mut self, owner: CombatantId, init: impl FnOnce(&mut Projectile)) {
        let projectile = self.projectile_pool.acquire(|p| {
            init(p);
            p.owner = ProjectileOwner::Combatant(owner);
        });
        self.hostile.push(projectile);
    }

    /// Player projectiles in flight.
    #[must_use]
    pub fn friendly(&self) -> &[Projectile] {
        &self.friendly
    }

    /// Hostile projectiles in flight.
    #[must_use]
    pub fn hostile(&self) -> &[Projectile] {
        &self.hostile
    }

    /// Swap-removes a player projectile and returns it to the pool.
    pub fn remove_friendly(&mut self, index: usize) {
        self.split_friendly().projectiles.remove(index);
    }

    /// Swap-removes a hostile projectile and returns it to the pool.
    pub fn remove_hostile(&mut self, index: usize) {
        self.split_hostile().projectiles.remove(index);
    }

    /// Moves every projectile by `dt` seconds and releases the expired ones.
    pub fn advance_projectiles(&mut self, dt: f32) {
        let pool = &mut self.projectile_pool;
        for list in [&mut self.friendly, &mut self.hostile] {
            for i in (0..list.len()).rev() {
                list[i].advance(dt);
                if list[i].is_expired() {
                    pool.release(list.swap_remove(i));
                }
            }
        }
    }

    /// Usage counters of the projectile pool.
    #[must_use]
    pub fn projectile_pool_stats(&self) -> PoolStats {
        self.projectile_pool.stats()
    }

    /// Borrows combatants, player and player projectiles together.
    pub fn split_friendly(&mut self) -> ArenaParts<'_> {
        ArenaParts {
            combatants: &mut self.combatants,
            player: self.player.as_mut(),
            projectiles: Volley {
                projectiles: &mut self.friendly,
                pool: &mut self.projectile_pool,
            },
        }
    }

    /// Borrows combatants, player and hostile projectiles together.
    pub fn split_hostile(&mut self) -> ArenaParts<'_> {
        ArenaParts {
            combatants: &mut self.combatants,
            player: self.player.as_mut(),
            projectiles: Volley {
                projectiles: &mut self.hostile,
                pool: &mut self.projectile_pool,
            },
        }
    }

    // -------------------------------------------------------------------------
    // Player
    // -------------------------------------------------------------------------

    /// Places (or replaces) the player.
    pub fn set_player(&mut self, player: Player) {
        self.player = Some(player);
    }

    /// Removes the player.
    pub fn clear_player(&mut self) -> Option<Player> {
        self.player.take()
    }

    /// Returns the player, if present.
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Returns the player mutably, if present.
    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    // -------------------------------------------------------------------------
    // Ticks
    // -------------------------------------------------------------------------

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
