//! Per-tick collision resolution.
//!
//! [`CombatResolver::step`] runs once per simulation tick against an
//! [`Arena`]:
//!
//! 1. Reset the frame counters with the current population.
//! 2. Advance lifecycle timers. Deferred deaths and detonations that complete
//!    here run the death pipeline.
//! 3. Rebuild the [`SpatialGrid`] from the combatants.
//! 4. Run the collision passes in order.
//! 5. Fold the frame into the rolling metrics.
//! 6. Sweep dead combatants, advance the kill streak window and the tick.
//!
//! # Passes
//!
//! Each pass implements [`CollisionPass`] and receives a [`PassContext`]
//! borrowing the arena, the grid, the frame counters and the effect
//! dispatcher for the duration of its run.
//!
//! - [`FriendlyPass`]: player projectiles against combatants
//! - [`PlayerPass`]: hostile projectiles against the player
//! - [`FriendlyFirePass`]: hostile projectiles against other combatants
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::config::CombatConfig;
//! use skirmish_core::effects::CombatEvent;
//! use skirmish_core::entity::CombatantKind;
//! use skirmish_core::resolver::CombatResolver;
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let target = arena.spawn_combatant(CombatantKind::Melee, Vec2::new(50.0, 0.0));
//! for _ in 0..2 {
//!     arena.fire_friendly(|p| {
//!         p.previous = Vec2::ZERO;
//!         p.position = Vec2::new(100.0, 0.0);
//!         p.damage = 1;
//!         p.size = 2.0;
//!         p.lifetime = 1.0;
//!     });
//! }
//!
//! let mut resolver = CombatResolver::new(CombatConfig::default());
//! let mut events: Vec<CombatEvent> = Vec::new();
//! resolver.step(&mut arena, &mut events);
//!
//! assert!(events.contains(&CombatEvent::CombatantKilled {
//!     id: target,
//!     kind: CombatantKind::Melee,
//!     position: Vec2::new(50.0, 0.0),
//! }));
//! assert!(arena.combatants().is_empty());
//! ```

mod dispatch;
mod friendly;
mod friendly_fire;
pub mod narrow;
mod player;

pub use dispatch::{Dispatcher, KillStreak};
pub use friendly::FriendlyPass;
pub use friendly_fire::FriendlyFirePass;
pub use player::PlayerPass;

use std::time::Instant;

use glam::Vec2;

use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::damage::{DamageSource, Hit, LifecycleEvent};
use crate::effects::EffectSink;
use crate::metrics::{FrameMetrics, PassKind, PerformanceSnapshot, Population, RollingMetrics};
use crate::spatial::{sanitize_position, SpatialGrid};

use narrow::{circles_overlap, combatant_body};

// =============================================================================
// Pass Trait
// =============================================================================

/// Borrowed state handed to a [`CollisionPass`].
#[derive(Debug)]
pub struct PassContext<'a> {
    /// Active configuration.
    pub config: &'a CombatConfig,
    /// This frame's broad phase; `None` when nothing is targetable.
    pub grid: Option<&'a SpatialGrid>,
    /// Live collections.
    pub arena: &'a mut Arena,
    /// Counters for the frame in progress.
    pub metrics: &'a mut FrameMetrics,
    /// Effect output.
    pub effects: Dispatcher<'a>,
    /// Reusable candidate buffer.
    pub scratch: &'a mut Vec<usize>,
}

/// One ordered collision pass.
///
/// # Example
///
/// ```
/// use skirmish_core::metrics::PassKind;
/// use skirmish_core::resolver::{CollisionPass, PassContext};
///
/// struct CountOnly;
///
/// impl CollisionPass for CountOnly {
///     fn kind(&self) -> PassKind {
///         PassKind::Friendly
///     }
///
///     fn run(&self, ctx: &mut PassContext<'_>) {
///         let n = ctx.arena.friendly().len();
///         ctx.metrics.record_candidates(self.kind(), n);
///     }
/// }
/// ```
pub trait CollisionPass {
    /// Which counters the pass reports into.
    fn kind(&self) -> PassKind;

    /// Resolves this pass's collisions for one frame.
    ///
    /// Projectiles may be removed immediately; combatants are only flagged.
    fn run(&self, ctx: &mut PassContext<'_>);
}

// =============================================================================
// Melee
// =============================================================================

/// A player melee attack: everything overlapping the circle is hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeStrike {
    /// Centre of the strike.
    pub center: Vec2,
    /// Reach of the strike.
    pub radius: f32,
    /// Damage dealt to each combatant struck.
    pub damage: u32,
}

// =============================================================================
// Combat Resolver
// =============================================================================

/// Runs collision resolution each tick.
pub struct CombatResolver {
    config: CombatConfig,
    passes: Vec<Box<dyn CollisionPass>>,
    frame: FrameMetrics,
    rolling: RollingMetrics,
    streak: KillStreak,
    scratch: Vec<usize>,
}

impl std::fmt::Debug for CombatResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatResolver")
            .field("config", &self.config)
            .field("passes", &self.passes.iter().map(|p| p.kind()).collect::<Vec<_>>())
            .field("streak", &self.streak)
            .finish_non_exhaustive()
    }
}

impl CombatResolver {
    /// Creates a resolver with the three standard passes.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let passes: [Box<dyn CollisionPass>; 3] = [
            Box::new(FriendlyPass),
            Box::new(PlayerPass),
            Box::new(FriendlyFirePass),
        ];
        Self::with_passes(config, passes.into())
    }

    /// Creates a resolver running `passes` in the given order.
    #[must_use]
    pub fn with_passes(config: CombatConfig, passes: Vec<Box<dyn CollisionPass>>) -> Self {
        Self {
            rolling: RollingMetrics::new(config.metrics_window),
            streak: KillStreak::new(config.streak_window_frames),
            frame: FrameMetrics::default(),
            scratch: Vec::new(),
            passes,
            config,
        }
    }

    /// Resolves one tick.
    #[tracing::instrument(level = "trace", skip_all, fields(tick = arena.current_tick()))]
    pub fn step(&mut self, arena: &mut Arena, sink: &mut dyn EffectSink) {
        let started = Instant::now();
        self.frame.begin_frame(Population {
            combatants: arena.combatants().len(),
            friendly_projectiles: arena.friendly().len(),
            hostile_projectiles: arena.hostile().len(),
        });

        self.advance_lifecycles(arena, sink);

        let grid = SpatialGrid::build(arena.combatants(), self.config.cell_size);
        if let Some(grid) = &grid {
            tracing::trace!(indexed = grid.len(), cells = grid.occupied_cells(), "grid built");
        }
        for pass in &self.passes {
            let mut ctx = PassContext {
                config: &self.config,
                grid: grid.as_ref(),
                arena: &mut *arena,
                metrics: &mut self.frame,
                effects: Dispatcher::new(&mut *sink, &mut self.streak),
                scratch: &mut self.scratch,
            };
            pass.run(&mut ctx);
        }
        drop(grid);

        self.rolling.finalize_frame(&self.frame, started.elapsed());
        arena.sweep_removed();
        self.streak.tick();
        arena.advance_tick();
    }

    /// Ticks deferred deaths and detonation fuses.
    fn advance_lifecycles(&mut self, arena: &mut Arena, sink: &mut dyn EffectSink) {
        let radius = self.config.detonation_radius;
        let blast = self.config.detonation_damage;
        let mut effects = Dispatcher::new(sink, &mut self.streak);
        let parts = arena.split_friendly();
        let mut player = parts.player;

        for combatant in parts.combatants.iter_mut() {
            match combatant.advance_lifecycle() {
                Some(LifecycleEvent::DeferredDeath) => effects.death(combatant, 0, None),
                Some(LifecycleEvent::Detonated) => {
                    let (center, _) = combatant_body(combatant);
                    effects.detonation(center);
                    effects.death(combatant, 0, None);

                    let Some(player) = player.as_deref_mut() else {
                        continue;
                    };
                    let target = sanitize_position(player.position);
                    if !player.is_alive() || !circles_overlap(center, radius, target, 0.0) {
                        continue;
                    }
                    let away = (target - center).normalize_or_zero();
                    let impulse = away * self.config.knockback_strength;
                    let lethal = player.apply_damage(blast);
                    if !lethal {
                        player.knockback(impulse);
                    }
                    effects.player_hit(player, lethal, impulse);
                }
                None => {}
            }
        }
    }

    /// Resolves a player melee attack against every targetable combatant
    /// whose circle overlaps the strike, and returns how many were hit.
    ///
    /// Candidates come from a grid built for the strike. Melee is the damage
    /// source that defers a Heavy's death.
    pub fn melee_strike(
        &mut self,
        arena: &mut Arena,
        strike: MeleeStrike,
        sink: &mut dyn EffectSink,
    ) -> usize {
        if !strike.center.is_finite() || !strike.radius.is_finite() {
            tracing::warn!(?strike, "melee strike with non-finite geometry ignored");
            return 0;
        }
        let Some(grid) = SpatialGrid::build(arena.combatants(), self.config.cell_size) else {
            return 0;
        };
        grid.query_circle_into(strike.center, strike.radius, &mut self.scratch);
        drop(grid);

        let mut effects = Dispatcher::new(sink, &mut self.streak);
        let combatants = arena.combatants_mut();
        let mut struck = 0;
        for &index in &self.scratch {
            let Some(combatant) = combatants.get_mut(index) else {
                continue;
            };
            if !combatant.is_targetable() {
                continue;
            }
            let (center, size) = combatant_body(combatant);
            if !circles_overlap(strike.center, strike.radius.max(0.0), center, size) {
                continue;
            }
            let away = center - strike.center;
            let mut hit = Hit::new(strike.damage, DamageSource::Melee);
            if away != Vec2::ZERO {
                hit = hit.with_angle(away.y.atan2(away.x));
            }
            let outcome = combatant.apply_damage(hit);
            effects.outcome(combatant, outcome, strike.damage, None);
            struck += 1;
        }
        tracing::debug!(struck, "melee strike resolved");
        struck
    }

    /// Returns the diagnostics view of the collision workload.
    #[must_use]
    pub fn performance_snapshot(&self) -> PerformanceSnapshot {
        self.rolling.snapshot(&self.frame)
    }

    /// Returns the kill streak.
    #[must_use]
    pub const fn kill_streak(&self) -> &KillStreak {
        &self.streak
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Returns the rolling metrics.
    #[must_use]
    pub const fn metrics(&self) -> &RollingMetrics {
        &self.rolling
    }

    /// Returns the kinds of the installed passes, in run order.
    #[must_use]
    pub fn pass_kinds(&self) -> Vec<PassKind> {
        self.passes.iter().map(|p| p.kind()).collect()
    }
}
