//! Test helpers for building arenas and reading event streams.

use glam::Vec2;

use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::effects::{CombatEvent, EffectSink};
use crate::entity::{CombatantId, ProjectileKind};
use crate::resolver::CombatResolver;

// =============================================================================
// Setup
// =============================================================================

/// Routes `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Resolver with default configuration.
pub fn resolver() -> CombatResolver {
    CombatResolver::new(CombatConfig::default())
}

/// Resolver with friendly fire enabled.
pub fn friendly_fire_resolver() -> CombatResolver {
    CombatResolver::new(CombatConfig::default().with_friendly_fire(true))
}

/// Fires a standard player projectile that swept `from` to `to` this frame.
pub fn fire_through(arena: &mut Arena, from: Vec2, to: Vec2, damage: u32) {
    arena.fire_friendly(|p| {
        p.previous = from;
        p.position = to;
        p.velocity = (to - from) * 60.0;
        p.damage = damage;
        p.size = 2.0;
        p.lifetime = 2.0;
    });
}

/// Fires a draining player projectile with `energy` along `from` to `to`.
pub fn fire_draining(arena: &mut Arena, from: Vec2, to: Vec2, damage: u32, energy: u32) {
    arena.fire_friendly(|p| {
        p.previous = from;
        p.position = to;
        p.damage = damage;
        p.size = 2.0;
        p.kind = ProjectileKind::Draining { energy };
        p.lifetime = 2.0;
    });
}

/// Fires a standard hostile projectile owned by `owner`.
pub fn fire_hostile_through(arena: &mut Arena, owner: CombatantId, from: Vec2, to: Vec2, damage: u32) {
    arena.fire_hostile(owner, |p| {
        p.previous = from;
        p.position = to;
        p.velocity = (to - from) * 60.0;
        p.damage = damage;
        p.size = 2.0;
        p.lifetime = 2.0;
    });
}

/// Steps the resolver `frames` times.
pub fn step_n(resolver: &mut CombatResolver, arena: &mut Arena, sink: &mut dyn EffectSink, frames: u32) {
    for _ in 0..frames {
        resolver.step(arena, sink);
    }
}

// =============================================================================
// Event Inspection
// =============================================================================

/// Number of `CombatantKilled` events for `id`.
pub fn kills_of(events: &[CombatEvent], id: CombatantId) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CombatEvent::CombatantKilled { id: killed, .. } if *killed == id))
        .count()
}

/// Total `CombatantKilled` events.
pub fn kill_count(events: &[CombatEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CombatEvent::CombatantKilled { .. }))
        .count()
}

/// All score events as `(points, friendly_fire)`.
pub fn scores(events: &[CombatEvent]) -> Vec<(u32, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::Score {
                points,
                friendly_fire,
                ..
            } => Some((*points, *friendly_fire)),
            _ => None,
        })
        .collect()
}
