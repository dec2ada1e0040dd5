//! Outbound effect requests and the pooled debris layer.
//!
//! The combat core never renders, plays audio or keeps score itself. Every
//! consequence of a resolved hit is described by a [`CombatEvent`] and handed
//! to an [`EffectSink`]. Dispatch is fire-and-forget: sinks return nothing,
//! so a failure in a collaborator can never reach collision logic.
//!
//! # Provided Sinks
//!
//! - `Vec<CombatEvent>`: records events (tests, replays, deferred handling)
//! - [`NullSink`]: discards everything
//! - `(A, B)`: forwards each event to both sinks
//! - [`Debris`]: turns explosions and damage numbers into pooled fragments,
//!   burst particles and floating text

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::config::CombatConfig;
use crate::entity::{CombatantId, CombatantKind};
use crate::pool::{ObjectPool, PoolStats, Recyclable};

// =============================================================================
// Events
// =============================================================================

/// Small flash drawn at a point of impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SparkKind {
    /// A non-lethal hit.
    Hit,
    /// A hit that armed a detonation or started a deferred death.
    Arming,
}

/// Size and style of an explosion effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionKind {
    /// Light units.
    Small,
    /// Heavy units.
    Large,
    /// Self-destruct area blast.
    Detonation,
}

impl ExplosionKind {
    /// Returns the explosion drawn when a combatant of `kind` dies.
    #[must_use]
    pub const fn for_kind(kind: CombatantKind) -> Self {
        match kind {
            CombatantKind::Ranged | CombatantKind::Melee => Self::Small,
            CombatantKind::Heavy => Self::Large,
            CombatantKind::Kamikaze => Self::Detonation,
        }
    }

    /// Number of fragment particles spawned.
    #[must_use]
    pub const fn fragment_count(self) -> usize {
        match self {
            Self::Small => 6,
            Self::Large => 14,
            Self::Detonation => 20,
        }
    }

    /// Number of central burst particles spawned.
    #[must_use]
    pub const fn burst_count(self) -> usize {
        match self {
            Self::Small => 2,
            Self::Large => 5,
            Self::Detonation => 8,
        }
    }
}

/// Audio cue requested from the sound collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// A non-lethal hit on a combatant.
    Hit,
    /// A combatant died.
    Kill,
    /// A detonation armed or a deferred death started.
    Arming,
    /// A detonation went off.
    Detonation,
    /// The player was hit.
    PlayerHit,
    /// The player died.
    GameOver,
}

/// A single effect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Impact spark.
    Spark {
        /// Where.
        position: Vec2,
        /// Which spark.
        kind: SparkKind,
    },
    /// Explosion effect.
    Explosion {
        /// Where.
        position: Vec2,
        /// Which explosion.
        kind: ExplosionKind,
    },
    /// Audio cue.
    Sound {
        /// Which cue.
        cue: SoundCue,
        /// Where, for panning.
        position: Vec2,
    },
    /// Score award for a kill.
    Score {
        /// Points awarded.
        points: u32,
        /// Kill streak after this kill.
        streak: u32,
        /// The kill came from a hostile projectile.
        friendly_fire: bool,
    },
    /// Camera shake request.
    CameraShake {
        /// Shake amplitude.
        intensity: f32,
    },
    /// Floating damage number.
    DamageNumber {
        /// Where.
        position: Vec2,
        /// Damage shown.
        amount: u32,
    },
    /// The player was knocked back.
    PlayerKnockback {
        /// Impulse applied to the player's velocity.
        impulse: Vec2,
    },
    /// The player died.
    GameOver {
        /// Where.
        position: Vec2,
    },
    /// A combatant reached its terminal state. Dispatched exactly once per
    /// combatant.
    CombatantKilled {
        /// Who died.
        id: CombatantId,
        /// What kind it was.
        kind: CombatantKind,
        /// Where.
        position: Vec2,
    },
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver of [`CombatEvent`]s.
pub trait EffectSink {
    /// Handles one event.
    fn dispatch(&mut self, event: CombatEvent);
}

impl EffectSink for Vec<CombatEvent> {
    fn dispatch(&mut self, event: CombatEvent) {
        self.push(event);
    }
}

impl<S: EffectSink + ?Sized> EffectSink for &mut S {
    fn dispatch(&mut self, event: CombatEvent) {
        (**self).dispatch(event);
    }
}

impl<A: EffectSink, B: EffectSink> EffectSink for (A, B) {
    fn dispatch(&mut self, event: CombatEvent) {
        self.0.dispatch(event.clone());
        self.1.dispatch(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EffectSink for NullSink {
    fn dispatch(&mut self, _event: CombatEvent) {}
}

// =============================================================================
// Pooled debris
// =============================================================================

/// A fragment or burst particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particle {
    /// World position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Radius.
    pub size: f32,
    /// Seconds left.
    pub ttl: f32,
}

impl Recyclable for Particle {}

/// A floating damage number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingText {
    /// World position.
    pub position: Vec2,
    /// Text to draw.
    pub text: String,
    /// Seconds left.
    pub ttl: f32,
}

impl Recyclable for FloatingText {
    fn clear(&mut self) {
        self.position = Vec2::ZERO;
        self.text.clear();
        self.ttl = 0.0;
    }
}

const FRAGMENT_TTL: f32 = 0.8;
const BURST_TTL: f32 = 0.35;
const TEXT_TTL: f32 = 0.9;
const TEXT_RISE: f32 = 40.0;

/// Pool-backed storage for explosion fragments, burst particles and floating
/// damage numbers.
///
/// `Debris` is an [`EffectSink`]: explosions and damage numbers dispatched to
/// it spawn records acquired from its pools. [`Debris::update`] ages them and
/// releases expired records back to their pools.
#[derive(Debug)]
pub struct Debris {
    fragments: Vec<Particle>,
    bursts: Vec<Particle>,
    texts: Vec<FloatingText>,
    fragment_pool: ObjectPool<Particle>,
    burst_pool: ObjectPool<Particle>,
    text_pool: ObjectPool<FloatingText>,
    rng: ChaCha8Rng,
}

/// Pool counters of a [`Debris`] layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebrisStats {
    /// Fragment pool.
    pub fragments: PoolStats,
    /// Burst particle pool.
    pub bursts: PoolStats,
    /// Floating text pool.
    pub texts: PoolStats,
}

impl Debris {
    /// Creates an empty debris layer with pool capacities from `config` and a
    /// seeded scatter generator.
    #[must_use]
    pub fn new(config: &CombatConfig, seed: u64) -> Self {
        Self {
            fragments: Vec::new(),
            bursts: Vec::new(),
            texts: Vec::new(),
            fragment_pool: ObjectPool::new(config.fragment_pool_capacity),
            burst_pool: ObjectPool::new(config.burst_pool_capacity),
            text_pool: ObjectPool::new(config.text_pool_capacity),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Spawns fragments and burst particles for an explosion.
    pub fn spawn_explosion(&mut self, position: Vec2, kind: ExplosionKind) {
        for _ in 0..kind.fragment_count() {
            let angle: f32 = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed: f32 = self.rng.gen_range(60.0..180.0);
            let size: f32 = self.rng.gen_range(1.5..3.5);
            let fragment = self.fragment_pool.acquire(|p| {
                p.position = position;
                p.velocity = Vec2::from_angle(angle) * speed;
                p.size = size;
                p.ttl = FRAGMENT_TTL;
            });
            self.fragments.push(fragment);
        }
        for _ in 0..kind.burst_count() {
            let jitter = Vec2::new(self.rng.gen_range(-4.0..4.0), self.rng.gen_range(-4.0..4.0));
            let burst = self.burst_pool.acquire(|p| {
                p.position = position + jitter;
                p.size = 10.0;
                p.ttl = BURST_TTL;
            });
            self.bursts.push(burst);
        }
    }

    /// Spawns a floating damage number.
    pub fn spawn_damage_number(&mut self, position: Vec2, amount: u32) {
        let text = self.text_pool.acquire(|t| {
            t.position = position;
            t.ttl = TEXT_TTL;
            // Writing into a String cannot fail.
            let _ = write!(t.text, "{amount}");
        });
        self.texts.push(text);
    }

    /// Ages every record by `dt` seconds and returns expired ones to their
    /// pools.
    pub fn update(&mut self, dt: f32) {
        age_particles(&mut self.fragments, &mut self.fragment_pool, dt);
        age_particles(&mut self.bursts, &mut self.burst_pool, dt);

        for i in (0..self.texts.len()).rev() {
            let text = &mut self.texts[i];
            text.ttl -= dt;
            text.position.y -= TEXT_RISE * dt;
            if text.ttl <= 0.0 {
                let expired = self.texts.swap_remove(i);
                self.text_pool.release(expired);
            }
        }
    }

    /// Live fragments.
    #[must_use]
    pub fn fragments(&self) -> &[Particle] {
        &self.fragments
    }

    /// Live central burst particles.
    #[must_use]
    pub fn bursts(&self) -> &[Particle] {
        &self.bursts
    }

    /// Live floating texts.
    #[must_use]
    pub fn texts(&self) -> &[FloatingText] {
        &self.texts
    }

    /// Returns the counters of all three pools.
    #[must_use]
    pub fn stats(&self) -> DebrisStats {
        DebrisStats {
            fragments: self.fragment_pool.stats(),
            bursts: self.burst_pool.stats(),
            texts: self.text_pool.stats(),
        }
    }
}

fn age_particles(live: &mut Vec<Particle>, pool: &mut ObjectPool<Particle>, dt: f32) {
    for i in (0..live.len()).rev() {
        let particle = &mut live[i];
        particle.ttl -= dt;
        particle.position += particle.velocity * dt;
        if particle.ttl <= 0.0 {
            let expired = live.swap_remove(i);
            pool.release(expired);
        }
    }
}

impl EffectSink for Debris {
    fn dispatch(&mut self, event: CombatEvent) {
        match event {
            CombatEvent::Explosion { position, kind } => self.spawn_explosion(position, kind),
            CombatEvent::DamageNumber { position, amount } => {
                self.spawn_damage_number(position, amount);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debris() -> Debris {
        Debris::new(&CombatConfig::default(), 7)
    }

    mod sink_tests {
        use super::*;

        #[test]
        fn vec_records_in_order() {
            let mut events: Vec<CombatEvent> = Vec::new();
            events.dispatch(CombatEvent::CameraShake { intensity: 1.0 });
            events.dispatch(CombatEvent::GameOver {
                position: Vec2::ZERO,
            });
            assert_eq!(events.len(), 2);
            assert!(matches!(events[0], CombatEvent::CameraShake { .. }));
        }

        #[test]
        fn tuple_fans_out() {
            let mut pair: (Vec<CombatEvent>, Vec<CombatEvent>) = (Vec::new(), Vec::new());
            pair.dispatch(CombatEvent::CameraShake { intensity: 2.0 });
            assert_eq!(pair.0, pair.1);
            assert_eq!(pair.0.len(), 1);
        }

        #[test]
        fn mutable_reference_forwards() {
            fn shake<S: EffectSink>(mut sink: S) {
                sink.dispatch(CombatEvent::CameraShake { intensity: 2.0 });
            }

            let mut events: Vec<CombatEvent> = Vec::new();
            shake(&mut events);
            assert_eq!(events.len(), 1);
        }

        #[test]
        fn events_serialize() {
            let event = CombatEvent::Score {
                points: 100,
                streak: 2,
                friendly_fire: false,
            };
            let json = serde_json::to_string(&event).unwrap();
            let back: CombatEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    mod debris_tests {
        use super::*;

        #[test]
        fn explosion_spawns_pooled_particles() {
            let mut debris = debris();
            debris.dispatch(CombatEvent::Explosion {
                position: Vec2::new(5.0, 5.0),
                kind: ExplosionKind::Large,
            });

            assert_eq!(debris.fragments().len(), ExplosionKind::Large.fragment_count());
            assert_eq!(debris.bursts().len(), ExplosionKind::Large.burst_count());
            assert_eq!(
                debris.stats().fragments.in_use,
                ExplosionKind::Large.fragment_count()
            );
        }

        #[test]
        fn damage_number_formats_amount() {
            let mut debris = debris();
            debris.dispatch(CombatEvent::DamageNumber {
                position: Vec2::ZERO,
                amount: 12,
            });
            assert_eq!(debris.texts()[0].text, "12");
        }

        #[test]
        fn update_releases_expired_records() {
            let mut debris = debris();
            debris.spawn_explosion(Vec2::ZERO, ExplosionKind::Small);
            debris.spawn_damage_number(Vec2::ZERO, 3);

            debris.update(0.5);
            assert!(debris.bursts().is_empty());
            assert_eq!(debris.fragments().len(), ExplosionKind::Small.fragment_count());

            debris.update(1.0);
            assert!(debris.fragments().is_empty());
            assert!(debris.texts().is_empty());

            let stats = debris.stats();
            assert_eq!(stats.fragments.in_use, 0);
            assert_eq!(stats.bursts.in_use, 0);
            assert_eq!(stats.texts.in_use, 0);
        }

        #[test]
        fn second_explosion_reuses_records() {
            let mut debris = debris();
            debris.spawn_explosion(Vec2::ZERO, ExplosionKind::Small);
            debris.update(2.0);
            debris.spawn_explosion(Vec2::ZERO, ExplosionKind::Small);

            let stats = debris.stats();
            assert_eq!(stats.fragments.created, ExplosionKind::Small.fragment_count() as u64);
            assert_eq!(stats.fragments.reused, ExplosionKind::Small.fragment_count() as u64);
        }

        #[test]
        fn reused_text_does_not_keep_old_digits() {
            let mut debris = debris();
            debris.spawn_damage_number(Vec2::ZERO, 1234);
            debris.update(2.0);
            debris.spawn_damage_number(Vec2::ZERO, 5);
            assert_eq!(debris.texts()[0].text, "5");
        }

        #[test]
        fn same_seed_same_scatter() {
            let mut a = debris();
            let mut b = debris();
            a.spawn_explosion(Vec2::ZERO, ExplosionKind::Detonation);
            b.spawn_explosion(Vec2::ZERO, ExplosionKind::Detonation);
            assert_eq!(a.fragments(), b.fragments());
        }

        #[test]
        fn other_events_ignored() {
            let mut debris = debris();
            debris.dispatch(CombatEvent::CameraShake { intensity: 3.0 });
            assert!(debris.fragments().is_empty());
            assert!(debris.texts().is_empty());
        }
    }
}
