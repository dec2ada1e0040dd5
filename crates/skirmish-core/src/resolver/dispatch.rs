//! Outcome dispatch: turns resolved hits into [`CombatEvent`]s.
//!
//! Every [`DamageOutcome`] produced by a pass goes through
//! [`Dispatcher::outcome`]. A `Died` outcome runs the death pipeline exactly
//! once; the other outcomes only request hit feedback.

use glam::Vec2;

use crate::damage::DamageOutcome;
use crate::effects::{CombatEvent, EffectSink, ExplosionKind, SoundCue, SparkKind};
use crate::entity::{Combatant, Player};
use crate::spatial::sanitize_position;

// =============================================================================
// Kill Streak
// =============================================================================

/// Consecutive kills landed within a rolling frame window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillStreak {
    count: u32,
    best: u32,
    frames_left: u32,
    window: u32,
}

impl KillStreak {
    /// Creates a streak where each kill keeps the streak open for `window`
    /// frames.
    #[must_use]
    pub const fn new(window: u32) -> Self {
        Self {
            count: 0,
            best: 0,
            frames_left: 0,
            window,
        }
    }

    /// Counts a kill and returns the streak length including it.
    pub fn register_kill(&mut self) -> u32 {
        self.count = if self.frames_left > 0 { self.count + 1 } else { 1 };
        self.frames_left = self.window.max(1);
        self.best = self.best.max(self.count);
        self.count
    }

    /// Advances the window by one frame, ending the streak when it closes.
    pub fn tick(&mut self) {
        if self.frames_left > 0 {
            self.frames_left -= 1;
            if self.frames_left == 0 {
                self.count = 0;
            }
        }
    }

    /// Current streak length; zero when no streak is open.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Longest streak seen.
    #[must_use]
    pub const fn best(&self) -> u32 {
        self.best
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Effect sink plus the scoring state death dispatch needs.
pub struct Dispatcher<'a> {
    sink: &'a mut dyn EffectSink,
    streak: &'a mut KillStreak,
}

impl std::fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("streak", &self.streak)
            .finish_non_exhaustive()
    }
}

impl<'a> Dispatcher<'a> {
    /// Wraps a sink and a kill streak.
    pub fn new(sink: &'a mut dyn EffectSink, streak: &'a mut KillStreak) -> Self {
        Self { sink, streak }
    }

    /// Forwards a raw event.
    pub fn emit(&mut self, event: CombatEvent) {
        self.sink.dispatch(event);
    }

    /// Requests the effects for one resolved hit on `victim`.
    ///
    /// `bonus` is the extra score for a friendly-fire kill; `None` for
    /// player kills.
    pub fn outcome(&mut self, victim: &Combatant, outcome: DamageOutcome, amount: u32, bonus: Option<u32>) {
        let position = sanitize_position(victim.position);
        match outcome {
            DamageOutcome::Damaged => {
                self.emit(CombatEvent::Spark {
                    position,
                    kind: SparkKind::Hit,
                });
                self.emit(CombatEvent::Sound {
                    cue: SoundCue::Hit,
                    position,
                });
                self.damage_number(position, amount);
            }
            DamageOutcome::Exploding => {
                self.emit(CombatEvent::Spark {
                    position,
                    kind: SparkKind::Arming,
                });
                self.emit(CombatEvent::Sound {
                    cue: SoundCue::Arming,
                    position,
                });
                self.damage_number(position, amount);
            }
            DamageOutcome::Died => self.death(victim, amount, bonus),
        }
    }

    /// Runs the death pipeline for `victim`. Call once per `Died` outcome.
    pub fn death(&mut self, victim: &Combatant, amount: u32, bonus: Option<u32>) {
        let position = sanitize_position(victim.position);
        let profile = victim.kind().profile();
        let points = profile.score + bonus.unwrap_or(0);
        let streak = self.streak.register_kill();

        tracing::debug!(
            id = %victim.id(),
            kind = %victim.kind(),
            points,
            streak,
            friendly_fire = bonus.is_some(),
            "combatant killed"
        );

        self.emit(CombatEvent::CombatantKilled {
            id: victim.id(),
            kind: victim.kind(),
            position,
        });
        self.emit(CombatEvent::Explosion {
            position,
            kind: ExplosionKind::for_kind(victim.kind()),
        });
        self.emit(CombatEvent::Sound {
            cue: SoundCue::Kill,
            position,
        });
        self.emit(CombatEvent::Score {
            points,
            streak,
            friendly_fire: bonus.is_some(),
        });
        self.emit(CombatEvent::CameraShake {
            intensity: profile.shake,
        });
        self.damage_number(position, amount);
    }

    /// Requests the blast effects of a detonation at `position`.
    pub fn detonation(&mut self, position: Vec2) {
        let position = sanitize_position(position);
        self.emit(CombatEvent::Sound {
            cue: SoundCue::Detonation,
            position,
        });
    }

    /// Requests feedback for a hostile hit on the player.
    ///
    /// On a lethal hit emits the game-over transition; otherwise the knockback
    /// already applied to the player is reported.
    pub fn player_hit(&mut self, player: &Player, lethal: bool, impulse: Vec2) {
        let position = sanitize_position(player.position);
        if lethal {
            tracing::debug!(x = position.x, y = position.y, "player killed");
            self.emit(CombatEvent::Sound {
                cue: SoundCue::GameOver,
                position,
            });
            self.emit(CombatEvent::GameOver { position });
            return;
        }
        self.emit(CombatEvent::Sound {
            cue: SoundCue::PlayerHit,
            position,
        });
        self.emit(CombatEvent::PlayerKnockback { impulse });
    }

    fn damage_number(&mut self, position: Vec2, amount: u32) {
        if amount > 0 {
            self.emit(CombatEvent::DamageNumber { position, amount });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CombatantId, CombatantKind};

    mod streak_tests {
        use super::*;

        #[test]
        fn kills_inside_window_extend_streak() {
            let mut streak = KillStreak::new(3);
            assert_eq!(streak.register_kill(), 1);
            streak.tick();
            streak.tick();
            assert_eq!(streak.register_kill(), 2);
            assert_eq!(streak.count(), 2);
        }

        #[test]
        fn streak_resets_when_window_closes() {
            let mut streak = KillStreak::new(2);
            streak.register_kill();
            streak.register_kill();
            streak.tick();
            streak.tick();
            assert_eq!(streak.count(), 0);
            assert_eq!(streak.register_kill(), 1);
            assert_eq!(streak.best(), 2);
        }

        #[test]
        fn zero_window_still_counts_same_frame_kills() {
            let mut streak = KillStreak::new(0);
            streak.register_kill();
            assert_eq!(streak.register_kill(), 2);
        }
    }

    mod dispatch_tests {
        use super::*;

        fn victim(kind: CombatantKind) -> Combatant {
            Combatant::new(CombatantId::new(7), kind, Vec2::new(3.0, 4.0))
        }

        #[test]
        fn damaged_emits_hit_feedback() {
            let mut events: Vec<CombatEvent> = Vec::new();
            let mut streak = KillStreak::new(10);
            Dispatcher::new(&mut events, &mut streak).outcome(
                &victim(CombatantKind::Ranged),
                DamageOutcome::Damaged,
                1,
                None,
            );
            assert_eq!(
                events,
                vec![
                    CombatEvent::Spark {
                        position: Vec2::new(3.0, 4.0),
                        kind: SparkKind::Hit
                    },
                    CombatEvent::Sound {
                        cue: SoundCue::Hit,
                        position: Vec2::new(3.0, 4.0)
                    },
                    CombatEvent::DamageNumber {
                        position: Vec2::new(3.0, 4.0),
                        amount: 1
                    },
                ]
            );
            assert_eq!(streak.count(), 0);
        }

        #[test]
        fn death_pipeline_emits_once_with_bonus() {
            let mut events: Vec<CombatEvent> = Vec::new();
            let mut streak = KillStreak::new(10);
            Dispatcher::new(&mut events, &mut streak).outcome(
                &victim(CombatantKind::Heavy),
                DamageOutcome::Died,
                4,
                Some(50),
            );

            let kills = events
                .iter()
                .filter(|e| matches!(e, CombatEvent::CombatantKilled { .. }))
                .count();
            assert_eq!(kills, 1);
            assert!(events.contains(&CombatEvent::Score {
                points: 350,
                streak: 1,
                friendly_fire: true
            }));
            assert!(events.contains(&CombatEvent::Explosion {
                position: Vec2::new(3.0, 4.0),
                kind: ExplosionKind::Large
            }));
            assert!(events.contains(&CombatEvent::CameraShake { intensity: 6.0 }));
        }

        #[test]
        fn zero_amount_has_no_damage_number() {
            let mut events: Vec<CombatEvent> = Vec::new();
            let mut streak = KillStreak::new(10);
            Dispatcher::new(&mut events, &mut streak).death(&victim(CombatantKind::Melee), 0, None);
            assert!(!events
                .iter()
                .any(|e| matches!(e, CombatEvent::DamageNumber { .. })));
        }

        #[test]
        fn player_hit_reports_game_over_or_knockback() {
            let player = Player::new(Vec2::ZERO);
            let mut events: Vec<CombatEvent> = Vec::new();
            let mut streak = KillStreak::new(10);
            let mut dispatcher = Dispatcher::new(&mut events, &mut streak);
            dispatcher.player_hit(&player, false, Vec2::X);
            dispatcher.player_hit(&player, true, Vec2::X);

            assert!(events.contains(&CombatEvent::PlayerKnockback { impulse: Vec2::X }));
            assert!(events.contains(&CombatEvent::GameOver { position: Vec2::ZERO }));
        }
    }
}
