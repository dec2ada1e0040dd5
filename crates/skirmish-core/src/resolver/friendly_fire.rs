//! Hostile projectiles against other hostile combatants.

use crate::damage::DamageSource;
use crate::metrics::PassKind;

use super::friendly::{strike_combatants, StrikeRules};
use super::{CollisionPass, PassContext};

/// Third pass: hostile projectiles against combatants other than their
/// owner. Does nothing unless friendly fire is enabled.
///
/// A kill scores the victim's points plus the configured friendly-fire
/// bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct FriendlyFirePass;

impl CollisionPass for FriendlyFirePass {
    fn kind(&self) -> PassKind {
        PassKind::FriendlyFire
    }

    fn run(&self, ctx: &mut PassContext<'_>) {
        if !ctx.config.friendly_fire {
            return;
        }
        let mut parts = ctx.arena.split_hostile();
        let rules = StrikeRules {
            pass: PassKind::FriendlyFire,
            source: DamageSource::FriendlyFire,
            bonus: Some(ctx.config.friendly_fire_bonus),
            drain_scale: ctx.config.drain_energy_scale,
        };
        strike_combatants(
            &mut parts,
            ctx.grid,
            ctx.scratch,
            ctx.metrics,
            &mut ctx.effects,
            &rules,
        );
    }
}
