//! Hostile projectiles against the player.

use crate::metrics::PassKind;

use super::narrow::swept_circle_hit;
use super::{CollisionPass, PassContext};
use crate::spatial::sanitize_position;

/// Second pass: hostile projectiles against the player.
///
/// A linear scan, since there is a single victim. The first projectile that
/// connects damages the player and is removed, and the scan stops there: a
/// player takes at most one projectile hit per frame. Without a living
/// player the pass does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerPass;

impl CollisionPass for PlayerPass {
    fn kind(&self) -> PassKind {
        PassKind::Player
    }

    fn run(&self, ctx: &mut PassContext<'_>) {
        let mut parts = ctx.arena.split_hostile();
        let Some(player) = parts.player.take() else {
            return;
        };
        if !player.is_alive() {
            return;
        }
        let center = sanitize_position(player.position);
        let radius = if player.size.is_finite() { player.size.max(0.0) } else { 0.0 };

        for i in (0..parts.projectiles.len()).rev() {
            let Some(projectile) = parts.projectiles.get(i) else {
                continue;
            };
            let Some((from, to)) = projectile.sweep() else {
                continue;
            };
            ctx.metrics.record_candidates(PassKind::Player, 1);
            ctx.metrics.record_check(PassKind::Player);
            if !swept_circle_hit(from, to, projectile.radius(), center, radius) {
                continue;
            }
            ctx.metrics.record_hit(PassKind::Player);

            let impulse = projectile.direction() * ctx.config.knockback_strength;
            let lethal = player.apply_damage(projectile.damage);
            if !lethal {
                player.knockback(impulse);
            }
            ctx.effects.player_hit(player, lethal, impulse);
            parts.projectiles.remove(i);
            break;
        }
    }
}
