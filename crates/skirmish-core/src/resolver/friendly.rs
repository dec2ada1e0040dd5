//! Player projectiles against combatants.
//!
//! Also home to [`strike_combatants`], the projectile-versus-combatant walk
//! shared with the friendly-fire pass.

use glam::Vec2;

use crate::arena::ArenaParts;
use crate::damage::{drain_cost, DamageSource, Hit};
use crate::entity::{Combatant, Projectile};
use crate::metrics::{FrameMetrics, PassKind};
use crate::spatial::SpatialGrid;

use super::dispatch::Dispatcher;
use super::narrow::{combatant_body, swept_circle_hit};
use super::{CollisionPass, PassContext};

/// First pass: friendly projectiles against hostile combatants.
#[derive(Debug, Clone, Copy, Default)]
pub struct FriendlyPass;

impl CollisionPass for FriendlyPass {
    fn kind(&self) -> PassKind {
        PassKind::Friendly
    }

    fn run(&self, ctx: &mut PassContext<'_>) {
        let mut parts = ctx.arena.split_friendly();
        let rules = StrikeRules {
            pass: PassKind::Friendly,
            source: DamageSource::Projectile,
            bonus: None,
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

/// Parameters that differ between the passes sharing
/// [`strike_combatants`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct StrikeRules {
    pub pass: PassKind,
    pub source: DamageSource,
    pub bonus: Option<u32>,
    pub drain_scale: f32,
}

/// Resolves every projectile in `parts` against the combatants.
///
/// Projectiles are visited from the last index down so `swap_remove` never
/// moves an unvisited projectile. A standard projectile resolves at most one
/// hit and is removed. A draining projectile keeps testing candidates,
/// paying energy for each kill, and is removed once its energy is spent. A
/// projectile never strikes the combatant that fired it.
pub(crate) fn strike_combatants(
    parts: &mut ArenaParts<'_>,
    grid: Option<&SpatialGrid>,
    scratch: &mut Vec<usize>,
    metrics: &mut FrameMetrics,
    effects: &mut Dispatcher<'_>,
    rules: &StrikeRules,
) {
    for i in (0..parts.projectiles.len()).rev() {
        let Some(projectile) = parts.projectiles.get_mut(i) else {
            continue;
        };
        let Some((from, to)) = projectile.sweep() else {
            tracing::warn!(index = i, "projectile with no finite position skipped");
            continue;
        };

        gather_candidates(grid, parts.combatants, projectile, scratch);
        metrics.record_candidates(rules.pass, scratch.len());

        let mut spent = false;
        for &index in scratch.iter() {
            let Some(victim) = parts.combatants.get_mut(index) else {
                continue;
            };
            if !victim.is_targetable()
                || projectile.is_owned_by(victim.id())
                || projectile.has_struck(victim.id())
            {
                continue;
            }

            metrics.record_check(rules.pass);
            let (center, size) = combatant_body(victim);
            if !swept_circle_hit(from, to, projectile.radius(), center, size) {
                continue;
            }
            metrics.record_hit(rules.pass);

            let mut hit = Hit::new(projectile.damage, rules.source);
            let direction = projectile.direction();
            if direction != Vec2::ZERO {
                hit = hit.with_angle(direction.y.atan2(direction.x));
            }
            let before = victim.health;
            let outcome = victim.apply_damage(hit);
            let removed = before - victim.health;
            let bonus = rules.bonus.filter(|_| outcome.is_kill());
            effects.outcome(victim, outcome, projectile.damage, bonus);

            if projectile.is_draining() {
                projectile.record_strike(victim.id());
                if !outcome.is_kill() {
                    continue;
                }
                let cost = drain_cost(removed, victim.max_health, rules.drain_scale);
                if projectile.drain(cost) == 0 {
                    spent = true;
                    break;
                }
            } else {
                spent = true;
                break;
            }
        }

        if spent {
            parts.projectiles.remove(i);
        }
    }
}

/// Fills `out` with candidate combatant indices, highest first.
///
/// Without a grid every targetable combatant is a candidate.
fn gather_candidates(
    grid: Option<&SpatialGrid>,
    combatants: &[Combatant],
    projectile: &Projectile,
    out: &mut Vec<usize>,
) {
    match grid {
        Some(grid) => grid.query_into(projectile, out),
        None => {
            out.clear();
            out.extend(
                (0..combatants.len())
                    .rev()
                    .filter(|&i| combatants[i].is_targetable()),
            );
        }
    }
}
