//! Damage resolution (Resolution phase)
//!
//! Walks this frame's `Collision` and `Damage` events in emission order.
//! Contact with positive damage is forwarded as a `Damage` event and applied
//! on the spot. Mitigation order: invincibility (ignore everything), defense
//! percentage, then shield, with only the overflow reaching HP.

use glam::Vec2;

use crate::ecs::{Defense, EntityId, EntityKind, Health, Shield, Transform};
use crate::sim::events::{AudioCue, Event};
use crate::sim::systems::buffs::{grant_invincibility, is_invincible};
use crate::world::World;

/// Shake for a player hit that only touched the shield
const SHIELD_HIT_SHAKE: f32 = 0.15;
/// Shake for a player hit that reached HP
const HULL_HIT_SHAKE: f32 = 0.35;

/// What a single damage application did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Victim gone, already dying, invincible, or nothing to apply
    Ignored,
    /// Damage landed; the victim survived
    Hit { shield: f32, hp: f32 },
    /// This hit killed the victim
    Killed,
}

/// Apply `amount` raw damage to `victim`.
///
/// On a kill exactly one `Death` is emitted and the victim is marked for
/// deletion; it stays queryable until Cleanup but takes no further damage.
pub fn apply_damage(world: &mut World, victim: EntityId, source: Option<EntityId>, amount: f32) -> DamageOutcome {
    if !world.is_active(victim) || !amount.is_finite() || amount <= 0.0 {
        return DamageOutcome::Ignored;
    }
    // Nothing to kill: leave any shield untouched
    if !world.has_component::<Health>(victim) {
        return DamageOutcome::Ignored;
    }
    if is_invincible(world, victim) {
        log::trace!("{victim} is invincible, ignoring {amount:.1} damage");
        return DamageOutcome::Ignored;
    }

    let defense = world
        .get_component::<Defense>(victim)
        .map(|d| d.pct.clamp(0.0, 1.0))
        .unwrap_or(0.0);
    let mitigated = amount * (1.0 - defense);

    let mut overflow = mitigated;
    let mut shield_taken = 0.0;
    if let Some(shield) = world.get_component_mut::<Shield>(victim) {
        shield_taken = shield.value.max(0.0).min(overflow);
        shield.value -= shield_taken;
        overflow -= shield_taken;
    }

    let Some(health) = world.get_component_mut::<Health>(victim) else {
        return DamageOutcome::Ignored;
    };
    health.hp -= overflow;
    let (hp, dead) = (health.hp, health.is_dead());

    let kind = world.kind_of(victim);
    if kind == Some(EntityKind::Player) && mitigated > 0.0 {
        on_player_hit(world, victim, overflow > 0.0);
    }

    if dead {
        let pos = world
            .get_component::<Transform>(victim)
            .map(|t| t.pos)
            .unwrap_or(Vec2::ZERO);
        world.emit(Event::Death {
            entity: victim,
            kind: kind.unwrap_or(EntityKind::Enemy),
            pos,
            killer: source,
        });
        world.mark_for_deletion(victim);
        log::debug!("{victim} ({kind:?}) destroyed by {source:?}");
        return DamageOutcome::Killed;
    }

    let shield = world.get_component::<Shield>(victim).map(|s| s.value).unwrap_or(0.0);
    log::trace!("{victim} took {mitigated:.1} ({shield_taken:.1} to shield), hp {hp:.1}");
    DamageOutcome::Hit { shield, hp }
}

fn on_player_hit(world: &mut World, player: EntityId, hull: bool) {
    let window = world.config.player.hit_invincibility_ms;
    if window > 0.0 {
        grant_invincibility(world, player, window);
    }
    world.emit(Event::CameraShake {
        intensity: if hull { HULL_HIT_SHAKE } else { SHIELD_HIT_SHAKE },
    });
    world.emit(Event::Audio {
        cue: if hull { AudioCue::Hurt } else { AudioCue::ShieldHit },
    });
}

/// Decide whether one direction of a contact deals damage, and deal it
fn contact(world: &mut World, owner: EntityId, victim: EntityId, damage: f32) {
    if damage <= 0.0 {
        return;
    }
    let (Some(owner_kind), Some(victim_kind)) = (world.kind_of(owner), world.kind_of(victim)) else {
        return;
    };
    // Bullets take no damage; pickups are handled by the pickup system
    if victim_kind.is_bullet() || owner_kind == EntityKind::Powerup || victim_kind == EntityKind::Powerup {
        return;
    }
    // A dead owner deals nothing, and a spent bullet hits only once
    if !world.is_active(owner) || !world.is_active(victim) {
        return;
    }
    if owner_kind.is_bullet() {
        world.mark_for_deletion(owner);
    }

    world.emit(Event::Damage {
        victim,
        source: Some(owner),
        amount: damage,
    });
    apply_damage(world, victim, Some(owner), damage);
}

pub fn run(world: &mut World, _dt_ms: f32) {
    let incoming: Vec<Event> = world
        .events()
        .iter()
        .filter(|e| matches!(e, Event::Collision { .. } | Event::Damage { .. }))
        .cloned()
        .collect();

    for event in incoming {
        match event {
            Event::Collision {
                owner,
                victim,
                damage,
                ..
            } => contact(world, owner, victim, damage),
            Event::Damage {
                victim,
                source,
                amount,
            } => {
                apply_damage(world, victim, source, amount);
            }
            _ => {}
        }
    }
}
