//! Enemy behaviours (Decision phase)
//!
//! Each behaviour only sets velocity and the weapon trigger; movement itself
//! happens in Physics.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::ecs::{AiBehaviour, AiState, Transform, Velocity, Weapon};
use crate::world::World;

/// Rotate `current` toward `desired` by at most `max_turn` radians
pub fn steer(current: Vec2, desired: Vec2, max_turn: f32) -> Vec2 {
    let current = current.normalize_or_zero();
    let desired = desired.normalize_or_zero();
    if current == Vec2::ZERO {
        return desired;
    }
    if desired == Vec2::ZERO {
        return current;
    }
    let from = crate::angle_of(current);
    let mut delta = crate::angle_of(desired) - from;
    // Shortest way round
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    crate::direction_from_angle(from + delta.clamp(-max_turn, max_turn))
}

/// Velocity for one behaviour this frame
fn desired_velocity(state: &AiState, pos: Vec2, current: Vec2, player: Option<Vec2>, dt_secs: f32) -> Vec2 {
    match state.behaviour {
        AiBehaviour::Drifter => Vec2::new(0.0, state.speed),
        AiBehaviour::Chaser { turn_rate } => {
            let heading = if current == Vec2::ZERO { Vec2::Y } else { current };
            match player {
                // Only chase while above the player; afterwards keep going
                Some(target) if target.y > pos.y => {
                    steer(heading, target - pos, turn_rate * dt_secs) * state.speed
                }
                _ => heading.normalize_or_zero() * state.speed,
            }
        }
        AiBehaviour::Strafer {
            amplitude,
            frequency,
        } => {
            // Derivative of anchor_x + amplitude * sin(2π f t)
            let w = TAU * frequency;
            let vx = amplitude * w * (w * state.age_secs).cos();
            Vec2::new(vx, state.speed)
        }
        AiBehaviour::Turret { hold_y } => {
            if pos.y < hold_y {
                Vec2::new(0.0, state.speed)
            } else {
                Vec2::ZERO
            }
        }
    }
}

pub fn run(world: &mut World, dt_ms: f32) {
    let dt_secs = crate::ms_to_secs(dt_ms);
    let player = world.player_pos();
    let top = world.bounds.min.y;

    for id in world.query_ids::<(AiState, Transform, Velocity)>() {
        if !world.is_active(id) {
            continue;
        }
        let Some(state) = world.get_component_mut::<AiState>(id) else {
            continue;
        };
        state.age_secs += dt_secs;
        let state = *state;

        let (Some(pos), Some(current)) = (
            world.get_component::<Transform>(id).map(|t| t.pos),
            world.get_component::<Velocity>(id).map(|v| v.0),
        ) else {
            continue;
        };
        let velocity = desired_velocity(&state, pos, current, player, dt_secs);

        if let Some(vel) = world.get_component_mut::<Velocity>(id) {
            vel.0 = velocity;
        }
        if let Some(transform) = world.get_component_mut::<Transform>(id) {
            if velocity != Vec2::ZERO {
                transform.rot = crate::angle_of(velocity);
            }
        }
        // Hold fire until on screen and there is someone to shoot at
        if let Some(weapon) = world.get_component_mut::<Weapon>(id) {
            weapon.trigger = player.is_some() && pos.y >= top;
        }
    }
}
