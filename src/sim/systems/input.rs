//! Player control (Decision phase)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ecs::{Transform, Velocity, Weapon};
use crate::world::World;

/// Input snapshot supplied by the host each frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Movement axis, each component in [-1, 1] (keyboard or stick)
    pub axis: Vec2,
    /// Touch/pointer target; when set the ship steers toward it instead
    pub touch: Option<Vec2>,
    /// Fire held
    pub fire: bool,
}

impl InputState {
    /// Build from digital direction keys
    pub fn from_keys(left: bool, right: bool, up: bool, down: bool, fire: bool) -> Self {
        let axis = Vec2::new(
            (right as i32 - left as i32) as f32,
            (down as i32 - up as i32) as f32,
        );
        Self {
            axis,
            touch: None,
            fire,
        }
    }
}

/// Dead zone for touch steering (px)
const TOUCH_ARRIVE_DIST: f32 = 2.0;

/// Turn the input snapshot into player velocity and trigger state
pub fn run(world: &mut World, dt_ms: f32) {
    let Some(player) = world.player_id else {
        return;
    };
    let speed = world.config.player.speed;
    let input = world.input.clone();

    let velocity = match input.touch {
        Some(target) => {
            let Some(pos) = world.get_component::<Transform>(player).map(|t| t.pos) else {
                return;
            };
            let to_target = target - pos;
            let dist = to_target.length();
            if dist <= TOUCH_ARRIVE_DIST {
                Vec2::ZERO
            } else {
                // Don't overshoot the finger within one frame
                let dt_secs = (dt_ms / 1000.0).max(f32::EPSILON);
                let frame_speed = speed.min(dist / dt_secs);
                to_target / dist * frame_speed
            }
        }
        None => {
            // Diagonals are no faster than straight lines
            let axis = if input.axis.length_squared() > 1.0 {
                input.axis.normalize()
            } else {
                input.axis
            };
            axis * speed
        }
    };

    if let Some(vel) = world.get_component_mut::<Velocity>(player) {
        vel.0 = velocity;
    }
    if let Some(weapon) = world.get_component_mut::<Weapon>(player) {
        weapon.trigger = input.fire;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_keys_to_axis() {
        let input = InputState::from_keys(true, false, true, false, false);
        assert_eq!(input.axis, Vec2::new(-1.0, -1.0));
        let input = InputState::from_keys(true, true, false, false, true);
        assert_eq!(input.axis, Vec2::ZERO);
        assert!(input.fire);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut world = World::new(GameConfig::default()).unwrap();
        world.input = InputState::from_keys(false, true, false, true, true);
        run(&mut world, 10.0);

        let player = world.player_id.unwrap();
        let vel = world.get_component::<Velocity>(player).unwrap().0;
        assert!((vel.length() - world.config().player.speed).abs() < 1e-3);
        assert!(world.get_component::<Weapon>(player).unwrap().trigger);
    }

    #[test]
    fn test_touch_steers_toward_target() {
        let mut world = World::new(GameConfig::default()).unwrap();
        let player = world.player_id.unwrap();
        let pos = world.player_pos().unwrap();
        world.input = InputState {
            touch: Some(pos + Vec2::new(100.0, 0.0)),
            ..Default::default()
        };
        run(&mut world, 10.0);
        let vel = world.get_component::<Velocity>(player).unwrap().0;
        assert!(vel.x > 0.0 && vel.y.abs() < 1e-3);

        world.input.touch = Some(pos);
        run(&mut world, 10.0);
        assert_eq!(world.get_component::<Velocity>(player).unwrap().0, Vec2::ZERO);
    }
}
