//! Fixed-order frame pipeline
//!
//! A frame runs every registered system once, phase by phase, in
//! registration order within a phase. Systems only append events. The one
//! full clear of the queue happens in Cleanup, so an event emitted in phase N
//! is visible to every later system of the same frame and gone before the
//! next frame starts.

use crate::sim::events::Event;
use crate::sim::systems::{
    self, InputState, ai, boss, buffs, cleanup, collide, combo, damage, death, loot, movement,
    pickup, presentation, progression, spawn, weapons,
};
use crate::world::World;

/// A system: mutates the world given this frame's scaled dt (ms)
pub type SystemFn = fn(&mut World, f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Input and AI decide what to do
    Decision,
    /// Timers, leveling, difficulty, economy
    State,
    /// Movement
    Physics,
    /// Collision detection
    Interaction,
    /// Damage, death, pickups, loot, combo
    Resolution,
    /// Camera, effects, audio hooks
    Presentation,
    /// Expiry, removal, event clear
    Cleanup,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Decision,
        Phase::State,
        Phase::Physics,
        Phase::Interaction,
        Phase::Resolution,
        Phase::Presentation,
        Phase::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Decision => "decision",
            Phase::State => "state",
            Phase::Physics => "physics",
            Phase::Interaction => "interaction",
            Phase::Resolution => "resolution",
            Phase::Presentation => "presentation",
            Phase::Cleanup => "cleanup",
        }
    }
}

/// One registered system
#[derive(Debug, Clone, Copy)]
pub struct SystemEntry {
    pub phase: Phase,
    pub name: &'static str,
    pub run: SystemFn,
}

/// What a frame produced, for hosts that don't read the world directly
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Index of the frame that ran
    pub frame: u64,
    /// Scaled dt the systems saw
    pub dt_ms: f32,
    /// Every event of the frame, copied just before Cleanup
    pub events: Vec<Event>,
    /// False when the world was already over and nothing ran
    pub stepped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    systems: Vec<SystemEntry>,
}

impl Pipeline {
    /// No systems
    pub fn empty() -> Self {
        Self::default()
    }

    /// The full game
    pub fn standard() -> Self {
        let mut p = Self::empty();

        p.add(Phase::Decision, "input", systems::input::run);
        p.add(Phase::Decision, "ai", ai::run);
        p.add(Phase::Decision, "boss_steer", boss::steer);
        p.add(Phase::Decision, "weapons", weapons::run);

        p.add(Phase::State, "buffs", buffs::run);
        p.add(Phase::State, "progression", progression::run);
        p.add(Phase::State, "spawn_economy", spawn::run);
        p.add(Phase::State, "combo_decay", combo::decay);

        p.add(Phase::Physics, "movement", movement::run);

        p.add(Phase::Interaction, "collide", collide::run);

        p.add(Phase::Resolution, "damage", damage::run);
        p.add(Phase::Resolution, "boss_phases", boss::phases);
        p.add(Phase::Resolution, "death", death::run);
        p.add(Phase::Resolution, "pickup_collect", pickup::collect);
        p.add(Phase::Resolution, "pickup_apply", pickup::apply);
        p.add(Phase::Resolution, "loot", loot::run);
        p.add(Phase::Resolution, "combo_award", combo::award);

        p.add(Phase::Presentation, "camera", presentation::camera);
        p.add(Phase::Presentation, "effects", presentation::effects);

        p.add(Phase::Cleanup, "expire_lifetimes", cleanup::expire_lifetimes);
        p.add(Phase::Cleanup, "cull_offscreen", cleanup::cull_offscreen);
        p.add(Phase::Cleanup, "remove_dead", cleanup::remove_dead);
        p.add(Phase::Cleanup, "clear_events", cleanup::clear_events);
        p
    }

    /// Register `run` at the end of `phase`
    pub fn add(&mut self, phase: Phase, name: &'static str, run: SystemFn) -> &mut Self {
        let at = self
            .systems
            .iter()
            .position(|s| s.phase > phase)
            .unwrap_or(self.systems.len());
        self.systems.insert(at, SystemEntry { phase, name, run });
        self
    }

    /// Registered systems in execution order
    pub fn systems(&self) -> &[SystemEntry] {
        &self.systems
    }

    /// Run one frame of `dt_ms` real milliseconds
    pub fn run_frame(&self, world: &mut World, input: &InputState, dt_ms: f32) -> FrameReport {
        if world.game_over {
            return FrameReport {
                frame: world.frame,
                ..Default::default()
            };
        }

        if !world.events.is_empty() {
            log::warn!(
                "{} events left over from before frame {}, discarding",
                world.events.len(),
                world.frame
            );
            world.events.clear();
        }

        let real_dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        world.input = input.clone();
        world.real_dt_ms = real_dt;
        let dt = real_dt * world.time_scale;

        let mut captured: Option<Vec<Event>> = None;
        for system in &self.systems {
            if system.phase == Phase::Cleanup && captured.is_none() {
                captured = Some(world.events.to_vec());
            }
            (system.run)(world, dt);
        }
        // A pipeline without Cleanup still must not leak events into the next frame
        let events = match captured {
            Some(events) => events,
            None => {
                let events = world.events.to_vec();
                world.events.clear();
                events
            }
        };

        let report = FrameReport {
            frame: world.frame,
            dt_ms: dt,
            events,
            stepped: true,
        };
        world.frame += 1;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn world() -> World {
        World::new(GameConfig::default()).unwrap()
    }

    fn shake_probe(world: &mut World, _dt: f32) {
        world.emit(Event::CameraShake { intensity: 0.01 });
    }

    #[test]
    fn test_standard_order_is_by_phase() {
        let p = Pipeline::standard();
        let phases: Vec<Phase> = p.systems().iter().map(|s| s.phase).collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);
        // Collision detection strictly precedes damage resolution
        let pos = |name: &str| p.systems().iter().position(|s| s.name == name).unwrap();
        assert!(pos("collide") < pos("damage"));
        assert_eq!(p.systems().last().map(|s| s.name), Some("clear_events"));
    }

    #[test]
    fn test_add_keeps_phase_order() {
        let mut p = Pipeline::empty();
        p.add(Phase::Cleanup, "c", shake_probe);
        p.add(Phase::Decision, "a", shake_probe);
        p.add(Phase::Decision, "b", shake_probe);
        let names: Vec<_> = p.systems().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_queue_is_empty_between_frames() {
        let mut p = Pipeline::standard();
        p.add(Phase::Decision, "probe", shake_probe);
        let mut w = world();
        for _ in 0..20 {
            let report = p.run_frame(&mut w, &InputState::default(), 1000.0 / 60.0);
            // Visible to the rest of the frame, gone afterwards
            assert!(report.events.iter().any(|e| matches!(e, Event::CameraShake { .. })));
            assert!(w.events().is_empty());
        }
    }

    #[test]
    fn test_stale_events_are_discarded() {
        let mut w = world();
        w.emit(Event::CameraShake { intensity: 0.5 });
        let report = Pipeline::empty().run_frame(&mut w, &InputState::default(), 16.0);
        assert!(report.events.is_empty());
        assert!(w.events().is_empty());
    }

    #[test]
    fn test_time_scale_applies_to_dt() {
        let mut w = world();
        w.time_scale = 0.5;
        let report = Pipeline::empty().run_frame(&mut w, &InputState::default(), 20.0);
        assert_eq!(report.dt_ms, 10.0);
        assert_eq!(w.real_dt_ms, 20.0);
    }

    #[test]
    fn test_game_over_stops_stepping() {
        let mut w = world();
        w.game_over = true;
        let frame = w.frame;
        let report = Pipeline::standard().run_frame(&mut w, &InputState::default(), 16.0);
        assert!(!report.stepped);
        assert_eq!(w.frame, frame);
    }
}
