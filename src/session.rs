//! Host-loop facing session
//!
//! Owns the world and the pipeline and converts whatever real-time deltas
//! the host delivers into fixed simulation steps. Hosts read state through
//! [`Session::latest_snapshot`] or by subscribing an observer; neither can
//! mutate the world.

use crate::config::GameConfig;
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_DT_MS};
use crate::error::ConfigError;
use crate::sim::{FrameReport, InputState, Pipeline, Snapshot, build_snapshot};
use crate::world::World;

/// Called with the fresh snapshot after every tick that stepped
pub type Observer = Box<dyn FnMut(&Snapshot)>;

pub struct Session {
    world: World,
    pipeline: Pipeline,
    /// Real time not yet consumed by a fixed step (ms)
    accumulator: f32,
    paused: bool,
    input: InputState,
    latest: Snapshot,
    last_report: Option<FrameReport>,
    observers: Vec<Observer>,
}

impl Session {
    /// Validate `config` and start a session on the standard pipeline
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_pipeline(World::new(config)?, Pipeline::standard()))
    }

    /// Start from an existing world and a custom pipeline
    pub fn with_pipeline(world: World, pipeline: Pipeline) -> Self {
        let latest = build_snapshot(&world);
        log::info!("Session started with {} systems", pipeline.systems().len());
        Self {
            world,
            pipeline,
            accumulator: 0.0,
            paused: false,
            input: InputState::default(),
            latest,
            last_report: None,
            observers: Vec::new(),
        }
    }

    /// Input used by every step until replaced
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Advance by `real_dt_ms` of host time. Returns the number of fixed
    /// steps that ran.
    pub fn tick(&mut self, real_dt_ms: f32) -> u32 {
        if self.paused || self.world.game_over {
            return 0;
        }
        let dt = if real_dt_ms.is_finite() {
            real_dt_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            let report = self.pipeline.run_frame(&mut self.world, &self.input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
            let over = !report.stepped || self.world.game_over;
            self.last_report = Some(report);
            if over {
                self.accumulator = 0.0;
                log::info!("Game over at frame {}, score {}", self.world.frame, self.world.score);
                break;
            }
        }
        // Drop the backlog rather than spiral
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT_MS {
            log::debug!("Dropping {:.1}ms of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        if substeps > 0 {
            self.publish();
        }
        substeps
    }

    /// Run exactly one fixed step regardless of pause or accumulated time
    pub fn step_once(&mut self) -> FrameReport {
        let report = self.pipeline.run_frame(&mut self.world, &self.input, SIM_DT_MS);
        self.last_report = Some(report.clone());
        self.publish();
        report
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.accumulator = 0.0;
            log::info!("Session paused at frame {}", self.world.frame);
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.accumulator = 0.0;
            log::info!("Session resumed at frame {}", self.world.frame);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.world.game_over
    }

    /// Start over with the same balance table and seed
    pub fn restart(&mut self) {
        self.world.reset();
        self.accumulator = 0.0;
        self.input = InputState::default();
        self.paused = false;
        self.last_report = None;
        log::info!("Session restarted");
        self.publish();
    }

    pub fn latest_snapshot(&self) -> &Snapshot {
        &self.latest
    }

    /// Report of the most recent step, if any ran since start or restart
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Register an observer; it first hears about the next published snapshot
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for tools and tests
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn publish(&mut self) {
        self.latest = build_snapshot(&self.world);
        for observer in &mut self.observers {
            observer(&self.latest);
        }
    }
}
