//! Headless driver: runs a session with scripted input and logs the outcome.
//!
//! Usage: `nova-strike [config.json] [seconds]`

use nova_strike::consts::SIM_DT_MS;
use nova_strike::{GameConfig, InputState, Session};

/// Simulated seconds when none are given
const DEFAULT_SECONDS: f32 = 60.0;

fn main() {
    env_logger::init();
    log::info!("Nova Strike (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid config: {e}");
            std::process::exit(1);
        }
    };

    let mut last_level = 0;
    session.subscribe(move |snap| {
        if snap.level != last_level {
            log::info!("Level {} '{}' at {:.1}s", snap.level, snap.level_name, snap.time);
            last_level = snap.level;
        }
    });

    // Host frames at 60 Hz against the 120 Hz simulation
    let host_dt = SIM_DT_MS * 2.0;
    let frames = (seconds * 1000.0 / host_dt) as u64;
    for frame in 0..frames {
        // Sweep side to side while holding fire
        let t = frame as f32 * host_dt / 1000.0;
        let left = t.sin() < 0.0;
        session.set_input(InputState::from_keys(left, !left, false, false, true));
        session.tick(host_dt);
        if session.is_over() {
            break;
        }
    }

    let snap = session.latest_snapshot();
    log::info!(
        "Finished after {:.1}s: score {}, level {}, {} enemies alive, game over: {}",
        snap.time,
        snap.score,
        snap.level,
        snap.enemies.len(),
        snap.game_over
    );
}
