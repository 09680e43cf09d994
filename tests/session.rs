//! End-to-end session behaviour: fixed stepping, determinism, host controls.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use nova_strike::consts::SIM_DT_MS;
use nova_strike::ecs::Invincibility;
use nova_strike::sim::Event;
use nova_strike::{Blueprint, ConfigError, GameConfig, InputState, Session, spawn_entity};

const HOST_DT: f32 = 1000.0 / 60.0;

fn scripted_input(frame: u32) -> InputState {
    let left = (frame / 90) % 2 == 0;
    InputState::from_keys(left, !left, frame % 200 < 20, false, true)
}

fn play(session: &mut Session, frames: u32) {
    for frame in 0..frames {
        session.set_input(scripted_input(frame));
        session.tick(HOST_DT);
    }
}

#[test]
fn test_same_seed_same_game() {
    let mut a = Session::new(GameConfig::default()).unwrap();
    let mut b = Session::new(GameConfig::default()).unwrap();
    play(&mut a, 1200);
    play(&mut b, 1200);
    assert_eq!(a.latest_snapshot(), b.latest_snapshot());
    assert!(a.latest_snapshot().frame > 0);
}

#[test]
fn test_different_seed_diverges() {
    let mut config = GameConfig::default();
    config.seed ^= 0xDEAD_BEEF;
    let mut a = Session::new(GameConfig::default()).unwrap();
    let mut b = Session::new(config).unwrap();
    play(&mut a, 1200);
    play(&mut b, 1200);
    assert_ne!(a.latest_snapshot(), b.latest_snapshot());
}

#[test]
fn test_pause_stops_time() {
    let mut s = Session::new(GameConfig::default()).unwrap();
    play(&mut s, 30);
    let before = s.latest_snapshot().clone();

    s.pause();
    assert!(s.is_paused());
    play(&mut s, 120);
    assert_eq!(s.latest_snapshot(), &before);
    assert_eq!(s.world().frame, before.frame);

    s.resume();
    play(&mut s, 1);
    assert!(s.latest_snapshot().frame > before.frame);
}

#[test]
fn test_restart_replays_from_scratch() {
    let mut fresh = Session::new(GameConfig::default()).unwrap();
    play(&mut fresh, 300);

    let mut s = Session::new(GameConfig::default()).unwrap();
    play(&mut s, 500);
    s.restart();
    let snap = s.latest_snapshot();
    assert_eq!(snap.frame, 0);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.level, 1);
    assert!(snap.enemies.is_empty());
    assert!(s.last_report().is_none());

    play(&mut s, 300);
    assert_eq!(s.latest_snapshot(), fresh.latest_snapshot());
}

#[test]
fn test_observers_see_every_published_snapshot() {
    let mut s = Session::new(GameConfig::default()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    s.subscribe(move |snap| sink.borrow_mut().push(snap.frame));

    // Too short for a fixed step: nothing published
    s.tick(SIM_DT_MS * 0.5);
    assert!(seen.borrow().is_empty());

    play(&mut s, 10);
    let frames = seen.borrow().clone();
    assert!(!frames.is_empty());
    assert!(frames.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(frames.last().copied(), Some(s.latest_snapshot().frame));
}

#[test]
fn test_event_queue_empty_after_every_tick() {
    let mut s = Session::new(GameConfig::default()).unwrap();
    for frame in 0..600 {
        s.set_input(scripted_input(frame));
        s.tick(HOST_DT);
        assert!(s.world().events().is_empty());
    }
}

#[test]
fn test_lethal_hit_ends_the_game() {
    let mut s = Session::new(GameConfig::default()).unwrap();
    let player = s.world().player_id.unwrap();
    // Drop the spawn protection so the hit lands
    s.world_mut().remove_component::<Invincibility>(player);
    let player_pos = s.latest_snapshot().player.as_ref().map(|p| p.pos).unwrap();
    spawn_entity(
        s.world_mut(),
        &Blueprint::EnemyBullet {
            velocity: Vec2::ZERO,
            damage: 1.0e6,
            radius: 8.0,
        },
        player_pos.x,
        player_pos.y,
    )
    .unwrap();

    s.tick(SIM_DT_MS);
    assert!(s.is_over());
    let snap = s.latest_snapshot();
    assert!(snap.game_over);
    assert!(snap.player.is_none());
    let report = s.last_report().unwrap();
    assert_eq!(
        report
            .events
            .iter()
            .filter(|e| matches!(e, Event::Death { .. }))
            .count(),
        1
    );

    // Nothing steps once the game is over
    let frame = s.world().frame;
    assert_eq!(s.tick(1000.0), 0);
    assert_eq!(s.world().frame, frame);
}

#[test]
fn test_invalid_config_never_starts() {
    let mut config = GameConfig::default();
    config.levels.clear();
    assert!(matches!(Session::new(config), Err(ConfigError::NoLevels)));

    let mut config = GameConfig::default();
    config.levels[0].pool.clear();
    assert!(matches!(
        Session::new(config),
        Err(ConfigError::EmptySpawnPool { level: 0 })
    ));
}
