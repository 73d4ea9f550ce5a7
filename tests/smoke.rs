mod common;

use bevy::prelude::*;

use nebula_strike::common::state::{GameState, Paused};
use nebula_strike::plugins::core::RunStats;
use nebula_strike::plugins::player::Player;
use nebula_strike::plugins::weapons::{BulletState, PooledBullet};

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();
    for _ in 0..3 {
        app.update();
    }
}

#[test]
fn entering_a_run_spawns_the_player_and_fills_the_pool() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    common::tick_n(&mut app, 3);

    let player_count = app
        .world_mut()
        .query::<&Player>()
        .iter(app.world())
        .count();
    assert_eq!(player_count, 1);

    let pooled = app
        .world_mut()
        .query::<(&PooledBullet, &BulletState)>()
        .iter(app.world())
        .count();
    assert_eq!(pooled, 256);

    let stats = app.world().resource::<RunStats>();
    assert_eq!(stats.level, 1);
    assert_eq!(stats.lives, 4, "normal difficulty baseline");
}

#[test]
fn pausing_freezes_the_whole_tick() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    common::tick_n(&mut app, 5);

    // Auto-fire has been running; capture the score/cooldown state.
    let active_before = active_bullets(&mut app);
    assert!(active_before > 0, "auto-fire should have produced bullets");

    let positions_before = bullet_positions(&mut app);
    app.world_mut().resource_mut::<Paused>().0 = true;
    common::tick_n(&mut app, 10);
    assert_eq!(bullet_positions(&mut app), positions_before, "paused bullets do not move");

    app.world_mut().resource_mut::<Paused>().0 = false;
    common::tick(&mut app);
    assert_ne!(bullet_positions(&mut app), positions_before, "resume continues the run");
}

#[test]
fn leaving_the_run_clears_all_run_state() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    common::tick_n(&mut app, 30);

    app.world_mut().resource_mut::<NextState<GameState>>().set(GameState::Menu);
    app.update();

    let players = app.world_mut().query::<&Player>().iter(app.world()).count();
    assert_eq!(players, 0, "run entities are torn down on exit");

    let live = active_bullets(&mut app);
    assert_eq!(live, 0, "every bullet is recalled to the pool");

    // A fresh run starts from scratch.
    common::start_run(&mut app);
    let stats = app.world().resource::<RunStats>();
    assert_eq!(stats.score, 0);
    assert_eq!(stats.level, 1);
}

fn active_bullets(app: &mut App) -> usize {
    app.world_mut()
        .query::<&BulletState>()
        .iter(app.world())
        .filter(|s| **s == BulletState::Active)
        .count()
}

fn bullet_positions(app: &mut App) -> Vec<(i32, i32)> {
    app.world_mut()
        .query::<(&BulletState, &bevy::prelude::Transform)>()
        .iter(app.world())
        .filter(|(s, _)| **s == BulletState::Active)
        .map(|(_, tf)| (tf.translation.x as i32, tf.translation.y as i32))
        .collect()
}
