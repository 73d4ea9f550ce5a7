//! End-to-end simulation flows on the headless app.

mod common;

use bevy::prelude::*;

use nebula_strike::common::tunables::level_threshold;
use nebula_strike::plugins::bosses::{Boss, BossActive, SpawnInvincible, clear_spawn_invincibility};
use nebula_strike::plugins::combat::components::{Extents, Hp};
use nebula_strike::plugins::combat::Combo;
use nebula_strike::plugins::core::RunStats;
use nebula_strike::plugins::enemies::components::{Enemy, EnemyKind, MoveSpeed};
use nebula_strike::plugins::enemies::{ArmadaState, ArmadaUnit, EnemyBrain};
use nebula_strike::plugins::player::Player;
use nebula_strike::plugins::progression::{SetPiece, StageDirector};

fn plant_target(app: &mut App, pos: Vec2, hp: i32) -> Entity {
    app.world_mut()
        .spawn((
            Enemy,
            EnemyKind::Plain,
            EnemyBrain::Plain,
            Extents::new(16.0, 14.0),
            MoveSpeed(0.0),
            Hp::full(hp),
            Transform::from_xyz(pos.x, pos.y, 3.0),
            bevy::state::state_scoped::DespawnOnExit(
                nebula_strike::common::state::GameState::InGame,
            ),
        ))
        .id()
}

#[test]
fn auto_fire_kills_a_target_and_scores_through_the_kill_path() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    // Park a stationary target straight up the firing line.
    let player_x = {
        let mut q = app.world_mut().query_filtered::<&Transform, With<Player>>();
        q.single(app.world()).unwrap().translation.x
    };
    plant_target(&mut app, Vec2::new(player_x, 300.0), 1);

    common::tick_n(&mut app, 120);

    let stats = app.world().resource::<RunStats>();
    assert!(stats.kills >= 1, "the parked target must die to auto-fire");
    assert!(stats.score > 0);
    assert!(stats.level_progress > 0);
    assert!(app.world().resource::<Combo>().best >= 2);
}

#[test]
fn reaching_an_odd_decade_summons_the_armada() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    {
        let mut stats = app.world_mut().resource_mut::<RunStats>();
        stats.level = 9;
        stats.level_progress = level_threshold(9, Default::default());
    }
    // One frame to run progression, one for the spawner to consume it.
    common::tick_n(&mut app, 2);

    assert_eq!(app.world().resource::<RunStats>().level, 10);
    assert!(app.world().resource::<ArmadaState>().active);
    let units = app.world_mut().query::<&ArmadaUnit>().iter(app.world()).count();
    assert!(units > 0);
    assert!(app.world().resource::<StageDirector>().pending.is_none());
}

#[test]
fn reaching_an_even_decade_summons_a_boss_with_entrance_grace() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    {
        let mut stats = app.world_mut().resource_mut::<RunStats>();
        stats.level = 19;
        stats.level_progress = level_threshold(19, Default::default());
    }
    common::tick_n(&mut app, 2);

    assert_eq!(app.world().resource::<RunStats>().level, 20);
    let boss = app.world().resource::<BossActive>().0.expect("boss handle exposed");
    assert!(app.world().get::<Boss>(boss).is_some());
    assert!(app.world().get::<SpawnInvincible>(boss).is_some());

    // The intro layer clears the grace through the public helper.
    clear_spawn_invincibility(app.world_mut());
    assert!(app.world().get::<SpawnInvincible>(boss).is_none());
}

#[test]
fn decade_director_never_queues_both_set_pieces() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    app.world_mut().resource_mut::<StageDirector>().pending = Some(SetPiece::Boss);
    common::tick_n(&mut app, 2);

    assert!(app.world().resource::<BossActive>().0.is_some());
    assert!(
        !app.world().resource::<ArmadaState>().active,
        "a queued boss must not also raise an armada"
    );
}

#[test]
fn abandoning_a_boss_fight_discards_withheld_xp() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    app.world_mut().resource_mut::<StageDirector>().pending = Some(SetPiece::Boss);
    common::tick_n(&mut app, 2);
    assert!(app.world().resource::<BossActive>().0.is_some());

    {
        let mut stats = app.world_mut().resource_mut::<RunStats>();
        stats.pending_level_progress = 900;
    }

    // Back to the menu mid-fight; then a new run.
    app.world_mut()
        .resource_mut::<NextState<nebula_strike::common::state::GameState>>()
        .set(nebula_strike::common::state::GameState::Menu);
    app.update();
    common::start_run(&mut app);

    let stats = app.world().resource::<RunStats>();
    assert_eq!(stats.pending_level_progress, 0, "withheld XP does not survive the fight");
    assert_eq!(stats.level_progress, 0);
}
