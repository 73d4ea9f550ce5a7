use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::test_utils::{run_system_once, set_frame_dt};
use crate::common::tunables::Playfield;
use crate::plugins::core::{RunStats, SimRng};
use crate::plugins::effects::QualitySettings;
use crate::plugins::feedback::FeedbackHooks;
use crate::plugins::progression::{ActiveEffects, BonusBundle, SkillState};

use super::*;

fn damage_world() -> World {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    world.insert_resource(SimRng::seeded(1));
    world.insert_resource(Invulnerability::default());
    world.insert_resource(ActiveEffects::default());
    world.insert_resource(RunStats { lives: 3, level: 1, ..RunStats::default() });
    world.insert_resource(BonusBundle::default());
    world.insert_resource(QualitySettings::default());
    world.insert_resource(FeedbackHooks::default());
    world.insert_resource(SkillState::default());
    world.init_resource::<Messages<PlayerHit>>();
    world.init_resource::<NextState<GameState>>();
    run_system_once(&mut world, spawn);
    world
}

fn hit(world: &mut World) {
    world.write_message(PlayerHit { at: Vec2::new(240.0, 690.0) });
    world.resource_mut::<Messages<PlayerHit>>().update();
    run_system_once(world, apply_player_damage);
}

#[test]
fn spawn_creates_player_at_bottom_center() {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    run_system_once(&mut world, spawn);

    let mut q = world.query_filtered::<&Transform, With<Player>>();
    let tf = q.single(&world).unwrap();
    assert_eq!(tf.translation.x, 240.0);
    assert_eq!(tf.translation.y, 690.0);
}

#[test]
fn movement_follows_target_and_clamps_to_field() {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    world.insert_resource(ActiveEffects::default());
    world.insert_resource(BonusBundle::default());
    set_frame_dt(&mut world, 1000.0 / 60.0);
    run_system_once(&mut world, spawn);

    world.insert_resource(PlayerInput {
        target_x: Some(300.0),
        ..PlayerInput::default()
    });
    run_system_once(&mut world, apply_movement);
    let mut q = world.query_filtered::<&Transform, With<Player>>();
    let x = q.single(&world).unwrap().translation.x;
    assert!(x > 240.0 && x < 300.0, "smoothed follow, got {x}");

    // Keyboard axis pushes hard left; the hull never leaves the field.
    world.insert_resource(PlayerInput { move_axis: -1.0, ..PlayerInput::default() });
    for _ in 0..500 {
        run_system_once(&mut world, apply_movement);
    }
    let x = q.single(&world).unwrap().translation.x;
    assert_eq!(x, PLAYER_HALF);
}

#[test]
fn hit_with_shield_consumes_it_without_costing_a_life() {
    let mut world = damage_world();
    world.resource_mut::<ActiveEffects>().shield_ms = 9000.0;

    hit(&mut world);

    assert_eq!(world.resource::<ActiveEffects>().shield_ms, 0.0);
    assert_eq!(world.resource::<RunStats>().lives, 3);
    // Shield hits grant half the usual invincibility window.
    assert_eq!(world.resource::<Invulnerability>().ms, 600.0);
}

#[test]
fn hit_without_shield_costs_a_life_and_grants_invincibility() {
    let mut world = damage_world();

    hit(&mut world);

    assert_eq!(world.resource::<RunStats>().lives, 2);
    assert_eq!(world.resource::<Invulnerability>().ms, 1200.0);
}

#[test]
fn invincibility_blocks_further_hits() {
    let mut world = damage_world();

    hit(&mut world);
    assert_eq!(world.resource::<RunStats>().lives, 2);

    hit(&mut world);
    assert_eq!(world.resource::<RunStats>().lives, 2);
}

#[test]
fn losing_the_last_life_ends_the_run() {
    let mut world = damage_world();
    world.resource_mut::<RunStats>().lives = 1;

    hit(&mut world);

    assert_eq!(world.resource::<RunStats>().lives, 0);
    let next = world.resource::<NextState<GameState>>();
    assert!(matches!(next, NextState::Pending(GameState::GameOver)));
}

#[test]
fn guaranteed_dodge_costs_nothing() {
    let mut world = damage_world();
    let mut bundle = BonusBundle::default();
    bundle.dodge_chance = 1.0;
    world.insert_resource(bundle);

    hit(&mut world);

    assert_eq!(world.resource::<RunStats>().lives, 3);
    assert_eq!(world.resource::<Invulnerability>().ms, 0.0);
}
