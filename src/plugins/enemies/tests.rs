use bevy::prelude::*;

use crate::common::test_utils::{run_system_once, set_frame_dt};
use crate::common::tunables::{Difficulty, Playfield};
use crate::plugins::bosses::BossActive;
use crate::plugins::combat::components::{Extents, Hp};
use crate::plugins::core::{RunStats, SimRng};
use crate::plugins::effects::HazardShot;
use crate::plugins::player::Player;
use crate::plugins::progression::{ActiveEffects, SetPiece, StageDirector};

use super::armada::{ARMADA_ROWS, ArmadaState};
use super::components::*;
use super::spawn::{EnemySeed, build_regular_seed, insert_enemy, roll_kind, scaled_hp};
use super::*;

fn behavior_world() -> World {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    world.insert_resource(ActiveEffects::default());
    world.insert_resource(RunStats { level: 1, ..RunStats::default() });
    world.insert_resource(SimRng::seeded(5));
    set_frame_dt(&mut world, 1000.0 / 60.0);
    world.spawn((Player, Transform::from_xyz(240.0, 690.0, 1.0)));
    world
}

fn spawn_kind(world: &mut World, kind: EnemyKind, pos: Vec2) -> Entity {
    let brain = initial_brain(kind, 240.0);
    let kc = kind_config(kind);
    let mut queue = bevy::ecs::world::CommandQueue::default();
    let mut commands = Commands::new(&mut queue, world);
    let e = insert_enemy(
        &mut commands,
        EnemySeed {
            kind,
            pos,
            extents: Extents::new(kc.hw, kc.hh),
            speed: 2.0,
            hp: 5,
            brain,
        },
    );
    queue.apply(world);
    e
}

#[test]
fn level_one_pool_only_contains_the_basic_kind() {
    let mut rng = SimRng::seeded(9);
    for _ in 0..50 {
        assert_eq!(roll_kind(&mut rng.0, 1), EnemyKind::Plain);
    }
}

#[test]
fn high_level_pool_unlocks_the_late_kinds() {
    let mut rng = SimRng::seeded(9);
    let mut seen_late = false;
    for _ in 0..2000 {
        let kind = roll_kind(&mut rng.0, 25);
        if matches!(kind, EnemyKind::Titan | EnemyKind::Assassin | EnemyKind::Phantom) {
            seen_late = true;
        }
    }
    assert!(seen_late, "late kinds should appear in a large sample");
}

#[test]
fn hp_scales_in_level_steps() {
    assert_eq!(scaled_hp(1.0, 1), 1);
    assert_eq!(scaled_hp(1.0, 4), 2);
    assert_eq!(scaled_hp(4.0, 8), 12);
}

#[test]
fn regular_seed_spawns_above_the_field() {
    let mut rng = SimRng::seeded(2);
    let field = Playfield::default();
    let cfg = Difficulty::Normal.config();
    let seed = build_regular_seed(&mut rng.0, &field, &cfg, 3, EnemyKind::Fast, 240.0);
    assert!(seed.pos.y < 0.0);
    assert!(seed.pos.x >= seed.extents.hw && seed.pos.x <= field.width - seed.extents.hw);
    assert!(seed.hp >= 1);
}

#[test]
fn enemies_descend_each_tick() {
    let mut world = behavior_world();
    let e = spawn_kind(&mut world, EnemyKind::Plain, Vec2::new(100.0, 50.0));

    run_system_once(&mut world, behavior::update_enemies);

    let y = world.get::<Transform>(e).unwrap().translation.y;
    assert!((y - 52.0).abs() < 0.01, "speed 2 at one 60Hz step, got {y}");
}

#[test]
fn time_freeze_suspends_enemy_updates() {
    let mut world = behavior_world();
    world.resource_mut::<ActiveEffects>().time_freeze_ms = 3000.0;
    let e = spawn_kind(&mut world, EnemyKind::Plain, Vec2::new(100.0, 50.0));

    run_system_once(&mut world, behavior::update_enemies);

    assert_eq!(world.get::<Transform>(e).unwrap().translation.y, 50.0);
}

#[test]
fn zigzag_sways_horizontally() {
    let mut world = behavior_world();
    let e = spawn_kind(&mut world, EnemyKind::Zigzag, Vec2::new(100.0, 50.0));

    for _ in 0..10 {
        run_system_once(&mut world, behavior::update_enemies);
    }
    assert!((world.get::<Transform>(e).unwrap().translation.x - 100.0).abs() > 0.5);
}

#[test]
fn shooter_emits_a_hazard_when_its_timer_elapses() {
    let mut world = behavior_world();
    let e = spawn_kind(&mut world, EnemyKind::Shooter, Vec2::new(100.0, 50.0));
    if let EnemyBrain::Shooter { shoot_ms } = &mut *world.get_mut::<EnemyBrain>(e).unwrap() {
        *shoot_ms = 1.0;
    }

    run_system_once(&mut world, behavior::update_enemies);

    let count = world.query::<&HazardShot>().iter(&world).count();
    assert_eq!(count, 1);
}

#[test]
fn leech_regenerates_up_to_max() {
    let mut world = behavior_world();
    let e = spawn_kind(&mut world, EnemyKind::Leech, Vec2::new(100.0, 50.0));
    world.get_mut::<Hp>(e).unwrap().hp = 1;
    if let EnemyBrain::Leech { regen_ms } = &mut *world.get_mut::<EnemyBrain>(e).unwrap() {
        *regen_ms = 1.0;
    }

    run_system_once(&mut world, behavior::update_enemies);

    assert_eq!(world.get::<Hp>(e).unwrap().hp, 2);
}

#[test]
fn phantom_phases_in_and_out() {
    let mut world = behavior_world();
    let e = spawn_kind(&mut world, EnemyKind::Phantom, Vec2::new(100.0, 50.0));
    if let EnemyBrain::Phantom { cycle_ms, .. } = &mut *world.get_mut::<EnemyBrain>(e).unwrap() {
        *cycle_ms = 1300.0;
    }

    run_system_once(&mut world, behavior::update_enemies);

    assert!(world.get::<EnemyBrain>(e).unwrap().is_intangible());
}

#[test]
fn offfield_enemies_vanish_without_reward() {
    let mut world = behavior_world();
    world.insert_resource(BossActive::default());
    let gone = spawn_kind(&mut world, EnemyKind::Plain, Vec2::new(100.0, 900.0));
    let kept = spawn_kind(&mut world, EnemyKind::Plain, Vec2::new(100.0, 100.0));

    run_system_once(&mut world, spawn::cull_offfield);

    assert!(world.get_entity(gone).is_err());
    assert!(world.get_entity(kept).is_ok());
    assert_eq!(world.resource::<RunStats>().kills, 0);
}

// ---------------------------------------------------------------------------
// Armada
// ---------------------------------------------------------------------------

fn armada_world(cols: u32) -> World {
    let mut world = behavior_world();

    let field = *world.resource::<Playfield>();
    let mut state = ArmadaState::default();
    let mut queue = bevy::ecs::world::CommandQueue::default();
    let mut commands = Commands::new(&mut queue, &world);
    spawn_armada(&mut commands, &mut state, &field, Difficulty::Normal, 10, cols, ARMADA_ROWS);
    queue.apply(&mut world);
    world.insert_resource(state);
    world
}

fn snap_into_formation(world: &mut World) {
    let mut q = world.query::<(&mut ArmadaUnit, &mut Transform)>();
    for (mut unit, mut tf) in q.iter_mut(world) {
        unit.in_formation = true;
        tf.translation.x = unit.slot.x;
        tf.translation.y = unit.slot.y;
    }
}

#[test]
fn armada_spawns_a_full_grid_and_sets_the_flag() {
    let mut world = armada_world(3);
    assert!(world.resource::<ArmadaState>().active);
    let count = world.query::<&ArmadaUnit>().iter(&world).count();
    assert_eq!(count, (3 * ARMADA_ROWS) as usize);
}

#[test]
fn units_fly_toward_their_slots_first() {
    let mut world = armada_world(3);
    let before: Vec<(Entity, f32)> = {
        let mut q = world.query::<(Entity, &ArmadaUnit, &Transform)>();
        q.iter(&world).map(|(e, _, tf)| (e, tf.translation.y)).collect()
    };

    run_system_once(&mut world, armada::update_armada);

    for (e, y0) in before {
        let y1 = world.get::<Transform>(e).unwrap().translation.y;
        assert!(y1 > y0, "unit should descend toward its slot");
        assert!(!world.get::<ArmadaUnit>(e).unwrap().in_formation);
    }
}

#[test]
fn only_each_columns_vanguard_fires_the_salvo() {
    let mut world = armada_world(3);
    snap_into_formation(&mut world);
    world.resource_mut::<ArmadaState>().salvo_ms = 0.0;

    run_system_once(&mut world, armada::update_armada);

    let shots: Vec<f32> = world
        .query::<(&HazardShot, &Transform)>()
        .iter(&world)
        .map(|(_, tf)| tf.translation.y)
        .collect();
    assert_eq!(shots.len(), 3, "one shot per column");

    // Every salvo muzzle sits at the frontmost (highest) row.
    let vanguard_y = world
        .query::<&ArmadaUnit>()
        .iter(&world)
        .map(|u| u.slot.y)
        .fold(f32::MIN, f32::max);
    for y in shots {
        assert!(y > vanguard_y, "salvo must come from the vanguard row");
    }
}

#[test]
fn killing_the_vanguard_promotes_the_next_row() {
    let mut world = armada_world(1);
    snap_into_formation(&mut world);

    let (front, front_row) = {
        let mut q = world.query::<(Entity, &ArmadaUnit)>();
        q.iter(&world).max_by_key(|(_, u)| u.row).map(|(e, u)| (e, u.row)).unwrap()
    };
    world.despawn(front);

    world.resource_mut::<ArmadaState>().salvo_ms = 0.0;
    run_system_once(&mut world, armada::update_armada);

    let mut q = world.query::<(&HazardShot, &Transform)>();
    let shot_y = q.iter(&world).map(|(_, tf)| tf.translation.y).next().unwrap();
    let expected_row = front_row - 1;
    let expected_y = 90.0 + expected_row as f32 * 46.0 + 12.0;
    assert!(
        (shot_y - expected_y).abs() < 0.5,
        "salvo should come from the promoted row, got y {shot_y}"
    );
}

#[test]
fn armada_flag_clears_once_all_units_are_gone() {
    let mut world = armada_world(2);
    let units: Vec<Entity> = {
        let mut q = world.query_filtered::<Entity, With<ArmadaUnit>>();
        q.iter(&world).collect()
    };
    for e in units {
        world.despawn(e);
    }

    run_system_once(&mut world, armada::armada_bookkeeping);
    assert!(!world.resource::<ArmadaState>().active);
}

#[test]
fn launch_consumes_the_directors_pending_armada() {
    let mut world = behavior_world();
    world.insert_resource(ArmadaState::default());
    world.insert_resource(Difficulty::Normal);
    world.insert_resource(StageDirector { pending: Some(SetPiece::Armada) });

    run_system_once(&mut world, armada::launch_armada);

    assert!(world.resource::<ArmadaState>().active);
    assert!(world.resource::<StageDirector>().pending.is_none());
    let count = world.query::<&ArmadaUnit>().iter(&world).count();
    assert!(count > 0);
}
