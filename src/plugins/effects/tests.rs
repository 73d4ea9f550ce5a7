use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::test_utils::set_frame_dt;
use crate::common::tunables::Playfield;
use crate::plugins::combat::components::Velocity;

use super::*;

fn count<C: Component>(world: &mut World) -> usize {
    world.query::<&C>().iter(world).count()
}

#[test]
fn explosion_spawns_are_bounded_by_the_budget() {
    let mut world = World::new();
    let mut rng = StdRng::seed_from_u64(3);
    let mut live = 0;

    let mut queue = bevy::ecs::world::CommandQueue::default();
    let mut commands = Commands::new(&mut queue, &world);
    spawn_explosion(&mut commands, &mut rng, &mut live, 10, Vec2::ZERO, Color::WHITE, 50);
    queue.apply(&mut world);

    // Debris is clipped to the remaining budget, leaving no room for the ring.
    assert_eq!(live, 10);
    assert_eq!(count::<VisualEffect>(&mut world), 10);

    // A saturated budget spawns nothing at all.
    let mut queue = bevy::ecs::world::CommandQueue::default();
    let mut commands = Commands::new(&mut queue, &world);
    spawn_explosion(&mut commands, &mut rng, &mut live, 10, Vec2::ZERO, Color::WHITE, 50);
    queue.apply(&mut world);
    assert_eq!(count::<VisualEffect>(&mut world), 10);
}

#[test]
fn hazard_spawns_respect_the_hard_cap() {
    let mut world = World::new();
    let mut live = HAZARD_CAP;

    let mut queue = bevy::ecs::world::CommandQueue::default();
    let mut commands = Commands::new(&mut queue, &world);
    spawn_boss_shot(&mut commands, &mut live, Vec2::ZERO, Vec2::Y, Color::WHITE, 8.0);
    queue.apply(&mut world);

    assert_eq!(count::<HazardShot>(&mut world), 0);
}

#[test]
fn visuals_decay_and_despawn() {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    set_frame_dt(&mut world, 1000.0 / 60.0);
    effects_plugin_resources(&mut world);

    world.spawn((
        VisualEffect { life: 0.05, decay: 0.1, size: 2.0, color: Color::WHITE, wave: None },
        Velocity(Vec2::new(1.0, 0.0)),
        Transform::default(),
    ));

    crate::common::test_utils::run_system_once(&mut world, update_visuals);
    assert_eq!(count::<VisualEffect>(&mut world), 0);
}

#[test]
fn hazards_move_and_cull_offscreen() {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    set_frame_dt(&mut world, 1000.0 / 60.0);

    let inside = world
        .spawn((
            HazardShot { size: 8.0, color: Color::WHITE },
            Velocity(Vec2::new(0.0, 2.0)),
            Transform::from_xyz(100.0, 100.0, 0.0),
        ))
        .id();
    world.spawn((
        HazardShot { size: 8.0, color: Color::WHITE },
        Velocity(Vec2::new(0.0, 2.0)),
        Transform::from_xyz(100.0, 900.0, 0.0),
    ));

    crate::common::test_utils::run_system_once(&mut world, update_hazards);

    assert_eq!(count::<HazardShot>(&mut world), 1);
    let y = world.get::<Transform>(inside).unwrap().translation.y;
    assert!(y > 100.0);
}

#[test]
fn sustained_slow_frames_shrink_the_particle_budget_permanently() {
    let mut world = World::new();
    set_frame_dt(&mut world, 40.0);
    effects_plugin_resources(&mut world);

    // One full sample window of slow frames.
    for _ in 0..80 {
        crate::common::test_utils::run_system_once(&mut world, monitor_frame_rate);
    }
    let budget = world.resource::<QualitySettings>().particle_budget;
    assert!(budget < 300, "budget should have stepped down, got {budget}");

    // It only ever shrinks, never recovers.
    set_frame_dt(&mut world, 5.0);
    for _ in 0..1000 {
        crate::common::test_utils::run_system_once(&mut world, monitor_frame_rate);
    }
    assert_eq!(world.resource::<QualitySettings>().particle_budget, budget);
}

fn effects_plugin_resources(world: &mut World) {
    world.insert_resource(QualitySettings::default());
    world.insert_resource(FrameRateMonitor::default());
}
