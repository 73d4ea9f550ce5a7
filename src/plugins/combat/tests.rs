use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::test_utils::{run_system_once, set_frame_dt};
use crate::common::tunables::{Difficulty, Playfield};
use crate::plugins::bosses::{Boss, BossActive, BossBrain, BossId, BossPhases, SpawnInvincible};
use crate::plugins::core::{RunStats, SimRng};
use crate::plugins::effects::QualitySettings;
use crate::plugins::enemies::components::{Enemy, EnemyBrain, EnemyKind, MoveSpeed};
use crate::plugins::feedback::FeedbackHooks;
use crate::plugins::player::{Player, PlayerHit};
use crate::plugins::powerups::PowerUp;
use crate::plugins::progression::{ActiveEffects, BonusBundle, ProgressStore, SaveThrottle};
use crate::plugins::weapons::{
    Bullet, BulletPayload, BulletState, Detonation, PooledBullet, SpawnBulletRequest, WeaponId,
};

use super::components::{Extents, Hp, PendingDespawn, Velocity};
use super::grid::{GRID_ROWS, SpatialGrid, rebuild_grid};
use super::kill::{Combo, process_kills, tick_combo};
use super::resolve::{
    apply_detonations, collide_bullets, enemies_contact_player, hazards_vs_player,
};

fn combat_world() -> World {
    let mut world = World::new();
    world.insert_resource(Playfield::default());
    world.insert_resource(SpatialGrid::default());
    world.insert_resource(FeedbackHooks::default());
    world.insert_resource(SimRng::seeded(21));
    world.insert_resource(QualitySettings::default());
    world.init_resource::<Messages<Detonation>>();
    world.init_resource::<Messages<SpawnBulletRequest>>();
    set_frame_dt(&mut world, 1000.0 / 60.0);
    world
}

fn kill_world() -> World {
    let mut world = combat_world();
    world.insert_resource(Difficulty::Normal);
    world.insert_resource(RunStats { level: 1, lives: 4, ..RunStats::default() });
    world.insert_resource(Combo::default());
    world.insert_resource(ProgressStore::default());
    world.insert_resource(SaveThrottle::default());
    world.insert_resource(BonusBundle::default());
    world.insert_resource(ActiveEffects::default());
    world.insert_resource(BossActive::default());
    world
}

fn spawn_enemy(world: &mut World, kind: EnemyKind, pos: Vec2, hp: i32) -> Entity {
    let brain = crate::plugins::enemies::components::initial_brain(kind, 240.0);
    world
        .spawn((
            Enemy,
            kind,
            brain,
            Extents::new(16.0, 14.0),
            MoveSpeed(1.0),
            Hp::full(hp),
            Transform::from_xyz(pos.x, pos.y, 3.0),
        ))
        .id()
}

fn spawn_bullet(world: &mut World, pos: Vec2, bullet: Bullet) -> Entity {
    world
        .spawn((
            PooledBullet,
            BulletState::Active,
            bullet,
            Extents::new(3.0, 11.0),
            Velocity(Vec2::new(0.0, -13.0)),
            Transform::from_xyz(pos.x, pos.y, 2.0),
        ))
        .id()
}

fn laser(damage: f32) -> Bullet {
    Bullet { kind: WeaponId::Laser, damage, pierce: None, payload: BulletPayload::Plain }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[test]
fn grid_registers_enemies_in_every_overlapping_row() {
    let mut world = combat_world();
    // Field is 800 tall, so each of the 12 rows is ~66px. A 14px-tall enemy
    // centered on a boundary straddles two rows.
    spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 800.0 / 12.0), 5);
    spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 30.0), 5);

    run_system_once(&mut world, rebuild_grid);

    let grid = world.resource::<SpatialGrid>();
    assert_eq!(grid.len(), 3, "one single-row enemy plus one straddler");
    assert!(!grid.row(0).is_empty());
    assert!(!grid.row(1).is_empty());
}

#[test]
fn grid_row_span_clamps_to_the_field() {
    let mut grid = SpatialGrid::default();
    grid.reset(800.0);
    assert_eq!(grid.row_span(-50.0, -10.0), (0, 0));
    assert_eq!(grid.row_span(790.0, 900.0), (GRID_ROWS - 1, GRID_ROWS - 1));
}

// ---------------------------------------------------------------------------
// Bullet x enemy resolution
// ---------------------------------------------------------------------------

#[test]
fn simple_hit_damages_and_consumes_the_bullet() {
    let mut world = combat_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 200.0), 3);
    let bullet = spawn_bullet(&mut world, Vec2::new(100.0, 200.0), laser(1.0));

    run_system_once(&mut world, rebuild_grid);
    run_system_once(&mut world, collide_bullets);

    assert_eq!(world.get::<Hp>(enemy).unwrap().hp, 2);
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::PendingReturn);
}

#[test]
fn pierce_chains_through_exactly_cap_plus_one_enemies() {
    let mut world = combat_world();
    // Three enemies stacked in the same rows; cap 1 means two victims.
    let enemies: Vec<Entity> = (0..3)
        .map(|i| spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0 + i as f32, 200.0), 5))
        .collect();
    let bullet = spawn_bullet(
        &mut world,
        Vec2::new(100.0, 200.0),
        Bullet {
            kind: WeaponId::Laser,
            damage: 1.0,
            pierce: Some(crate::plugins::weapons::Pierce { hit: Default::default(), max: Some(1) }),
            payload: BulletPayload::Plain,
        },
    );

    run_system_once(&mut world, rebuild_grid);
    run_system_once(&mut world, collide_bullets);

    let damaged = enemies.iter().filter(|e| world.get::<Hp>(**e).unwrap().hp < 5).count();
    assert_eq!(damaged, 2, "cap 1 = exactly two distinct victims");
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::PendingReturn);
    let pierce = world.get::<Bullet>(bullet).unwrap().pierce.as_ref().unwrap();
    assert_eq!(pierce.hit.len(), 2);
}

#[test]
fn pierce_never_redamages_a_remembered_enemy() {
    let mut world = combat_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 200.0), 5);
    let bullet = spawn_bullet(
        &mut world,
        Vec2::new(100.0, 200.0),
        Bullet {
            kind: WeaponId::Laser,
            damage: 1.0,
            pierce: Some(crate::plugins::weapons::Pierce {
                hit: Default::default(),
                max: Some(5),
            }),
            payload: BulletPayload::Plain,
        },
    );

    run_system_once(&mut world, rebuild_grid);
    run_system_once(&mut world, collide_bullets);
    run_system_once(&mut world, collide_bullets);

    assert_eq!(world.get::<Hp>(enemy).unwrap().hp, 4, "one hit despite two passes");
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::Active);
}

#[test]
fn energy_shield_absorbs_the_hit_before_hp() {
    let mut world = combat_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Shielder, Vec2::new(100.0, 200.0), 5);
    let bullet = spawn_bullet(&mut world, Vec2::new(100.0, 200.0), laser(3.0));

    run_system_once(&mut world, rebuild_grid);
    run_system_once(&mut world, collide_bullets);

    assert_eq!(world.get::<Hp>(enemy).unwrap().hp, 5, "no hp damage through the shield");
    match world.get::<EnemyBrain>(enemy).unwrap() {
        EnemyBrain::Shielder { charges } => assert_eq!(*charges, 1),
        other => panic!("expected shielder brain, got {other:?}"),
    }
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::PendingReturn);
}

#[test]
fn entrance_grace_blocks_all_bullet_damage() {
    let mut world = combat_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Boss, Vec2::new(100.0, 200.0), 50);
    world.entity_mut(enemy).insert(SpawnInvincible::default());
    let bullet = spawn_bullet(&mut world, Vec2::new(100.0, 200.0), laser(5.0));

    run_system_once(&mut world, rebuild_grid);
    run_system_once(&mut world, collide_bullets);

    assert_eq!(world.get::<Hp>(enemy).unwrap().hp, 50);
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::Active);
}

#[test]
fn rocket_impact_queues_a_detonation_and_is_consumed() {
    let mut world = combat_world();
    spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 200.0), 5);
    let bullet = spawn_bullet(
        &mut world,
        Vec2::new(100.0, 200.0),
        Bullet {
            kind: WeaponId::Rocket,
            damage: 4.0,
            pierce: None,
            payload: BulletPayload::Rocket { split: 1 },
        },
    );

    run_system_once(&mut world, rebuild_grid);
    run_system_once(&mut world, collide_bullets);

    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::PendingReturn);
    assert_eq!(world.resource::<Messages<Detonation>>().len(), 1);
}

#[test]
fn detonations_damage_with_linear_falloff_and_respawn_splits() {
    let mut world = combat_world();
    let near = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 200.0), 30);
    let far = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(160.0, 200.0), 30);
    let outside = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(300.0, 200.0), 30);

    world.write_message(Detonation {
        pos: Vec2::new(100.0, 200.0),
        radius: 80.0,
        damage: 12.0,
        split: 1,
        color: Color::WHITE,
    });
    world.resource_mut::<Messages<Detonation>>().update();

    run_system_once(&mut world, apply_detonations);

    let near_dmg = 30 - world.get::<Hp>(near).unwrap().hp;
    let far_dmg = 30 - world.get::<Hp>(far).unwrap().hp;
    assert!(near_dmg > far_dmg, "closer targets take more splash");
    assert!(far_dmg > 0);
    assert_eq!(world.get::<Hp>(outside).unwrap().hp, 30, "outside the radius");

    assert_eq!(
        world.resource::<Messages<SpawnBulletRequest>>().len(),
        2,
        "split rockets respawn as bullet requests"
    );
}

// ---------------------------------------------------------------------------
// Player-facing passes
// ---------------------------------------------------------------------------

#[test]
fn hazard_overlap_consumes_the_shot_and_reports_a_hit() {
    let mut world = combat_world();
    world.init_resource::<Messages<PlayerHit>>();
    world.spawn((Player, Extents::new(22.0, 22.0), Transform::from_xyz(240.0, 690.0, 1.0)));
    world.spawn((
        crate::plugins::effects::HazardShot { size: 8.0, color: Color::WHITE },
        Velocity(Vec2::new(0.0, 2.0)),
        Transform::from_xyz(245.0, 695.0, 4.0),
    ));

    run_system_once(&mut world, hazards_vs_player);

    let hazards =
        world.query::<&crate::plugins::effects::HazardShot>().iter(&world).count();
    assert_eq!(hazards, 0);
    assert_eq!(world.resource::<Messages<PlayerHit>>().len(), 1);
}

#[test]
fn ramming_enemies_die_unrewarded_and_hurt_the_player() {
    let mut world = combat_world();
    world.init_resource::<Messages<PlayerHit>>();
    world.spawn((Player, Extents::new(22.0, 22.0), Transform::from_xyz(240.0, 690.0, 1.0)));
    let rammer = spawn_enemy(&mut world, EnemyKind::Fast, Vec2::new(245.0, 695.0), 5);
    let boss = spawn_enemy(&mut world, EnemyKind::Boss, Vec2::new(240.0, 690.0), 100);

    run_system_once(&mut world, enemies_contact_player);

    assert!(world.get_entity(rammer).is_err(), "regular rammer is destroyed");
    assert!(world.get_entity(boss).is_ok(), "bosses survive contact");
    assert_eq!(world.resource::<Messages<PlayerHit>>().len(), 2);
}

// ---------------------------------------------------------------------------
// Combo
// ---------------------------------------------------------------------------

#[test]
fn combo_caps_at_twenty_and_resets_after_idle() {
    let mut combo = Combo::default();
    for _ in 0..30 {
        combo.register_kill();
    }
    assert_eq!(combo.value, 20);
    assert_eq!(combo.best, 20);

    combo.tick(super::kill::COMBO_IDLE_MS + 1.0);
    assert_eq!(combo.value, 20, "still within the window on this tick");
    combo.tick(16.7);
    assert_eq!(combo.value, 1, "idle timeout resets to exactly 1");
    assert_eq!(combo.best, 20);
}

#[test]
fn tick_combo_system_drives_the_decay() {
    let mut world = combat_world();
    world.insert_resource(Combo { value: 7, timer_ms: 5.0, best: 7 });

    run_system_once(&mut world, tick_combo);
    run_system_once(&mut world, tick_combo);

    assert_eq!(world.resource::<Combo>().value, 1);
}

// ---------------------------------------------------------------------------
// Kill path
// ---------------------------------------------------------------------------

#[test]
fn kill_rewards_match_the_normal_difficulty_reference() {
    let mut world = kill_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 200.0), 1);
    world.get_mut::<Hp>(enemy).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);

    // floor(10 * 1 * 1.5 * 1) on normal difficulty.
    let stats = world.resource::<RunStats>();
    assert_eq!(stats.score, 15);
    assert_eq!(stats.level_progress, 15);
    assert_eq!(stats.kills, 1);
    assert_eq!(world.resource::<Combo>().value, 2);
    assert!(world.get::<PendingDespawn>(enemy).is_some());
    assert!(world.resource::<SaveThrottle>().dirty);
    assert_eq!(world.resource::<ProgressStore>().total_kills, 1);
}

#[test]
fn the_kill_path_runs_exactly_once_per_enemy() {
    let mut world = kill_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 200.0), 1);
    world.get_mut::<Hp>(enemy).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);
    run_system_once(&mut world, process_kills);

    let stats = world.resource::<RunStats>();
    assert_eq!(stats.kills, 1, "marked enemies are never re-rewarded");
    assert_eq!(stats.score, 15);
}

#[test]
fn splitters_fragment_through_the_kill_path() {
    let mut world = kill_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::Splitter, Vec2::new(100.0, 200.0), 1);
    world.get_mut::<Hp>(enemy).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);

    let fast = world
        .query::<&EnemyKind>()
        .iter(&world)
        .filter(|k| **k == EnemyKind::Fast)
        .count();
    assert_eq!(fast, 2, "two fragments");
}

#[test]
fn miniboss_kills_always_drop_a_powerup() {
    let mut world = kill_world();
    let enemy = spawn_enemy(&mut world, EnemyKind::MiniBoss, Vec2::new(100.0, 200.0), 1);
    world.entity_mut(enemy).insert(crate::plugins::bosses::MiniBoss {
        id: crate::plugins::bosses::MiniBossId::Warden,
        name: "WARDEN",
        color: Color::WHITE,
    });
    world.get_mut::<Hp>(enemy).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);

    assert_eq!(world.query::<&PowerUp>().iter(&world).count(), 1);
}

#[test]
fn boss_defeat_flushes_withheld_mission_xp() {
    let mut world = kill_world();
    let boss = spawn_enemy(&mut world, EnemyKind::Boss, Vec2::new(240.0, 120.0), 1);
    world.entity_mut(boss).insert((
        Boss { id: BossId::Guardian, name: "GUARDIAN", color: Color::WHITE },
        BossBrain::Guardian { dir: 1.0, shoot_ms: 0.0 },
        BossPhases::default(),
    ));
    world.insert_resource(BossActive(Some(boss)));
    {
        let mut stats = world.resource_mut::<RunStats>();
        stats.pending_level_progress = 400;
    }
    world.get_mut::<Hp>(boss).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);

    let stats = world.resource::<RunStats>();
    assert!(world.resource::<BossActive>().0.is_none());
    assert_eq!(stats.bosses_killed, 1);
    // 500*level bonus + floor(500 * 1 * 1.5 * 1) + the flushed 400.
    assert_eq!(stats.level_progress, 500 + 750 + 400);
    assert_eq!(stats.pending_level_progress, 0);
    assert_eq!(stats.score, 500 + 750);
}

#[test]
fn phoenix_survives_its_first_death_at_sixty_percent() {
    let mut world = kill_world();
    let boss = spawn_enemy(&mut world, EnemyKind::Boss, Vec2::new(240.0, 120.0), 100);
    world.entity_mut(boss).insert((
        Boss { id: BossId::Phoenix, name: "PHOENIX", color: Color::WHITE },
        BossBrain::Phoenix {
            drift: 0.0,
            orb_angle: 0.0,
            shoot_ms: 0.0,
            orbits: [crate::plugins::bosses::registry::Orbit { angle: 0.0, dist: 90.0 }; 3],
            reborn: false,
        },
        BossPhases::default(),
    ));
    world.insert_resource(BossActive(Some(boss)));
    world.get_mut::<Hp>(boss).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);

    assert_eq!(world.get::<Hp>(boss).unwrap().hp, 60);
    assert!(world.get::<PendingDespawn>(boss).is_none());
    assert_eq!(world.resource::<RunStats>().score, 0, "rebirth pays nothing");

    // The second death is final.
    world.get_mut::<Hp>(boss).unwrap().hp = 0;
    run_system_once(&mut world, process_kills);
    assert!(world.get::<PendingDespawn>(boss).is_some());
}

#[test]
fn kills_during_a_boss_fight_are_withheld() {
    let mut world = kill_world();
    let boss = spawn_enemy(&mut world, EnemyKind::Boss, Vec2::new(240.0, 120.0), 100);
    world.insert_resource(BossActive(Some(boss)));
    let grunt = spawn_enemy(&mut world, EnemyKind::Plain, Vec2::new(100.0, 300.0), 1);
    world.get_mut::<Hp>(grunt).unwrap().hp = 0;

    run_system_once(&mut world, process_kills);

    let stats = world.resource::<RunStats>();
    assert_eq!(stats.level_progress, 0);
    assert_eq!(stats.pending_level_progress, 15);
    assert_eq!(stats.score, 15, "score is still paid live");
}
