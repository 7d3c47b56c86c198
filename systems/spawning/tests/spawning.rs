use std::time::Duration;

use tower_defence_core::{Command, EnemyId, EnemyView, Event, Health, Rules, SpawnPhase};
use tower_defence_system_spawning::{Config, Spawning};
use tower_defence_world::{self as world, query, World};

fn spawning_for(world: &World) -> Spawning {
    Spawning::new(Config::new(query::rules(world).boss_health_multiplier))
}

fn run_spawning(world: &mut World, spawning: &Spawning) -> Vec<Event> {
    let mut commands = Vec::new();
    spawning.handle(
        query::spawn_phase(world),
        &query::enemy_view(world),
        query::leftover_boss_health(world),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn live_enemies_hold_back_the_boss() {
    let mut world = World::new();
    let spawning = spawning_for(&world);

    for _ in 0..10 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(10),
            },
            &mut events,
        );
        assert!(run_spawning(&mut world, &spawning).is_empty());
    }

    assert_eq!(query::spawn_phase(&world), SpawnPhase::PreBoss);
    assert!(!query::boss_present(&world));
}

#[test]
fn boss_spawns_once_after_enemies_are_exhausted() {
    let rules = Rules {
        field_width: 2,
        ..Rules::default()
    };
    let mut world = World::with_rules(rules);
    let spawning = spawning_for(&world);

    let mut events = Vec::new();
    for command in [
        Command::AdvanceEnemy {
            enemy: EnemyId::new(0),
        },
        Command::AdvanceEnemy {
            enemy: EnemyId::new(0),
        },
        Command::RetireEnemies,
    ] {
        world::apply(&mut world, command, &mut events);
    }
    assert!(query::enemy_view(&world).is_empty());

    let events = run_spawning(&mut world, &spawning);
    assert_eq!(
        events,
        vec![Event::BossSpawned {
            enemy: EnemyId::new(1),
            health: Health::new(0),
        }]
    );

    let boss = query::boss(&world).expect("boss spawned");
    assert_eq!(boss.position, query::rules(&world).entry_point());
    assert_eq!(boss.max_health, Health::new(3));

    assert!(
        run_spawning(&mut world, &spawning).is_empty(),
        "the boss trigger is one-shot"
    );
}

#[test]
fn triggered_phase_suppresses_spawning_even_without_enemies() {
    let spawning = Spawning::new(Config::new(3));
    let mut commands = Vec::new();

    spawning.handle(
        SpawnPhase::BossTriggered,
        &EnemyView::default(),
        Some(Health::new(5)),
        &mut commands,
    );
    assert!(commands.is_empty());

    spawning.handle(
        SpawnPhase::PreBoss,
        &EnemyView::default(),
        Some(Health::new(5)),
        &mut commands,
    );
    assert_eq!(
        commands,
        vec![Command::SpawnBoss {
            health: Health::new(15),
        }]
    );
}
