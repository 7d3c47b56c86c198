#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for the tower defence simulation.
//!
//! [`Simulation`] drives the world through one deterministic tick at a time
//! by routing read-only views into the pure systems and applying the commands
//! they emit. [`TickLoop`] runs a simulation on a dedicated thread at a fixed
//! cadence and publishes snapshots for renderers.

mod runtime;

use std::time::Duration;

use log::trace;
use tower_defence_core::{
    Command, EnemyId, EnemySnapshot, Event, FieldPoint, ProjectileSnapshot, Rules, TowerSnapshot,
    TowerTarget,
};
use tower_defence_system_collision::Collision;
use tower_defence_system_spawning::{Config as SpawningConfig, Spawning};
use tower_defence_system_tower_combat::TowerCombat;
use tower_defence_system_tower_targeting::TowerTargeting;
use tower_defence_world::{self as world, query, World};

pub use runtime::{SimulationError, TickLoop};

/// Owned copy of everything a renderer needs after a tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationSnapshot {
    /// Towers in placement order.
    pub towers: Vec<TowerSnapshot>,
    /// Projectiles in firing order.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Normal enemies in collection order.
    pub enemies: Vec<EnemySnapshot>,
    /// The boss while it is on the field.
    pub boss: Option<EnemySnapshot>,
    /// Whether both waves have been cleared.
    pub victory: bool,
    /// Number of ticks processed so far.
    pub tick_index: u64,
    /// Simulated time elapsed since the session started.
    pub elapsed: Duration,
}

/// Deterministic simulation driver combining the world with its systems.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    collision: Collision,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Creates a simulation governed by the provided rules.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        let spawning = Spawning::new(SpawningConfig::new(rules.boss_health_multiplier));
        Self {
            world: World::with_rules(rules),
            spawning,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            collision: Collision::new(),
            targets: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Places a tower at the exact position provided.
    ///
    /// Positions are not validated; towers outside the field simply never
    /// find a target.
    pub fn place_tower(&mut self, position: FieldPoint, out: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::PlaceTower { position }, out);
    }

    /// Advances the simulation by one tick of `dt` simulated time.
    ///
    /// Events produced during the tick are appended to `out` in the order the
    /// world emitted them.
    pub fn step(&mut self, dt: Duration, out: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::Tick { dt }, out);

        let (attack_range, attack_cooldown, hit_threshold) = {
            let rules = query::rules(&self.world);
            (rules.attack_range, rules.attack_cooldown, rules.hit_threshold)
        };

        self.spawning.handle(
            query::spawn_phase(&self.world),
            &query::enemy_view(&self.world),
            query::leftover_boss_health(&self.world),
            &mut self.commands,
        );
        self.flush_commands(out);

        let towers = query::tower_view(&self.world);
        let boss = query::boss(&self.world);
        self.targeting.handle(
            &towers,
            &query::enemy_view(&self.world),
            boss.as_ref(),
            attack_range,
            &mut self.targets,
        );
        self.combat.handle(
            query::elapsed(&self.world),
            attack_cooldown,
            &towers,
            &self.targets,
            &mut self.commands,
        );
        self.flush_commands(out);

        world::apply(&mut self.world, Command::AdvanceProjectiles, out);

        let enemies: Vec<EnemyId> = query::enemy_view(&self.world)
            .iter()
            .map(|enemy| enemy.id)
            .collect();
        for enemy in enemies {
            world::apply(&mut self.world, Command::AdvanceEnemy { enemy }, out);
            self.resolve_collisions(enemy, hit_threshold, out);
        }
        world::apply(&mut self.world, Command::RetireEnemies, out);

        if let Some(boss) = query::boss(&self.world) {
            world::apply(&mut self.world, Command::AdvanceEnemy { enemy: boss.id }, out);
            self.resolve_collisions(boss.id, hit_threshold, out);
        }

        trace!(
            "tick {} finished with {} projectiles in flight",
            query::tick_index(&self.world),
            query::projectile_view(&self.world).len()
        );
    }

    fn resolve_collisions(&mut self, enemy: EnemyId, hit_threshold: u32, out: &mut Vec<Event>) {
        let Some(target) = query::enemy(&self.world, enemy) else {
            return;
        };
        let projectiles = query::projectile_view(&self.world);
        self.collision
            .handle(&target, &projectiles, hit_threshold, &mut self.commands);
        self.flush_commands(out);
    }

    fn flush_commands(&mut self, out: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, out);
        }
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether both waves have been cleared.
    #[must_use]
    pub fn is_victory(&self) -> bool {
        query::is_victory(&self.world)
    }

    /// Captures an owned snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            towers: query::tower_view(&self.world).into_vec(),
            projectiles: query::projectile_view(&self.world).into_vec(),
            enemies: query::enemy_view(&self.world).into_vec(),
            boss: query::boss(&self.world),
            victory: query::is_victory(&self.world),
            tick_index: query::tick_index(&self.world),
            elapsed: query::elapsed(&self.world),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}
