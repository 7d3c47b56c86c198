#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tower defence simulation.

mod enemies;
mod projectiles;
mod towers;

use std::time::Duration;

use log::{debug, trace};
use tower_defence_core::{Command, EnemyId, EnemyKind, Event, ProjectileId, Rules, SpawnPhase};

use self::{
    enemies::{BossSlot, Enemy},
    projectiles::ProjectileSwarm,
    towers::TowerRegistry,
};

/// Represents the authoritative tower defence world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    clock: Duration,
    tick_index: u64,
    towers: TowerRegistry,
    projectiles: ProjectileSwarm,
    enemies: Vec<Enemy>,
    boss: BossSlot,
    spawn_phase: SpawnPhase,
    next_enemy_id: EnemyId,
}

impl World {
    /// Creates a new world using the classic rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a new world governed by the provided rules.
    ///
    /// A single normal enemy is seeded at the entry point on the right edge.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        let mut world = Self {
            rules,
            clock: Duration::ZERO,
            tick_index: 0,
            towers: TowerRegistry::new(),
            projectiles: ProjectileSwarm::new(),
            enemies: Vec::new(),
            boss: BossSlot::Empty,
            spawn_phase: SpawnPhase::PreBoss,
            next_enemy_id: EnemyId::new(0),
        };
        world.seed_enemies();
        world
    }

    fn seed_enemies(&mut self) {
        let id = self.allocate_enemy_id();
        let enemy = Enemy::new(
            id,
            EnemyKind::Normal,
            self.rules.entry_point(),
            self.rules.enemy_max_health,
        );
        self.enemies.push(enemy);
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        id
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        if let Some(boss) = self.boss.active_mut() {
            if boss.id() == enemy {
                return Some(boss);
            }
        }
        self.enemies.iter_mut().find(|entry| entry.id() == enemy)
    }

    fn resolve_hit(
        &mut self,
        enemy_id: EnemyId,
        projectile_id: ProjectileId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(damage) = self
            .projectiles
            .get(projectile_id)
            .map(|projectile| projectile.damage())
        else {
            return;
        };

        // An active boss takes hits even at zero health; its defeat is only
        // evaluated once a hit lands.
        let is_boss = self.boss_id() == Some(enemy_id);
        let remaining = if is_boss {
            let Some(boss) = self.boss.active_mut() else {
                return;
            };
            boss.take_damage(damage);
            boss.health()
        } else {
            let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|entry| entry.id() == enemy_id && !entry.is_destroyed())
            else {
                return;
            };
            enemy.take_damage(damage);
            enemy.health()
        };

        let _ = self.projectiles.take(projectile_id);
        out_events.push(Event::EnemyDamaged {
            enemy: enemy_id,
            projectile: projectile_id,
            remaining,
        });

        if !remaining.is_depleted() {
            return;
        }

        if is_boss {
            self.boss.defeat();
            debug!(
                "boss {} defeated, leftover health {}",
                enemy_id.get(),
                remaining.get()
            );
            out_events.push(Event::BossDefeated {
                enemy: enemy_id,
                leftover: remaining,
            });
            if query::is_victory(self) {
                debug!("victory after {} ticks", self.tick_index);
                out_events.push(Event::VictoryAchieved);
            }
        } else {
            out_events.push(Event::EnemyDestroyed { enemy: enemy_id });
        }
    }

    fn boss_id(&self) -> Option<EnemyId> {
        self.boss.active().map(Enemy::id)
    }

    fn retire_enemies(&mut self, out_events: &mut Vec<Event>) {
        self.enemies.retain(|enemy| {
            if enemy.is_destroyed() {
                return false;
            }
            if enemy.position().x() < 0 {
                out_events.push(Event::EnemyEscaped { enemy: enemy.id() });
                return false;
            }
            true
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTower { position } => {
            let tower = world.towers.place(position);
            debug!(
                "tower {} placed at ({}, {})",
                tower.get(),
                position.x(),
                position.y()
            );
            out_events.push(Event::TowerPlaced { tower, position });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            trace!("tick {} at {:?}", world.tick_index, world.clock);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });
        }
        Command::SpawnBoss { health } => {
            if world.spawn_phase == SpawnPhase::BossTriggered {
                return;
            }

            let enemy = world.allocate_enemy_id();
            let boss = Enemy::new(enemy, EnemyKind::Boss, world.rules.entry_point(), health);
            world.boss = BossSlot::Active(boss);
            world.spawn_phase = SpawnPhase::BossTriggered;
            debug!("boss {} spawned with health {}", enemy.get(), health.get());
            out_events.push(Event::BossSpawned { enemy, health });
        }
        Command::FireProjectile { tower, target } => {
            let now = world.clock;
            let cooldown = world.rules.attack_cooldown;
            let Some(entry) = world.towers.get_mut(tower) else {
                return;
            };
            if !entry.snapshot().can_attack(now, cooldown) {
                return;
            }

            entry.record_attack(now);
            let origin = entry.position();
            let projectile = world.projectiles.fire(
                origin,
                target,
                world.rules.projectile_speed,
                world.rules.projectile_damage,
            );
            out_events.push(Event::ProjectileFired {
                tower,
                projectile,
                target,
            });
        }
        Command::AdvanceProjectiles => {
            world
                .projectiles
                .advance_all(world.rules.field_width, out_events);
        }
        Command::AdvanceEnemy { enemy } => {
            let speed = world.rules.enemy_speed;
            if let Some(entry) = world.enemy_mut(enemy) {
                entry.advance(speed);
            }
        }
        Command::ApplyHit { enemy, projectile } => {
            world.resolve_hit(enemy, projectile, out_events);
        }
        Command::RetireEnemies => world.retire_enemies(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use tower_defence_core::{
        EnemyId, EnemySnapshot, EnemyView, Health, ProjectileView, Rules, SpawnPhase, TowerView,
    };

    /// Rules governing the session.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Total simulated time elapsed since the session started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the towers in placement order.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the projectiles in firing order.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        world.projectiles.view()
    }

    /// Captures a read-only view of the normal enemies in collection order.
    ///
    /// Enemies destroyed earlier in the current tick are skipped.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| !enemy.is_destroyed())
                .map(|enemy| enemy.snapshot(&world.rules))
                .collect(),
        )
    }

    /// Looks up a live enemy, boss included.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<EnemySnapshot> {
        if let Some(boss) = boss(world) {
            if boss.id == enemy {
                return Some(boss);
            }
        }
        world
            .enemies
            .iter()
            .find(|entry| entry.id() == enemy && !entry.is_destroyed())
            .map(|entry| entry.snapshot(&world.rules))
    }

    /// Snapshot of the boss while it is on the field.
    #[must_use]
    pub fn boss(world: &World) -> Option<EnemySnapshot> {
        world
            .boss
            .active()
            .map(|boss| boss.snapshot(&world.rules))
    }

    /// Reports whether the boss is currently on the field.
    #[must_use]
    pub fn boss_present(world: &World) -> bool {
        world.boss.active().is_some()
    }

    /// Health of the most recent boss instance, if one ever existed.
    #[must_use]
    pub fn leftover_boss_health(world: &World) -> Option<Health> {
        world.boss.leftover_health()
    }

    /// Progress of the one-shot boss trigger.
    #[must_use]
    pub fn spawn_phase(world: &World) -> SpawnPhase {
        world.spawn_phase
    }

    /// Reports whether both waves have been cleared.
    #[must_use]
    pub fn is_victory(world: &World) -> bool {
        world.spawn_phase == SpawnPhase::BossTriggered
            && !boss_present(world)
            && world.enemies.iter().all(|enemy| enemy.is_destroyed())
    }
}
