#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems query immutable views and respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown by windowed adapters.
pub const WINDOW_TITLE: &str = "Tower Defense Game";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests placement of a tower at the provided field position.
    PlaceTower {
        /// Field coordinates of the tower. Never validated.
        position: FieldPoint,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the boss enter the field.
    SpawnBoss {
        /// Health the boss starts with.
        health: Health,
    },
    /// Requests that a tower fire a projectile toward a fixed point.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Position of the target at the moment of firing.
        target: FieldPoint,
    },
    /// Moves every projectile one step and retires those leaving the field.
    AdvanceProjectiles,
    /// Moves a single enemy (normal or boss) one step along the lane.
    AdvanceEnemy {
        /// Identifier of the enemy to move.
        enemy: EnemyId,
    },
    /// Applies a projectile hit to an enemy, consuming the projectile.
    ApplyHit {
        /// Identifier of the enemy that was struck.
        enemy: EnemyId,
        /// Identifier of the projectile that struck the enemy.
        projectile: ProjectileId,
    },
    /// Removes destroyed normal enemies and those that left the field.
    RetireEnemies,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Total simulated time after the tick started.
        now: Duration,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Position the tower occupies for the rest of the session.
        position: FieldPoint,
    },
    /// Confirms that a tower fired a projectile.
    ProjectileFired {
        /// Identifier of the tower that fired.
        tower: TowerId,
        /// Identifier assigned to the new projectile.
        projectile: ProjectileId,
        /// Point the projectile was aimed at.
        target: FieldPoint,
    },
    /// Reports that a projectile crossed the right edge of the field.
    ProjectileExpired {
        /// Identifier of the projectile that was retired.
        projectile: ProjectileId,
    },
    /// Reports that a projectile struck an enemy.
    EnemyDamaged {
        /// Identifier of the enemy that was struck.
        enemy: EnemyId,
        /// Identifier of the projectile that was consumed.
        projectile: ProjectileId,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Reports that a normal enemy was destroyed.
    EnemyDestroyed {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
    },
    /// Reports that a normal enemy left the field through the left boundary.
    EnemyEscaped {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
    },
    /// Confirms that the boss entered the field.
    BossSpawned {
        /// Identifier assigned to the boss.
        enemy: EnemyId,
        /// Health the boss started with.
        health: Health,
    },
    /// Reports that the boss was destroyed.
    BossDefeated {
        /// Identifier of the defeated boss.
        enemy: EnemyId,
        /// Health the boss was left with, kept for any later spawn.
        leftover: Health,
    },
    /// Announces that every enemy, boss included, has been cleared.
    VictoryAchieved,
}

/// Integer position on the playfield measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPoint {
    x: i32,
    y: i32,
}

impl FieldPoint {
    /// Creates a new field position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, growing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing downward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: FieldPoint) -> i64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        dx * dx + dy * dy
    }

    /// Reports whether both axis distances to `other` are below `threshold`.
    #[must_use]
    pub fn within_box(self, other: FieldPoint, threshold: u32) -> bool {
        let dx = (i64::from(other.x) - i64::from(self.x)).unsigned_abs();
        let dy = (i64::from(other.y) - i64::from(self.y)).unsigned_abs();
        dx < u64::from(threshold) && dy < u64::from(threshold)
    }
}

/// Hit points carried by an enemy. May drop below zero.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(i32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the health value.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether the value counts as destroyed.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }

    /// Returns the health left after subtracting `damage`.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        let damage = if damage > i32::MAX as u32 {
            i32::MAX
        } else {
            damage as i32
        };
        Self(self.0.saturating_sub(damage))
    }

    /// Returns the health scaled by `multiplier`.
    #[must_use]
    pub const fn scaled(self, multiplier: u32) -> Self {
        let multiplier = if multiplier > i32::MAX as u32 {
            i32::MAX
        } else {
            multiplier as i32
        };
        Self(self.0.saturating_mul(multiplier))
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy, boss included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the enemy identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Distinguishes the enemy variants sharing the lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Regular enemy seeded at session start.
    Normal,
    /// Boss that enters once the normal enemies are gone.
    Boss,
}

impl EnemyKind {
    /// Maximum health reported for the kind under the provided rules.
    #[must_use]
    pub const fn max_health(self, rules: &Rules) -> Health {
        match self {
            Self::Normal => rules.enemy_max_health,
            Self::Boss => rules
                .enemy_max_health
                .scaled(rules.boss_health_multiplier),
        }
    }
}

/// Progress of the one-shot boss trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpawnPhase {
    /// The boss has not been spawned yet.
    #[default]
    PreBoss,
    /// The boss was spawned; no further spawns happen.
    BossTriggered,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Position of the tower.
    pub position: FieldPoint,
    /// Simulated time of the most recent shot, if the tower has fired.
    pub last_attack: Option<Duration>,
}

impl TowerSnapshot {
    /// Reports whether the tower may fire at `now` given the cooldown.
    ///
    /// A tower that never fired is always ready.
    #[must_use]
    pub fn can_attack(&self, now: Duration, cooldown: Duration) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => now.saturating_sub(last) >= cooldown,
        }
    }
}

/// Read-only snapshot describing all towers in placement order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Current position of the projectile.
    pub position: FieldPoint,
    /// Heading in radians, fixed when the projectile was fired.
    pub direction: f64,
    /// Damage applied on impact.
    pub damage: u32,
}

/// Read-only snapshot describing all projectiles in flight.
///
/// Order follows the world's collection, which is firing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view preserving the provided order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ProjectileSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Current position of the enemy.
    pub position: FieldPoint,
    /// Current health of the enemy.
    pub health: Health,
    /// Maximum health reported for the enemy's kind.
    pub max_health: Health,
}

/// Read-only snapshot describing the normal enemies in collection order.
///
/// Targeting relies on this order: the first enemy in range wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view preserving the provided order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Target assignment computed for a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerTarget {
    /// Tower that selected the target.
    pub tower: TowerId,
    /// Enemy selected by the tower.
    pub enemy: EnemyId,
    /// Position of the tower.
    pub tower_position: FieldPoint,
    /// Position of the enemy when it was selected.
    pub enemy_position: FieldPoint,
}

/// Gameplay constants governing a session.
///
/// `Rules::default()` reproduces the classic 800×600 game. Deserialisation
/// fills missing fields from the defaults so partial configuration files work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Width of the playfield in pixels.
    pub field_width: i32,
    /// Height of the playfield in pixels.
    pub field_height: i32,
    /// Radius within which towers may select a target.
    pub attack_range: u32,
    /// Minimum simulated time between consecutive shots of a tower.
    #[serde(with = "duration_millis")]
    pub attack_cooldown: Duration,
    /// Distance travelled by a projectile per tick.
    pub projectile_speed: u32,
    /// Damage applied by a single projectile.
    pub projectile_damage: u32,
    /// Distance travelled leftward by an enemy per tick.
    pub enemy_speed: u32,
    /// Health of a normal enemy.
    pub enemy_max_health: Health,
    /// Factor applied to boss health and boss maximum health.
    pub boss_health_multiplier: u32,
    /// Axis-aligned distance under which a projectile counts as a hit.
    pub hit_threshold: u32,
    /// Simulated time covered by a single tick.
    #[serde(with = "duration_millis")]
    pub tick_interval: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            field_width: 800,
            field_height: 600,
            attack_range: 100,
            attack_cooldown: Duration::from_millis(1_000),
            projectile_speed: 5,
            projectile_damage: 1,
            enemy_speed: 2,
            enemy_max_health: Health::new(1),
            boss_health_multiplier: 3,
            hit_threshold: 10,
            tick_interval: Duration::from_millis(10),
        }
    }
}

impl Rules {
    /// Longest tick interval a session may be configured with.
    pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(1);

    /// Checks that the rules describe a runnable session.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.field_width <= 0 || self.field_height <= 0 {
            return Err(RulesError::EmptyField {
                width: self.field_width,
                height: self.field_height,
            });
        }

        if self.tick_interval.is_zero() {
            return Err(RulesError::ZeroTickInterval);
        }

        if self.tick_interval > Self::MAX_TICK_INTERVAL {
            return Err(RulesError::TickIntervalTooLong {
                interval: self.tick_interval,
                max: Self::MAX_TICK_INTERVAL,
            });
        }

        if self.hit_threshold == 0 {
            return Err(RulesError::ZeroHitThreshold);
        }

        if !self.enemy_max_health.get().is_positive() {
            return Err(RulesError::NonPositiveHealth {
                health: self.enemy_max_health.get(),
            });
        }

        Ok(())
    }

    /// Position at which enemies and the boss enter the field.
    #[must_use]
    pub const fn entry_point(&self) -> FieldPoint {
        FieldPoint::new(self.field_width, self.field_height / 2)
    }

    /// Number of ticks the simulation runs per second of wall-clock time.
    #[must_use]
    pub fn ticks_per_second(&self) -> f64 {
        if self.tick_interval.is_zero() {
            return 0.0;
        }
        1.0 / self.tick_interval.as_secs_f64()
    }
}

/// Reasons a [`Rules`] value may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The playfield has no area.
    #[error("field must have a positive size (received {width}x{height})")]
    EmptyField {
        /// Configured width.
        width: i32,
        /// Configured height.
        height: i32,
    },
    /// A zero tick interval would spin the loop without advancing time.
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    /// The tick interval exceeds [`Rules::MAX_TICK_INTERVAL`].
    #[error("tick interval {interval:?} exceeds the maximum of {max:?}")]
    TickIntervalTooLong {
        /// Configured interval.
        interval: Duration,
        /// Largest accepted interval.
        max: Duration,
    },
    /// A zero hit threshold would make every projectile miss.
    #[error("hit threshold must be positive")]
    ZeroHitThreshold,
    /// Enemies must start alive.
    #[error("enemy max health must be positive (received {health})")]
    NonPositiveHealth {
        /// Configured health.
        health: i32,
    },
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
