#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting the boss spawn command.

use tower_defence_core::{Command, EnemyView, Health, SpawnPhase};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    boss_health_multiplier: u32,
}

impl Config {
    /// Creates a new configuration using the provided boss health multiplier.
    #[must_use]
    pub const fn new(boss_health_multiplier: u32) -> Self {
        Self {
            boss_health_multiplier,
        }
    }
}

/// Pure system that triggers the boss once the normal enemies are exhausted.
#[derive(Debug)]
pub struct Spawning {
    boss_health_multiplier: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            boss_health_multiplier: config.boss_health_multiplier,
        }
    }

    /// Emits `Command::SpawnBoss` when the trigger condition holds.
    ///
    /// The boss inherits the leftover health of any previous boss scaled by
    /// the multiplier. Without a previous boss the health is zero.
    pub fn handle(
        &self,
        phase: SpawnPhase,
        enemies: &EnemyView,
        leftover_boss_health: Option<Health>,
        out: &mut Vec<Command>,
    ) {
        if phase != SpawnPhase::PreBoss || !enemies.is_empty() {
            return;
        }

        let health = self.boss_health(leftover_boss_health);
        out.push(Command::SpawnBoss { health });
    }

    fn boss_health(&self, leftover: Option<Health>) -> Health {
        leftover
            .unwrap_or_default()
            .scaled(self.boss_health_multiplier)
    }
}
