#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects projectile hits against a single target.

use tower_defence_core::{Command, EnemySnapshot, ProjectileView};

/// Collision system that resolves at most one hit per target per pass.
#[derive(Debug, Default)]
pub struct Collision;

impl Collision {
    /// Creates a new collision system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::ApplyHit` for the first projectile inside the hit box.
    ///
    /// Projectiles are scanned in firing order. A projectile hits when both
    /// axis distances to the target are strictly below `hit_threshold`.
    pub fn handle(
        &self,
        target: &EnemySnapshot,
        projectiles: &ProjectileView,
        hit_threshold: u32,
        out: &mut Vec<Command>,
    ) {
        let hit = projectiles
            .iter()
            .find(|projectile| target.position.within_box(projectile.position, hit_threshold));

        if let Some(projectile) = hit {
            out.push(Command::ApplyHit {
                enemy: target.id,
                projectile: projectile.id,
            });
        }
    }
}
