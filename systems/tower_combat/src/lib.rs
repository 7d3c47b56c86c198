#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use std::time::Duration;

use tower_defence_core::{Command, TowerId, TowerSnapshot, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers whose cooldown has elapsed.
    ///
    /// Each projectile is aimed at the position the target occupied when the
    /// targeting pass ran.
    pub fn handle(
        &mut self,
        now: Duration,
        cooldown: Duration,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        let towers: Vec<TowerSnapshot> = towers.iter().copied().collect();
        if towers.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            if let Some(snapshot) = find_tower(&towers, target.tower) {
                if snapshot.can_attack(now, cooldown) {
                    self.scratch.push(Command::FireProjectile {
                        tower: target.tower,
                        target: target.enemy_position,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower(towers: &[TowerSnapshot], tower: TowerId) -> Option<&TowerSnapshot> {
    towers
        .binary_search_by_key(&tower, |snapshot| snapshot.id)
        .ok()
        .map(|index| &towers[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{EnemyId, FieldPoint};

    const COOLDOWN: Duration = Duration::from_millis(1_000);

    #[test]
    fn fresh_towers_fire_at_target_position() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(2, None), tower(5, None)]);
        let targets = vec![target(2, 4, 800), target(5, 1, 640)];
        let mut out = Vec::new();

        system.handle(Duration::from_millis(10), COOLDOWN, &towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireProjectile {
                    tower: TowerId::new(2),
                    target: FieldPoint::new(800, 300),
                },
                Command::FireProjectile {
                    tower: TowerId::new(5),
                    target: FieldPoint::new(640, 300),
                },
            ],
        );
    }

    #[test]
    fn cooling_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            tower(3, Some(Duration::from_millis(500))),
            tower(8, Some(Duration::ZERO)),
        ]);
        let targets = vec![target(3, 9, 700), target(8, 2, 710), target(42, 3, 720)];
        let mut out = Vec::new();

        system.handle(Duration::from_millis(1_000), COOLDOWN, &towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(8),
                target: FieldPoint::new(710, 300),
            }],
        );
    }

    #[test]
    fn no_targets_means_no_commands() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(0, None)]);
        let mut out = Vec::new();

        system.handle(Duration::ZERO, COOLDOWN, &towers, &[], &mut out);

        assert!(out.is_empty());
    }

    fn tower(id: u32, last_attack: Option<Duration>) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            position: FieldPoint::new(750, 300),
            last_attack,
        }
    }

    fn target(tower: u32, enemy: u32, x: i32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
            tower_position: FieldPoint::new(750, 300),
            enemy_position: FieldPoint::new(x, 300),
        }
    }
}
