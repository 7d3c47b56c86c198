#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use tower_defence_core::{EnemySnapshot, EnemyView, FieldPoint, TowerSnapshot, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemySnapshot>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Each tower picks the first normal enemy within `attack_range` in
    /// collection order. The boss is only considered when no normal enemy
    /// qualifies. The output buffer is cleared before populating it.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        boss: Option<&EnemySnapshot>,
        attack_range: u32,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() {
            return;
        }

        self.enemy_workspace.clear();
        self.enemy_workspace.extend(enemies.iter().copied());
        if self.enemy_workspace.is_empty() && boss.is_none() {
            return;
        }

        let range = i64::from(attack_range);
        let max_distance = range * range;

        for tower in towers.iter() {
            let candidate = self
                .enemy_workspace
                .iter()
                .find(|enemy| in_range(tower, enemy.position, max_distance))
                .or_else(|| boss.filter(|boss| in_range(tower, boss.position, max_distance)));

            if let Some(enemy) = candidate {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: enemy.id,
                    tower_position: tower.position,
                    enemy_position: enemy.position,
                });
            }
        }
    }
}

fn in_range(tower: &TowerSnapshot, position: FieldPoint, max_distance: i64) -> bool {
    tower.position.distance_squared(position) <= max_distance
}

#[cfg(test)]
mod tests {
    use super::{TowerTarget, TowerTargeting};
    use tower_defence_core::{
        EnemyId, EnemyKind, EnemySnapshot, EnemyView, FieldPoint, Health, TowerId, TowerSnapshot,
        TowerView,
    };

    const RANGE: u32 = 100;

    fn tower_view(snapshots: Vec<TowerSnapshot>) -> TowerView {
        TowerView::from_snapshots(snapshots)
    }

    fn tower_snapshot(id: u32, x: i32, y: i32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            position: FieldPoint::new(x, y),
            last_attack: None,
        }
    }

    fn enemy_snapshot(id: u32, kind: EnemyKind, x: i32, y: i32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind,
            position: FieldPoint::new(x, y),
            health: Health::new(1),
            max_health: Health::new(1),
        }
    }

    #[test]
    fn targets_enemy_within_range() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, 750, 300)]);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 800, 300)]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, None, RANGE, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(1),
                enemy: EnemyId::new(0),
                tower_position: FieldPoint::new(750, 300),
                enemy_position: FieldPoint::new(800, 300),
            }]
        );
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, 0, 0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 60, 80)]);
        let mut out = Vec::new();

        system.handle(&towers, &enemies, None, RANGE, &mut out);
        assert_eq!(out.len(), 1);

        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 61, 80)]);
        system.handle(&towers, &enemies, None, RANGE, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn first_enemy_in_collection_order_wins_over_nearer_one() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, 400, 300)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy_snapshot(7, EnemyKind::Normal, 490, 300),
            enemy_snapshot(3, EnemyKind::Normal, 401, 300),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, None, RANGE, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(7));
    }

    #[test]
    fn boss_is_considered_only_without_normal_candidate() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, 750, 300)]);
        let boss = enemy_snapshot(9, EnemyKind::Boss, 780, 300);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 790, 300)]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, Some(&boss), RANGE, &mut out);
        assert_eq!(out[0].enemy, EnemyId::new(0));

        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 20, 300)]);
        system.handle(&towers, &enemies, Some(&boss), RANGE, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(9));
        assert_eq!(out[0].enemy_position, FieldPoint::new(780, 300));
    }

    #[test]
    fn out_of_range_targets_are_ignored() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, 0, 0)]);
        let boss = enemy_snapshot(9, EnemyKind::Boss, 500, 500);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 800, 300)]);

        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
            tower_position: FieldPoint::new(0, 0),
            enemy_position: FieldPoint::new(0, 0),
        }];
        system.handle(&towers, &enemies, Some(&boss), RANGE, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn every_tower_gets_its_own_assignment() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(2, 750, 300), tower_snapshot(1, 100, 100)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy_snapshot(0, EnemyKind::Normal, 800, 300),
            enemy_snapshot(1, EnemyKind::Normal, 120, 90),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, None, RANGE, &mut out);

        let pairs: Vec<_> = out.iter().map(|target| (target.tower, target.enemy)).collect();
        assert_eq!(
            pairs,
            vec![
                (TowerId::new(1), EnemyId::new(1)),
                (TowerId::new(2), EnemyId::new(0)),
            ]
        );
    }

    #[test]
    fn empty_collections_produce_no_targets() {
        let mut system = TowerTargeting::new();
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(0, EnemyKind::Normal, 1, 1)]);

        let mut out = Vec::new();
        system.handle(&tower_view(Vec::new()), &enemies, None, RANGE, &mut out);
        assert!(out.is_empty());

        let towers = tower_view(vec![tower_snapshot(1, 0, 0)]);
        system.handle(&towers, &EnemyView::default(), None, RANGE, &mut out);
        assert!(out.is_empty());
    }
}
