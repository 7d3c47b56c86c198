//! Translation of simulation snapshots into renderable scenes.

use glam::Vec2;
use tower_defence_core::{EnemySnapshot, FieldPoint};
use tower_defence_rendering::{Scene, SceneEnemy, SceneProjectile, SceneTower};
use tower_defence_simulation::SimulationSnapshot;

/// Replaces the scene content with the state captured in `snapshot`.
///
/// The boss, when present, is appended after the normal enemies.
pub(crate) fn apply_snapshot(scene: &mut Scene, snapshot: &SimulationSnapshot) {
    scene.towers.clear();
    scene.towers.extend(
        snapshot
            .towers
            .iter()
            .map(|tower| SceneTower::new(tower.id, to_vec2(tower.position))),
    );

    scene.projectiles.clear();
    scene.projectiles.extend(
        snapshot
            .projectiles
            .iter()
            .map(|projectile| SceneProjectile::new(to_vec2(projectile.position))),
    );

    scene.enemies.clear();
    scene.enemies.extend(
        snapshot
            .enemies
            .iter()
            .chain(snapshot.boss.iter())
            .map(scene_enemy),
    );

    scene.victory = snapshot.victory;
}

/// Converts a field-space click into the position of a new tower.
pub(crate) fn click_to_field(click: Vec2) -> FieldPoint {
    FieldPoint::new(click.x.floor() as i32, click.y.floor() as i32)
}

fn scene_enemy(enemy: &EnemySnapshot) -> SceneEnemy {
    SceneEnemy::new(
        enemy.kind,
        to_vec2(enemy.position),
        enemy.health.get(),
        enemy.max_health.get(),
    )
}

fn to_vec2(point: FieldPoint) -> Vec2 {
    Vec2::new(point.x() as f32, point.y() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tower_defence_core::{
        EnemyId, EnemyKind, Health, ProjectileId, ProjectileSnapshot, TowerId, TowerSnapshot,
    };

    fn snapshot() -> SimulationSnapshot {
        SimulationSnapshot {
            towers: vec![TowerSnapshot {
                id: TowerId::new(0),
                position: FieldPoint::new(750, 300),
                last_attack: None,
            }],
            projectiles: vec![ProjectileSnapshot {
                id: ProjectileId::new(0),
                position: FieldPoint::new(760, 300),
                direction: 0.0,
                damage: 1,
            }],
            enemies: vec![EnemySnapshot {
                id: EnemyId::new(0),
                kind: EnemyKind::Normal,
                position: FieldPoint::new(790, 300),
                health: Health::new(1),
                max_health: Health::new(1),
            }],
            boss: Some(EnemySnapshot {
                id: EnemyId::new(1),
                kind: EnemyKind::Boss,
                position: FieldPoint::new(700, 300),
                health: Health::new(2),
                max_health: Health::new(3),
            }),
            victory: false,
            tick_index: 4,
            elapsed: Duration::from_millis(40),
        }
    }

    #[test]
    fn snapshot_content_replaces_scene() {
        let mut scene = Scene::new(800.0, 600.0).expect("valid field");
        scene.projectiles.push(SceneProjectile::new(Vec2::ZERO));
        scene.projectiles.push(SceneProjectile::new(Vec2::ONE));

        apply_snapshot(&mut scene, &snapshot());

        assert_eq!(
            scene.towers,
            vec![SceneTower::new(TowerId::new(0), Vec2::new(750.0, 300.0))]
        );
        assert_eq!(
            scene.projectiles,
            vec![SceneProjectile::new(Vec2::new(760.0, 300.0))]
        );
        assert_eq!(scene.enemies.len(), 2);
        assert_eq!(scene.enemies[0].kind, EnemyKind::Normal);
        assert_eq!(
            scene.enemies[1],
            SceneEnemy::new(EnemyKind::Boss, Vec2::new(700.0, 300.0), 2, 3)
        );
        assert!(!scene.victory);
    }

    #[test]
    fn victory_flag_and_empty_field_are_mirrored() {
        let mut scene = Scene::new(800.0, 600.0).expect("valid field");
        apply_snapshot(&mut scene, &snapshot());

        let cleared = SimulationSnapshot {
            enemies: Vec::new(),
            boss: None,
            victory: true,
            ..snapshot()
        };
        apply_snapshot(&mut scene, &cleared);

        assert!(scene.enemies.is_empty());
        assert!(scene.victory);
    }

    #[test]
    fn clicks_truncate_towards_field_origin() {
        assert_eq!(
            click_to_field(Vec2::new(100.9, 200.2)),
            FieldPoint::new(100, 200)
        );
        assert_eq!(click_to_field(Vec2::ZERO), FieldPoint::new(0, 0));
    }
}
