//! Enemy records and the boss slot.

use tower_defence_core::{EnemyId, EnemyKind, EnemySnapshot, FieldPoint, Health, Rules};

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: FieldPoint,
    health: Health,
}

impl Enemy {
    pub(crate) fn new(id: EnemyId, kind: EnemyKind, position: FieldPoint, health: Health) -> Self {
        Self {
            id,
            kind,
            position,
            health,
        }
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn position(&self) -> FieldPoint {
        self.position
    }

    pub(crate) fn health(&self) -> Health {
        self.health
    }

    /// Steps the enemy leftward. The lane is horizontal so `y` never changes.
    pub(crate) fn advance(&mut self, speed: u32) {
        let speed = i32::try_from(speed).unwrap_or(i32::MAX);
        self.position = FieldPoint::new(self.position.x().saturating_sub(speed), self.position.y());
    }

    pub(crate) fn take_damage(&mut self, damage: u32) {
        self.health = self.health.saturating_sub(damage);
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.health.is_depleted()
    }

    pub(crate) fn snapshot(&self, rules: &Rules) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.kind.max_health(rules),
        }
    }
}

/// Holds the boss across its lifecycle.
///
/// A defeated boss stays in the slot so its leftover health remains
/// available to the spawn formula.
#[derive(Clone, Debug, Default)]
pub(crate) enum BossSlot {
    #[default]
    Empty,
    Active(Enemy),
    Defeated(Enemy),
}

impl BossSlot {
    pub(crate) fn active(&self) -> Option<&Enemy> {
        match self {
            Self::Active(boss) => Some(boss),
            Self::Empty | Self::Defeated(_) => None,
        }
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut Enemy> {
        match self {
            Self::Active(boss) => Some(boss),
            Self::Empty | Self::Defeated(_) => None,
        }
    }

    /// Health of the most recent boss instance, alive or not.
    pub(crate) fn leftover_health(&self) -> Option<Health> {
        match self {
            Self::Empty => None,
            Self::Active(boss) | Self::Defeated(boss) => Some(boss.health()),
        }
    }

    /// Moves an active boss into the defeated state.
    pub(crate) fn defeat(&mut self) {
        if let Self::Active(boss) = std::mem::take(self) {
            *self = Self::Defeated(boss);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss(health: i32) -> Enemy {
        Enemy::new(
            EnemyId::new(1),
            EnemyKind::Boss,
            FieldPoint::new(800, 300),
            Health::new(health),
        )
    }

    #[test]
    fn advance_moves_left_only() {
        let mut enemy = Enemy::new(
            EnemyId::new(0),
            EnemyKind::Normal,
            FieldPoint::new(800, 300),
            Health::new(1),
        );
        enemy.advance(2);
        enemy.advance(2);
        assert_eq!(enemy.position(), FieldPoint::new(796, 300));
    }

    #[test]
    fn lethal_damage_destroys_enemy() {
        let mut enemy = boss(3);
        enemy.take_damage(1);
        assert!(!enemy.is_destroyed());
        enemy.take_damage(2);
        assert!(enemy.is_destroyed());
    }

    #[test]
    fn boss_snapshot_reports_scaled_max_health() {
        let snapshot = boss(0).snapshot(&Rules::default());
        assert_eq!(snapshot.kind, EnemyKind::Boss);
        assert_eq!(snapshot.health, Health::new(0));
        assert_eq!(snapshot.max_health, Health::new(3));
    }

    #[test]
    fn defeated_boss_keeps_leftover_health() {
        let mut slot = BossSlot::default();
        assert!(slot.leftover_health().is_none());

        slot = BossSlot::Active(boss(0));
        if let Some(active) = slot.active_mut() {
            active.take_damage(1);
        }
        slot.defeat();

        assert!(slot.active().is_none());
        assert_eq!(slot.leftover_health(), Some(Health::new(-1)));
    }

    #[test]
    fn defeating_empty_slot_is_a_no_op() {
        let mut slot = BossSlot::Empty;
        slot.defeat();
        assert!(matches!(slot, BossSlot::Empty));
    }
}
