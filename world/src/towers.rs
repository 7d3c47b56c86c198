//! Authoritative tower state management utilities.

use std::time::Duration;

use tower_defence_core::{FieldPoint, TowerId, TowerSnapshot};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    id: TowerId,
    position: FieldPoint,
    last_attack: Option<Duration>,
}

impl Tower {
    pub(crate) fn position(&self) -> FieldPoint {
        self.position
    }

    /// Stamps the tower with the time of its latest shot.
    pub(crate) fn record_attack(&mut self, now: Duration) {
        self.last_attack = Some(now);
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            position: self.position,
            last_attack: self.last_attack,
        }
    }
}

/// Registry that stores towers in placement order and allocates identifiers.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: Vec<Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn place(&mut self, position: FieldPoint) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        self.entries.push(Tower {
            id,
            position,
            last_attack: None,
        });
        id
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        // Identifiers are allocated in increasing order and never removed.
        self.entries
            .binary_search_by_key(&tower, |entry| entry.id)
            .ok()
            .map(|index| &mut self.entries[index])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn placement_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.place(FieldPoint::new(10, 20));
        let second = registry.place(FieldPoint::new(-5, 900));

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        let tower = registry.get_mut(second).expect("second tower exists");
        assert_eq!(tower.position(), FieldPoint::new(-5, 900));
        assert!(registry.get_mut(TowerId::new(7)).is_none());
    }

    #[test]
    fn new_tower_has_never_attacked() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(FieldPoint::new(100, 100));
        let tower = registry.get_mut(id).expect("tower exists");
        assert_eq!(tower.snapshot().last_attack, None);

        tower.record_attack(Duration::from_millis(30));
        assert_eq!(
            tower.snapshot().last_attack,
            Some(Duration::from_millis(30))
        );
    }
}
