//! Projectiles in flight.

use tower_defence_core::{Event, FieldPoint, ProjectileId, ProjectileSnapshot, ProjectileView};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    position: FieldPoint,
    direction: f64,
    speed: u32,
    damage: u32,
}

impl Projectile {
    /// Creates a projectile at `origin` heading toward `target`.
    ///
    /// The heading is computed once; the projectile never re-aims.
    fn aimed(
        id: ProjectileId,
        origin: FieldPoint,
        target: FieldPoint,
        speed: u32,
        damage: u32,
    ) -> Self {
        let dx = f64::from(target.x()) - f64::from(origin.x());
        let dy = f64::from(target.y()) - f64::from(origin.y());
        Self {
            id,
            position: origin,
            direction: dy.atan2(dx),
            speed,
            damage,
        }
    }

    /// Moves the projectile one step along its heading.
    ///
    /// The sum is truncated toward zero on each axis.
    fn advance(&mut self) {
        let speed = f64::from(self.speed);
        let x = f64::from(self.position.x()) + speed * self.direction.cos();
        let y = f64::from(self.position.y()) + speed * self.direction.sin();
        self.position = FieldPoint::new(x as i32, y as i32);
    }

    pub(crate) fn damage(&self) -> u32 {
        self.damage
    }

    fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            direction: self.direction,
            damage: self.damage,
        }
    }
}

/// Projectiles in firing order.
#[derive(Debug)]
pub(crate) struct ProjectileSwarm {
    entries: Vec<Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileSwarm {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn fire(
        &mut self,
        origin: FieldPoint,
        target: FieldPoint,
        speed: u32,
        damage: u32,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        self.entries
            .push(Projectile::aimed(id, origin, target, speed, damage));
        id
    }

    /// Advances every projectile and drops those past the right edge.
    pub(crate) fn advance_all(&mut self, field_width: i32, out_events: &mut Vec<Event>) {
        for projectile in &mut self.entries {
            projectile.advance();
        }

        self.entries.retain(|projectile| {
            if projectile.position.x() > field_width {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
                false
            } else {
                true
            }
        });
    }

    pub(crate) fn get(&self, projectile: ProjectileId) -> Option<&Projectile> {
        self.entries.iter().find(|entry| entry.id == projectile)
    }

    /// Removes a projectile while preserving the order of the rest.
    pub(crate) fn take(&mut self, projectile: ProjectileId) -> Option<Projectile> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == projectile)?;
        Some(self.entries.remove(index))
    }

    pub(crate) fn view(&self) -> ProjectileView {
        ProjectileView::from_snapshots(self.entries.iter().map(Projectile::snapshot).collect())
    }
}
