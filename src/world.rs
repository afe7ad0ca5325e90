//! # World Interfaces
//!
//! Agents never hold references into the world. They hold [`EntityId`] handles
//! and resolve them through two traits:
//!
//! - [`SpatialIndex`]: read-only radius queries over tagged entities
//! - [`World`]: the spatial index plus the grid, with the few mutations an
//!   agent performs (damage, consume, move)
//!
//! [`SimpleWorld`] is an in-memory implementation backed by a [`TileGrid`].

use crate::{Cell, Grid, TileGrid, Vec2};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stable handle to an entity. Never reused by [`SimpleWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only spatial queries over tagged entities.
pub trait SpatialIndex {
    /// Current center of `id`, or `None` if it no longer exists.
    fn position(&self, id: EntityId) -> Option<Vec2>;

    /// Whether `id` still exists.
    fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Entities carrying any of `tags` within `radius` of `origin`'s center,
    /// excluding `origin` itself.
    fn find_all(&self, origin: EntityId, radius: f64, tags: &[&str]) -> Vec<EntityId>;

    /// The closest result of [`SpatialIndex::find_all`] and its distance.
    /// Ties go to the entity listed first.
    fn find_nearest(
        &self,
        origin: EntityId,
        radius: f64,
        tags: &[&str],
    ) -> Option<(EntityId, f64)> {
        let center = self.position(origin)?;
        self.find_all(origin, radius, tags)
            .into_iter()
            .filter_map(|id| self.position(id).map(|p| (id, center.distance(p))))
            .fold(None, |best: Option<(EntityId, f64)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
    }
}

/// Everything an agent needs from its surroundings.
pub trait World: SpatialIndex + Grid {
    /// Deals `amount` damage to `id`. Returns false if `id` does not exist.
    fn apply_damage(&mut self, id: EntityId, amount: i32) -> bool;

    /// Removes a consumable. Returns false if `id` does not exist.
    fn consume(&mut self, id: EntityId) -> bool;

    /// Moves `id` by `delta`. Returns false, leaving it in place, when the
    /// destination is blocked.
    fn move_by(&mut self, id: EntityId, delta: Vec2) -> bool;
}

/// One entity of a [`SimpleWorld`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    pub tags: BTreeSet<String>,
    pub health: i32,
}

impl Entity {
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.tags.contains(*tag))
    }
}

/// In-memory world: a tile grid plus a flat table of entities.
///
/// Entities that drop to zero health are removed. Movement is refused when the
/// destination point falls in a cell with one of the blocking tags.
#[derive(Clone, Debug)]
pub struct SimpleWorld {
    grid: TileGrid,
    blocking_tags: Vec<String>,
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl SimpleWorld {
    pub const DEFAULT_HEALTH: i32 = 100;

    pub fn new<I, S>(grid: TileGrid, blocking_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            grid,
            blocking_tags: blocking_tags.into_iter().map(Into::into).collect(),
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Adds an entity at `position` and returns its handle.
    pub fn spawn<I, S>(&mut self, position: Vec2, tags: I) -> EntityId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                position,
                tags: tags.into_iter().map(Into::into).collect(),
                health: Self::DEFAULT_HEALTH,
            },
        );
        id
    }

    /// Adds an entity at the center of `cell`.
    pub fn spawn_at_cell<I, S>(&mut self, cell: Cell, tags: I) -> EntityId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let position = self.grid.cell_center(cell);
        self.spawn(position, tags)
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    fn point_open(&self, point: Vec2) -> bool {
        let cell = self.grid.world_to_cell(point);
        self.grid.cell_open(cell, &self.blocking_tags)
    }
}

impl SpatialIndex for SimpleWorld {
    fn position(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(|e| e.position)
    }

    fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    fn find_all(&self, origin: EntityId, radius: f64, tags: &[&str]) -> Vec<EntityId> {
        let Some(center) = self.position(origin) else {
            return Vec::new();
        };

        self.entities
            .iter()
            .filter(|(id, entity)| {
                **id != origin
                    && entity.has_any_tag(tags)
                    && center.distance(entity.position) <= radius
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Grid for SimpleWorld {
    fn cell_exists(&self, cell: Cell) -> bool {
        self.grid.cell_exists(cell)
    }

    fn cell_blocked(&self, cell: Cell, tags: &[String]) -> bool {
        self.grid.cell_blocked(cell, tags)
    }

    fn world_to_cell(&self, point: Vec2) -> Cell {
        self.grid.world_to_cell(point)
    }

    fn cell_center(&self, cell: Cell) -> Vec2 {
        self.grid.cell_center(cell)
    }
}

impl World for SimpleWorld {
    fn apply_damage(&mut self, id: EntityId, amount: i32) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };

        entity.health = (entity.health - amount).max(0);
        if entity.health == 0 {
            log::debug!("entity {} destroyed", id);
            self.entities.remove(&id);
        }
        true
    }

    fn consume(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    fn move_by(&mut self, id: EntityId, delta: Vec2) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };

        let destination = position + delta;
        if !self.point_open(destination) {
            return false;
        }
        self.set_position(id, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SimpleWorld {
        let grid = TileGrid::from_ascii(
            "
            ....
            ..#.
            ....
            ",
        );
        SimpleWorld::new(grid, ["mountain"])
    }

    #[test]
    fn test_find_all_excludes_origin_and_filters_tags() {
        let mut world = world();
        let me = world.spawn(Vec2::new(16.0, 16.0), ["character"]);
        let near = world.spawn(Vec2::new(48.0, 16.0), ["monster"]);
        let _far = world.spawn(Vec2::new(112.0, 80.0), ["monster"]);
        let _food = world.spawn(Vec2::new(16.0, 48.0), ["mushroom"]);

        assert_eq!(world.find_all(me, 64.0, &["monster"]), vec![near]);
        assert_eq!(world.find_all(me, 64.0, &["monster", "mushroom"]).len(), 2);
        assert!(world.find_all(me, 64.0, &["character"]).is_empty());
    }

    #[test]
    fn test_find_nearest() {
        let mut world = world();
        let me = world.spawn(Vec2::new(16.0, 16.0), ["character"]);
        let _second = world.spawn(Vec2::new(80.0, 16.0), ["monster"]);
        let first = world.spawn(Vec2::new(16.0, 48.0), ["monster"]);

        let (id, distance) = world.find_nearest(me, 192.0, &["monster"]).unwrap();
        assert_eq!(id, first);
        assert_eq!(distance, 32.0);
        assert!(world.find_nearest(me, 16.0, &["monster"]).is_none());
    }

    #[test]
    fn test_damage_removes_dead_entities() {
        let mut world = world();
        let monster = world.spawn(Vec2::new(16.0, 16.0), ["monster"]);

        assert!(world.apply_damage(monster, 60));
        assert_eq!(world.entity(monster).unwrap().health, 40);
        assert!(world.apply_damage(monster, 60));
        assert!(!world.contains(monster));
        assert!(!world.apply_damage(monster, 1));
    }

    #[test]
    fn test_move_by_respects_obstacles() {
        let mut world = world();
        let me = world.spawn(Vec2::new(48.0, 48.0), ["character"]);

        assert!(!world.move_by(me, Vec2::new(32.0, 0.0)));
        assert_eq!(world.position(me), Some(Vec2::new(48.0, 48.0)));

        assert!(world.move_by(me, Vec2::new(0.0, 32.0)));
        assert_eq!(world.position(me), Some(Vec2::new(48.0, 80.0)));

        assert!(!world.move_by(me, Vec2::new(0.0, 64.0)));
    }
}
