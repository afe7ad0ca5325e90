//! # Perception
//!
//! Turns spatial queries into the boolean facts the planner reasons about.
//! A [`Perception`] is a short-lived view of the world from one agent's
//! position; it is built at the start of a tick and dropped at the end.

use crate::agent::Health;
use crate::{AgentConfig, EntityId, FactState, SpatialIndex, Vec2};

/// Fact names shared by perception, goal selection and the NPC catalog.
pub mod facts {
    pub const LOW_HEALTH: &str = "low_health";
    pub const HAS_FULL_HEALTH: &str = "has_full_health";
    pub const IN_DANGER: &str = "in_danger";
    pub const HAS_TARGET: &str = "has_target";
    pub const IN_ATTACK_RANGE: &str = "in_attack_range";
    pub const HOSTILES_NEARBY: &str = "hostiles_nearby";
    pub const CONSUMABLE_ADJACENT: &str = "consumable_adjacent";
    pub const CONSUMABLE_VISIBLE: &str = "consumable_visible";
    pub const STRUCTURE_IN_RANGE: &str = "structure_in_range";
    pub const STRUCTURE_VISIBLE: &str = "structure_visible";

    /// Only ever appear in goals and effects, never sensed.
    pub const HAS_DEFEATED_TARGET: &str = "has_defeated_target";
    pub const HAS_DESTROYED_STRUCTURE: &str = "has_destroyed_structure";

    /// Facts computed on every tick.
    pub const SENSED: [&str; 10] = [
        LOW_HEALTH,
        HAS_FULL_HEALTH,
        IN_DANGER,
        HAS_TARGET,
        IN_ATTACK_RANGE,
        HOSTILES_NEARBY,
        CONSUMABLE_ADJACENT,
        CONSUMABLE_VISIBLE,
        STRUCTURE_IN_RANGE,
        STRUCTURE_VISIBLE,
    ];

    /// Every fact an NPC action may mention.
    pub const VOCABULARY: [&str; 12] = [
        LOW_HEALTH,
        HAS_FULL_HEALTH,
        IN_DANGER,
        HAS_TARGET,
        IN_ATTACK_RANGE,
        HOSTILES_NEARBY,
        CONSUMABLE_ADJACENT,
        CONSUMABLE_VISIBLE,
        STRUCTURE_IN_RANGE,
        STRUCTURE_VISIBLE,
        HAS_DEFEATED_TARGET,
        HAS_DESTROYED_STRUCTURE,
    ];
}

/// One agent's view of a [`SpatialIndex`].
pub struct Perception<'a, S: SpatialIndex + ?Sized> {
    index: &'a S,
    config: &'a AgentConfig,
    me: EntityId,
    origin: Vec2,
}

impl<'a, S: SpatialIndex + ?Sized> Perception<'a, S> {
    /// Returns `None` when `me` is not in the index.
    pub fn new(index: &'a S, config: &'a AgentConfig, me: EntityId) -> Option<Self> {
        let origin = index.position(me)?;
        Some(Self {
            index,
            config,
            me,
            origin,
        })
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Distance to `id`, or `None` if it vanished.
    pub fn distance_to(&self, id: EntityId) -> Option<f64> {
        self.index.position(id).map(|p| self.origin.distance(p))
    }

    pub fn within(&self, id: EntityId, radius: f64) -> bool {
        self.distance_to(id).map_or(false, |d| d <= radius)
    }

    pub fn in_danger(&self) -> bool {
        !self.hostiles_within(self.config.danger_radius).is_empty()
    }

    pub fn hostiles_nearby(&self) -> bool {
        !self.hostiles_within(self.config.awareness_radius).is_empty()
    }

    pub fn hostiles_within(&self, radius: f64) -> Vec<EntityId> {
        self.index
            .find_all(self.me, radius, &[self.config.hostile_tag.as_str()])
    }

    pub fn nearest_hostile(&self) -> Option<EntityId> {
        self.nearest(self.config.awareness_radius, &self.config.hostile_tag)
    }

    /// A consumable close enough to take.
    pub fn adjacent_consumable(&self) -> Option<EntityId> {
        let tags = [self.config.consumable_tag.as_str()];
        self.index
            .find_nearest(self.me, self.config.pickup_radius, &tags)
            .filter(|(_, distance)| *distance < self.config.pickup_radius)
            .map(|(id, _)| id)
    }

    pub fn nearest_consumable(&self) -> Option<EntityId> {
        self.nearest(self.config.awareness_radius, &self.config.consumable_tag)
    }

    pub fn nearest_structure(&self) -> Option<EntityId> {
        self.nearest(self.config.awareness_radius, &self.config.structure_tag)
    }

    pub fn structure_in_range(&self) -> Option<EntityId> {
        self.nearest(self.config.attack_range, &self.config.structure_tag)
    }

    fn nearest(&self, radius: f64, tag: &str) -> Option<EntityId> {
        self.index
            .find_nearest(self.me, radius, &[tag])
            .map(|(id, _)| id)
    }

    /// The point `safety_distance` away from the hostiles' average position,
    /// directly away from it. The agent's own position when nothing threatens it.
    ///
    /// The point may lie outside the map.
    pub fn safe_point(&self) -> Vec2 {
        let positions: Vec<Vec2> = self
            .hostiles_within(self.config.awareness_radius)
            .into_iter()
            .filter_map(|id| self.index.position(id))
            .collect();
        if positions.is_empty() {
            return self.origin;
        }

        let average = positions.iter().sum::<Vec2>() / positions.len() as f64;
        let away = (self.origin - average).normalize_or_zero();
        self.origin + away * self.config.safety_distance
    }

    /// Computes every sensed fact.
    ///
    /// `target` must already have been checked for staleness; a vanished
    /// target simply reads as out of range.
    pub fn sense(&self, health: &Health, target: Option<EntityId>) -> FactState {
        let low_health = f64::from(health.current) < self.config.low_health_threshold();
        let in_attack_range =
            target.map_or(false, |id| self.within(id, self.config.attack_range));

        FactState::new()
            .with(facts::LOW_HEALTH, low_health)
            .with(facts::HAS_FULL_HEALTH, health.is_full())
            .with(facts::IN_DANGER, self.in_danger())
            .with(facts::HAS_TARGET, target.is_some())
            .with(facts::IN_ATTACK_RANGE, in_attack_range)
            .with(facts::HOSTILES_NEARBY, self.hostiles_nearby())
            .with(facts::CONSUMABLE_ADJACENT, self.adjacent_consumable().is_some())
            .with(facts::CONSUMABLE_VISIBLE, self.nearest_consumable().is_some())
            .with(facts::STRUCTURE_IN_RANGE, self.structure_in_range().is_some())
            .with(facts::STRUCTURE_VISIBLE, self.nearest_structure().is_some())
    }
}
