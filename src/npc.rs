//! # NPC Action Catalog
//!
//! The actions a combat NPC can plan with. Names, preconditions and costs are
//! fixed; the agent maps each planned action back to an [`NpcAction`] to
//! execute it.
//!
//! | Action | Preconditions | Effects | Cost |
//! |---|---|---|---|
//! | RunToSafety | low_health, in_danger | in_danger = false | 1 |
//! | LookForConsumable | consumable_visible | consumable_adjacent | 2 |
//! | TakeConsumable | consumable_adjacent | has_full_health | 2 |
//! | FindTarget | has_target = false, hostiles_nearby | has_target | 3 |
//! | MoveToTarget | has_target, in_attack_range = false | in_attack_range | 3 |
//! | AttackTarget | has_target, in_attack_range | has_defeated_target | 4 |
//! | MoveToStructure | structure_visible, structure_in_range = false | structure_in_range | 3 |
//! | AttackStructure | structure_in_range | has_destroyed_structure | 4 |
//! | Wander | | hostiles_nearby, consumable_visible, structure_visible | 6 |

use crate::perception::facts;
use crate::{Action, ActionCatalog, Result};
use std::fmt;

/// Every action in the NPC catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NpcAction {
    RunToSafety,
    LookForConsumable,
    TakeConsumable,
    FindTarget,
    MoveToTarget,
    AttackTarget,
    MoveToStructure,
    AttackStructure,
    Wander,
}

impl NpcAction {
    /// Registration order of the catalog.
    pub const ALL: [NpcAction; 9] = [
        NpcAction::RunToSafety,
        NpcAction::LookForConsumable,
        NpcAction::TakeConsumable,
        NpcAction::FindTarget,
        NpcAction::MoveToTarget,
        NpcAction::AttackTarget,
        NpcAction::MoveToStructure,
        NpcAction::AttackStructure,
        NpcAction::Wander,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NpcAction::RunToSafety => "RunToSafety",
            NpcAction::LookForConsumable => "LookForConsumable",
            NpcAction::TakeConsumable => "TakeConsumable",
            NpcAction::FindTarget => "FindTarget",
            NpcAction::MoveToTarget => "MoveToTarget",
            NpcAction::AttackTarget => "AttackTarget",
            NpcAction::MoveToStructure => "MoveToStructure",
            NpcAction::AttackStructure => "AttackStructure",
            NpcAction::Wander => "Wander",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    pub fn cost(self) -> f64 {
        match self {
            NpcAction::RunToSafety => 1.0,
            NpcAction::LookForConsumable | NpcAction::TakeConsumable => 2.0,
            NpcAction::FindTarget | NpcAction::MoveToTarget | NpcAction::MoveToStructure => 3.0,
            NpcAction::AttackTarget | NpcAction::AttackStructure => 4.0,
            NpcAction::Wander => 6.0,
        }
    }

    /// The planner definition of this action.
    pub fn definition(self) -> Result<Action> {
        let action = Action::new(self.as_str(), self.cost())?;
        let action = match self {
            NpcAction::RunToSafety => action
                .precondition(facts::LOW_HEALTH, true)
                .precondition(facts::IN_DANGER, true)
                .effect(facts::IN_DANGER, false),
            NpcAction::LookForConsumable => action
                .precondition(facts::CONSUMABLE_VISIBLE, true)
                .effect(facts::CONSUMABLE_ADJACENT, true),
            NpcAction::TakeConsumable => action
                .precondition(facts::CONSUMABLE_ADJACENT, true)
                .effect(facts::HAS_FULL_HEALTH, true),
            NpcAction::FindTarget => action
                .precondition(facts::HAS_TARGET, false)
                .precondition(facts::HOSTILES_NEARBY, true)
                .effect(facts::HAS_TARGET, true),
            NpcAction::MoveToTarget => action
                .precondition(facts::HAS_TARGET, true)
                .precondition(facts::IN_ATTACK_RANGE, false)
                .effect(facts::IN_ATTACK_RANGE, true),
            NpcAction::AttackTarget => action
                .precondition(facts::HAS_TARGET, true)
                .precondition(facts::IN_ATTACK_RANGE, true)
                .effect(facts::HAS_DEFEATED_TARGET, true),
            NpcAction::MoveToStructure => action
                .precondition(facts::STRUCTURE_VISIBLE, true)
                .precondition(facts::STRUCTURE_IN_RANGE, false)
                .effect(facts::STRUCTURE_IN_RANGE, true),
            NpcAction::AttackStructure => action
                .precondition(facts::STRUCTURE_IN_RANGE, true)
                .effect(facts::HAS_DESTROYED_STRUCTURE, true),
            NpcAction::Wander => action
                .effect(facts::HOSTILES_NEARBY, true)
                .effect(facts::CONSUMABLE_VISIBLE, true)
                .effect(facts::STRUCTURE_VISIBLE, true),
        };
        Ok(action)
    }
}

impl fmt::Display for NpcAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the NPC catalog, validated against the fact vocabulary.
pub fn npc_catalog() -> Result<ActionCatalog> {
    let mut catalog = ActionCatalog::with_vocabulary(facts::VOCABULARY);
    for action in NpcAction::ALL {
        catalog.register(action.definition()?)?;
    }
    Ok(catalog)
}
