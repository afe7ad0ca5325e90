//! # Goal Selection
//!
//! Picks the goal an agent plans toward this tick from an ordered list of
//! rules. The first rule whose condition holds wins; when none does, the
//! fallback goal is used.
//!
//! ```
//! use goap_agent::{facts, FactState, GoalSelector};
//!
//! let selector = GoalSelector::npc_default();
//!
//! let hurt_and_surrounded = FactState::new()
//!     .with(facts::LOW_HEALTH, true)
//!     .with(facts::HOSTILES_NEARBY, true)
//!     .with(facts::IN_ATTACK_RANGE, true);
//! assert_eq!(
//!     selector.select(&hurt_and_surrounded),
//!     &FactState::new().with(facts::IN_DANGER, false)
//! );
//! ```

use crate::perception::facts;
use crate::FactState;
use std::fmt;

pub type GoalCondition = Box<dyn Fn(&FactState) -> bool + Send + Sync>;

/// A named condition and the goal it selects.
pub struct GoalRule {
    pub name: String,
    condition: GoalCondition,
    pub goal: FactState,
}

impl GoalRule {
    pub fn matches(&self, state: &FactState) -> bool {
        (self.condition)(state)
    }
}

impl fmt::Debug for GoalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoalRule")
            .field("name", &self.name)
            .field("goal", &self.goal)
            .finish()
    }
}

/// Ordered goal rules with a fallback.
#[derive(Debug)]
pub struct GoalSelector {
    rules: Vec<GoalRule>,
    fallback: FactState,
}

impl GoalSelector {
    pub fn new(fallback: FactState) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Appends a rule. Rules are tried in the order they are added.
    pub fn rule<F>(mut self, name: impl Into<String>, condition: F, goal: FactState) -> Self
    where
        F: Fn(&FactState) -> bool + Send + Sync + 'static,
    {
        self.rules.push(GoalRule {
            name: name.into(),
            condition: Box::new(condition),
            goal,
        });
        self
    }

    /// Survive first, then finish a fight in progress, then heal, then hunt,
    /// then go after structures, and otherwise wander until something turns up.
    pub fn npc_default() -> Self {
        let goal = |fact: &str, value: bool| FactState::new().with(fact, value);

        Self::new(goal(facts::HOSTILES_NEARBY, true))
            .rule(
                "flee",
                |s| s.is_true(facts::LOW_HEALTH) && s.is_true(facts::HOSTILES_NEARBY),
                goal(facts::IN_DANGER, false),
            )
            .rule(
                "defeat_target",
                |s| s.is_true(facts::IN_ATTACK_RANGE),
                goal(facts::HAS_DEFEATED_TARGET, true),
            )
            .rule(
                "heal",
                |s| !s.is_true(facts::HAS_FULL_HEALTH),
                goal(facts::HAS_FULL_HEALTH, true),
            )
            .rule(
                "approach_target",
                |s| s.is_true(facts::HAS_TARGET),
                goal(facts::IN_ATTACK_RANGE, true),
            )
            .rule(
                "acquire_target",
                |s| s.is_true(facts::HOSTILES_NEARBY),
                goal(facts::HAS_TARGET, true),
            )
            .rule(
                "destroy_structure",
                |s| s.is_true(facts::STRUCTURE_IN_RANGE),
                goal(facts::HAS_DESTROYED_STRUCTURE, true),
            )
            .rule(
                "approach_structure",
                |s| s.is_true(facts::STRUCTURE_VISIBLE),
                goal(facts::STRUCTURE_IN_RANGE, true),
            )
    }

    /// The goal for `state`.
    pub fn select(&self, state: &FactState) -> &FactState {
        self.select_named(state).1
    }

    /// The goal for `state` with the name of the rule that chose it, or
    /// `"fallback"`.
    pub fn select_named(&self, state: &FactState) -> (&str, &FactState) {
        self.rules
            .iter()
            .find(|rule| rule.matches(state))
            .map(|rule| (rule.name.as_str(), &rule.goal))
            .unwrap_or(("fallback", &self.fallback))
    }

    pub fn rules(&self) -> &[GoalRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &FactState {
        &self.fallback
    }
}

impl Default for GoalSelector {
    fn default() -> Self {
        Self::npc_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> FactState {
        facts::SENSED
            .iter()
            .map(|f| (*f, *f == facts::HAS_FULL_HEALTH))
            .collect()
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let selector = GoalSelector::npc_default();
        let (name, goal) = selector.select_named(&healthy());
        assert_eq!(name, "fallback");
        assert_eq!(goal, &FactState::new().with(facts::HOSTILES_NEARBY, true));
    }

    #[test]
    fn test_rule_order() {
        let selector = GoalSelector::npc_default();

        let mut state = healthy();
        state.set(facts::STRUCTURE_VISIBLE, true);
        assert_eq!(selector.select_named(&state).0, "approach_structure");

        state.set(facts::STRUCTURE_IN_RANGE, true);
        assert_eq!(selector.select_named(&state).0, "destroy_structure");

        state.set(facts::HOSTILES_NEARBY, true);
        assert_eq!(selector.select_named(&state).0, "acquire_target");

        state.set(facts::HAS_TARGET, true);
        assert_eq!(selector.select_named(&state).0, "approach_target");

        state.set(facts::HAS_FULL_HEALTH, false);
        assert_eq!(selector.select_named(&state).0, "heal");

        state.set(facts::IN_ATTACK_RANGE, true);
        assert_eq!(selector.select_named(&state).0, "defeat_target");

        state.set(facts::LOW_HEALTH, true);
        assert_eq!(selector.select_named(&state).0, "flee");
    }

    #[test]
    fn test_low_health_alone_does_not_flee() {
        let selector = GoalSelector::npc_default();
        let mut state = healthy();
        state.set(facts::LOW_HEALTH, true);
        state.set(facts::HAS_FULL_HEALTH, false);
        assert_eq!(
            selector.select(&state),
            &FactState::new().with(facts::HAS_FULL_HEALTH, true)
        );
    }

    #[test]
    fn test_custom_rules() {
        let selector = GoalSelector::new(FactState::new().with("idle", true)).rule(
            "eat",
            |s| s.is_true("hungry"),
            FactState::new().with("fed", true),
        );
        assert_eq!(selector.rules().len(), 1);
        assert_eq!(selector.select_named(&FactState::new().with("hungry", true)).0, "eat");
        assert_eq!(selector.select(&FactState::new()), selector.fallback());
    }
}
