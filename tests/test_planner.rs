use goap_agent::{
    facts, npc_catalog, seeded_rng, Action, ActionCatalog, AStarSearch, DijkstraSearch, FactState,
    GoalSelector, Planner, SearchAlgorithm,
};
use rand::Rng;

#[cfg(test)]
mod tests {
    use super::*;

    fn npc_planner() -> Planner {
        Planner::new(npc_catalog().unwrap())
    }

    fn random_facts(rng: &mut impl Rng) -> FactState {
        facts::SENSED
            .iter()
            .map(|fact| (*fact, rng.gen_bool(0.5)))
            .collect()
    }

    #[test]
    fn test_planning_is_deterministic() {
        let planner = npc_planner();
        let selector = GoalSelector::npc_default();
        let mut rng = seeded_rng(3);

        for _ in 0..200 {
            let start = random_facts(&mut rng);
            let goal = selector.select(&start);

            let first = planner.plan(&start, goal);
            let second = planner.plan(&start, goal);
            match (first, second) {
                (Some(a), Some(b)) => {
                    assert_eq!(a.names(), b.names());
                    assert_eq!(a.cost(), b.cost());
                }
                (None, None) => {}
                (a, b) => panic!("diverging results for {}: {:?} vs {:?}", start, a, b),
            }
        }
    }

    #[test]
    fn test_plans_are_executable_and_reach_the_goal() {
        let planner = npc_planner();
        let selector = GoalSelector::npc_default();
        let mut rng = seeded_rng(99);

        for _ in 0..200 {
            let start = random_facts(&mut rng);
            let goal = selector.select(&start);
            let Some(plan) = planner.plan(&start, goal) else {
                continue;
            };

            let mut state = start.clone();
            let mut cost = 0.0;
            for action in &plan {
                assert!(action.can_perform(&state), "{} not applicable in {}", action, state);
                cost += action.cost(&state);
                state = action.successor(&state);
            }
            assert!(state.satisfies(goal));
            assert_eq!(cost, plan.cost());
        }
    }

    #[test]
    fn test_every_selected_goal_is_reachable_from_any_sensed_state() {
        // Wander makes hostiles, consumables and structures appear, and the
        // flee rule only fires while health is low, so every goal the NPC
        // selects has a plan.
        let planner = npc_planner();
        let selector = GoalSelector::npc_default();
        let mut rng = seeded_rng(7);

        for _ in 0..200 {
            let start = random_facts(&mut rng);
            let goal = selector.select(&start);
            assert!(
                planner.plan(&start, goal).is_some(),
                "no plan from {} to {}",
                start,
                goal
            );
        }
    }

    #[test]
    fn test_one_action_plan() {
        let planner = npc_planner();
        let start = FactState::new()
            .with(facts::LOW_HEALTH, true)
            .with(facts::IN_DANGER, true)
            .with(facts::HOSTILES_NEARBY, true);
        let goal = GoalSelector::npc_default().select(&start).clone();
        assert_eq!(goal, FactState::new().with(facts::IN_DANGER, false));

        let plan = planner.plan(&start, &goal).unwrap();
        assert_eq!(plan.names(), ["RunToSafety"]);
        assert_eq!(plan.cost(), 1.0);
    }

    #[test]
    fn test_unreachable_goal() {
        let planner = npc_planner();
        // Nothing makes health low, so danger can only be escaped while hurt.
        let start = FactState::new()
            .with(facts::LOW_HEALTH, false)
            .with(facts::IN_DANGER, true);
        assert!(planner
            .plan(&start, &FactState::new().with(facts::IN_DANGER, false))
            .is_none());
    }

    #[test]
    fn test_hunt_scenario_costs_ten() {
        let planner = npc_planner();
        let start = FactState::new()
            .with(facts::HAS_TARGET, false)
            .with(facts::IN_ATTACK_RANGE, false)
            .with(facts::HOSTILES_NEARBY, true);
        let goal = FactState::new().with(facts::HAS_DEFEATED_TARGET, true);

        let plan = planner.plan(&start, &goal).unwrap();
        assert_eq!(plan.names(), ["FindTarget", "MoveToTarget", "AttackTarget"]);
        assert_eq!(plan.cost(), 10.0);
    }

    #[test]
    fn test_three_step_hunt_catalog() {
        let find = Action::new("FindMonster", 3.0)
            .unwrap()
            .precondition("hasTarget", false)
            .effect("hasTarget", true);
        let approach = Action::new("MoveToTarget", 3.0)
            .unwrap()
            .precondition("hasTarget", true)
            .precondition("inAttackRange", false)
            .effect("inAttackRange", true);
        let attack = Action::new("AttackMonster", 4.0)
            .unwrap()
            .precondition("hasTarget", true)
            .precondition("inAttackRange", true)
            .effect("hasDefeatedMonster", true);
        let catalog = ActionCatalog::from_actions(vec![find, approach, attack]).unwrap();
        let planner = Planner::new(catalog);

        let start = FactState::new()
            .with("hasTarget", false)
            .with("inAttackRange", false);
        let goal = FactState::new().with("hasDefeatedMonster", true);

        let plan = planner.plan(&start, &goal).unwrap();
        assert_eq!(plan.names(), ["FindMonster", "MoveToTarget", "AttackMonster"]);
        assert_eq!(plan.cost(), 10.0);
    }

    #[test]
    fn test_mismatch_heuristic_is_not_admissible() {
        let big = Action::new("Big", 2.9)
            .unwrap()
            .effect("a", true)
            .effect("b", true)
            .effect("c", true);
        let prep = Action::new("Prep", 0.1).unwrap().effect("prep", true);
        let finish = Action::new("Finish", 0.1)
            .unwrap()
            .precondition("prep", true)
            .effect("a", true)
            .effect("b", true)
            .effect("c", true);
        let catalog = ActionCatalog::from_actions(vec![big, prep, finish]).unwrap();

        let start = FactState::new();
        let goal = FactState::new().with("a", true).with("b", true).with("c", true);

        // Prep leaves all three mismatches in place, so its f of 3.1 loses to
        // Big's goal node at 2.9.
        let greedy = AStarSearch::default()
            .search(catalog.actions(), &start, &goal)
            .unwrap();
        assert_eq!(greedy.names(), ["Big"]);
        assert!((greedy.cost() - 2.9).abs() < 1e-9);

        let optimal = DijkstraSearch::default()
            .search(catalog.actions(), &start, &goal)
            .unwrap();
        assert_eq!(optimal.names(), ["Prep", "Finish"]);
        assert!((optimal.cost() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_catalog_order_breaks_ties() {
        let left = Action::new("left", 1.0).unwrap().effect("there", true);
        let right = Action::new("right", 1.0).unwrap().effect("there", true);
        let goal = FactState::new().with("there", true);

        let catalog = ActionCatalog::from_actions(vec![left.clone(), right.clone()]).unwrap();
        let plan = Planner::new(catalog).plan(&FactState::new(), &goal).unwrap();
        assert_eq!(plan.names(), ["left"]);

        let plan = Planner::new(ActionCatalog::from_actions(vec![right, left]).unwrap())
            .plan(&FactState::new(), &goal)
            .unwrap();
        assert_eq!(plan.names(), ["right"]);
    }
}
