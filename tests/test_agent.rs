mod common;

use common::*;
use goap_agent::{
    facts, seeded_rng, Cell, FactState, Grid, NpcAction, SpatialIndex, Spawner, SpawnerId,
    TickOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flees_when_hurt_and_threatened() {
        let mut world = open_world(20, 12);
        let mut agent = spawn_npc(&mut world, Cell::new(10, 6)).with_health(20);
        let monster = spawn_monster(&mut world, Cell::new(12, 6));
        let mut rng = seeded_rng(1);

        let before = position(&world, &agent);
        let outcome = agent.tick(&mut world, &mut rng, 0.0);

        assert_eq!(outcome, TickOutcome::Performed(NpcAction::RunToSafety));
        assert_eq!(agent.goal(), &FactState::new().with(facts::IN_DANGER, false));
        let threat = world.position(monster).unwrap();
        assert!(position(&world, &agent).distance(threat) > before.distance(threat));
    }

    #[test]
    fn test_safety_comes_before_a_visible_mushroom() {
        let mut world = open_world(20, 12);
        let mut agent = spawn_npc(&mut world, Cell::new(10, 6)).with_health(20);
        spawn_monster(&mut world, Cell::new(12, 6));
        world.spawn_at_cell(Cell::new(8, 6), ["mushroom"]);
        let mut rng = seeded_rng(11);

        let outcome = agent.tick(&mut world, &mut rng, 0.0);

        assert!(agent.facts().is_true(facts::CONSUMABLE_VISIBLE));
        assert!(!agent.facts().is_true(facts::CONSUMABLE_ADJACENT));
        assert_eq!(agent.goal(), &FactState::new().with(facts::IN_DANGER, false));
        assert_eq!(outcome, TickOutcome::Performed(NpcAction::RunToSafety));
    }

    #[test]
    fn test_flees_along_the_map_edge() {
        for seed in 0..20 {
            let mut world = open_world(20, 12);
            let mut agent = spawn_npc(&mut world, Cell::new(1, 6)).with_health(20);
            let monster = spawn_monster(&mut world, Cell::new(3, 6));
            let mut rng = seeded_rng(seed);

            let threat = world.position(monster).unwrap();
            let before = position(&world, &agent).distance(threat);
            let outcome = agent.tick(&mut world, &mut rng, 0.0);

            assert_eq!(outcome, TickOutcome::Performed(NpcAction::RunToSafety));
            assert!(!agent.path_follower().is_empty());
            assert!(position(&world, &agent).distance(threat) > before);
        }
    }

    #[test]
    fn test_hunts_and_defeats_a_monster() {
        let mut world = open_world(12, 10);
        let mut agent = spawn_npc(&mut world, Cell::new(2, 5));
        let monster = spawn_monster(&mut world, Cell::new(6, 5));
        let mut rng = seeded_rng(2);

        let outcomes = run_until(&mut agent, &mut world, &mut rng, 2_000, |_, w| {
            !w.contains(monster)
        });

        assert!(!world.contains(monster), "monster survived");
        assert_eq!(
            action_sequence(&outcomes),
            ["FindTarget", "MoveToTarget", "AttackTarget"]
        );
    }

    #[test]
    fn test_stale_target_is_cleared_before_sensing() {
        let mut world = open_world(12, 10);
        let mut agent = spawn_npc(&mut world, Cell::new(2, 5));
        let monster = spawn_monster(&mut world, Cell::new(6, 5));
        let mut rng = seeded_rng(3);

        agent.tick(&mut world, &mut rng, 0.0);
        assert_eq!(agent.target(), Some(monster));

        world.despawn(monster);
        let outcome = agent.tick(&mut world, &mut rng, DT);

        assert_eq!(agent.target(), None);
        assert_eq!(agent.facts().get_bool(facts::HAS_TARGET), Some(false));
        assert_eq!(outcome, TickOutcome::Performed(NpcAction::Wander));
    }

    #[test]
    fn test_eats_a_visible_mushroom_when_hurt() {
        let mut world = open_world(12, 10);
        let mut agent = spawn_npc(&mut world, Cell::new(2, 2)).with_health(50);
        let mushroom = world.spawn_at_cell(Cell::new(5, 4), ["mushroom"]);
        let mut rng = seeded_rng(4);

        let outcomes = run_until(&mut agent, &mut world, &mut rng, 1_000, |_, w| {
            !w.contains(mushroom)
        });

        assert!(!world.contains(mushroom));
        assert_eq!(agent.health().current, 70);
        assert_eq!(
            action_sequence(&outcomes),
            ["LookForConsumable", "TakeConsumable"]
        );
    }

    #[test]
    fn test_heal_never_exceeds_max_health() {
        let mut world = open_world(6, 6);
        let mut agent = spawn_npc(&mut world, Cell::new(2, 2)).with_health(95);
        let mushroom = world.spawn(position(&world, &agent), ["mushroom"]);
        let mut rng = seeded_rng(5);

        let outcome = agent.tick(&mut world, &mut rng, 0.0);

        assert_eq!(outcome, TickOutcome::Performed(NpcAction::TakeConsumable));
        assert!(!world.contains(mushroom));
        assert_eq!(agent.health().current, 100);
    }

    #[test]
    fn test_attacks_a_structure_from_an_open_neighbour() {
        let mut world = world_from(
            "
            ........
            ........
            ......D.
            ........
            ",
        );
        let den = world.spawn_at_cell(Cell::new(6, 2), ["goblin_den"]);
        let mut agent = spawn_npc(&mut world, Cell::new(1, 2));
        let mut rng = seeded_rng(6);

        let outcomes = run_until(&mut agent, &mut world, &mut rng, 2_000, |_, w| {
            !w.contains(den)
        });

        assert!(!world.contains(den), "den survived");
        assert_eq!(
            action_sequence(&outcomes),
            ["MoveToStructure", "AttackStructure"]
        );
    }

    #[test]
    fn test_walks_around_walls() {
        let mut world = world_from(
            "
            .........
            ...#.....
            ...#.....
            ...#.....
            .........
            ",
        );
        let mut agent = spawn_npc(&mut world, Cell::new(1, 2));
        let monster = spawn_monster(&mut world, Cell::new(5, 2));
        let mut rng = seeded_rng(7);

        let outcomes = run_until(&mut agent, &mut world, &mut rng, 1_000, |a, _| {
            a.facts().is_true(facts::IN_ATTACK_RANGE)
        });

        assert_eq!(agent.target(), Some(monster));
        assert!(agent.facts().is_true(facts::IN_ATTACK_RANGE));
        assert!(!outcomes.contains(&TickOutcome::Performed(NpcAction::Wander)));
    }

    #[test]
    fn test_unreachable_target_falls_back_to_wandering() {
        let mut world = world_from(
            "
            .....#...
            .....#...
            .....#...
            ",
        );
        let mut agent = spawn_npc(&mut world, Cell::new(1, 1));
        spawn_monster(&mut world, Cell::new(6, 1));
        let mut rng = seeded_rng(8);

        let before = position(&world, &agent);
        let outcome = agent.tick(&mut world, &mut rng, 0.0);

        assert_eq!(outcome, TickOutcome::Performed(NpcAction::FindTarget));
        assert!(agent.path_follower().is_empty());
        assert_ne!(position(&world, &agent), before);
    }

    #[test]
    fn test_wandering_is_reproducible_with_a_seed() {
        let simulate = |seed: u64| {
            let mut world = open_world(30, 30);
            let mut agent = spawn_npc(&mut world, Cell::new(15, 15));
            let mut rng = seeded_rng(seed);
            let outcomes = run_until(&mut agent, &mut world, &mut rng, 600, |_, _| false);
            assert!(outcomes
                .iter()
                .all(|o| *o == TickOutcome::Performed(NpcAction::Wander)));
            position(&world, &agent)
        };

        assert_eq!(simulate(42), simulate(42));
    }

    #[test]
    fn test_spawned_monsters_draw_the_agent() {
        let mut world = open_world(20, 20);
        let mut agent = spawn_npc(&mut world, Cell::new(10, 10));
        let mut spawner = Spawner::new(SpawnerId(1), world.cell_center(Cell::new(13, 10)));
        let mut rng = seeded_rng(9);

        let request = spawner.update(0.0, &mut rng).unwrap();
        let monster = world.spawn(request.position, ["monster"]);

        agent.tick(&mut world, &mut rng, 0.0);
        assert_eq!(agent.target(), Some(monster));
        assert!(spawner.update(1.0, &mut rng).is_none());
    }
}
