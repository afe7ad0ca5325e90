use crate::{Action, FactState, Plan, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A visualizer for GOAP plans that generates Graphviz DOT files
#[derive(Debug, Default)]
pub struct GoapVisualizer;

impl GoapVisualizer {
    /// Create a new GOAP visualizer
    pub fn new() -> Self {
        Self
    }

    /// Write a DOT graph of the catalog, the start and goal states, and the
    /// chosen plan into `out`. Action costs are evaluated against `start`.
    pub fn write_plan<W: Write>(
        &self,
        out: &mut W,
        actions: &[Action],
        start: &FactState,
        goal: &FactState,
        plan: &Plan,
    ) -> Result<()> {
        writeln!(out, "digraph GOAP {{")?;
        writeln!(out, "    rankdir=LR;")?;
        writeln!(out, "    node [shape=box, style=filled, fillcolor=lightblue];")?;
        writeln!(out, "    edge [fontsize=10];")?;

        writeln!(
            out,
            "    initial [label=\"Initial State\\n{}\", fillcolor=lightgreen];",
            Self::state_label(start)
        )?;
        writeln!(
            out,
            "    goal [label=\"Goal State\\n{}\", fillcolor=lightpink];",
            Self::state_label(goal)
        )?;

        for (i, action) in actions.iter().enumerate() {
            writeln!(
                out,
                "    action_{} [label=\"{}\\nCost: {}\\nPre: {}\\nEff: {}\"];",
                i,
                action.name,
                action.cost(start),
                Self::state_label(&action.preconditions),
                Self::state_label(&action.effects)
            )?;
        }

        for (i, action) in actions.iter().enumerate() {
            if action.can_perform(start) {
                writeln!(out, "    initial -> action_{} [label=\"possible\"];", i)?;
            }
        }

        for (i, action) in actions.iter().enumerate() {
            if action.successor(start).satisfies(goal) {
                writeln!(out, "    action_{} -> goal [label=\"achieves\"];", i)?;
            }
        }

        // Chosen plan as a red chain from the initial state to the goal
        let indices: Vec<usize> = plan
            .iter()
            .filter_map(|step| actions.iter().position(|a| a.name == step.name))
            .collect();
        for idx in &indices {
            writeln!(out, "    action_{} [fillcolor=lightcoral];", idx)?;
        }
        writeln!(out, "    edge [color=red, penwidth=2.0];")?;
        let mut previous = String::from("initial");
        for idx in &indices {
            let node = format!("action_{}", idx);
            writeln!(out, "    {} -> {};", previous, node)?;
            previous = node;
        }
        if !indices.is_empty() {
            writeln!(out, "    {} -> goal;", previous)?;
        }

        writeln!(out, "}}")?;
        Ok(())
    }

    /// Generate a DOT file visualization of a GOAP plan
    pub fn visualize_plan(
        &self,
        actions: &[Action],
        start: &FactState,
        goal: &FactState,
        plan: &Plan,
        filename: impl AsRef<Path>,
    ) -> Result<()> {
        let mut file = BufWriter::new(File::create(filename)?);
        self.write_plan(&mut file, actions, start, goal, plan)?;
        file.flush()?;
        Ok(())
    }

    fn state_label(state: &FactState) -> String {
        state
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value).replace('"', "\\\""))
            .collect::<Vec<_>>()
            .join("\\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner;

    fn fixture() -> (Vec<Action>, FactState, FactState) {
        let fetch = Action::new("fetch", 1.0).unwrap().effect("has_item", true);
        let use_item = Action::new("use_item", 2.0)
            .unwrap()
            .precondition("has_item", true)
            .effect("goal_achieved", true);

        let start = FactState::new()
            .with("has_item", false)
            .with("goal_achieved", false);
        let goal = FactState::new().with("goal_achieved", true);
        (vec![fetch, use_item], start, goal)
    }

    #[test]
    fn test_write_plan() {
        let (actions, start, goal) = fixture();
        let plan = planner::plan(&start, &goal, &actions).unwrap();

        let mut buffer = Vec::new();
        GoapVisualizer::new()
            .write_plan(&mut buffer, &actions, &start, &goal, &plan)
            .unwrap();
        let content = String::from_utf8(buffer).unwrap();

        assert!(content.starts_with("digraph GOAP {"));
        assert!(content.contains("has_item: false"));
        assert!(content.contains("goal_achieved: true"));
        assert!(content.contains("initial -> action_0 [label=\"possible\"];"));
        assert!(!content.contains("initial -> action_1 [label=\"possible\"];"));
        assert!(content.contains("initial -> action_0;"));
        assert!(content.contains("action_0 -> action_1;"));
        assert!(content.contains("action_1 -> goal;"));
        assert!(content.trim_end().ends_with('}'));
    }

    #[test]
    fn test_visualize_plan_to_file() {
        let (actions, start, goal) = fixture();
        let plan = planner::plan(&start, &goal, &actions).unwrap();
        let path = std::env::temp_dir().join(format!("goap_plan_{}.dot", std::process::id()));

        GoapVisualizer::new()
            .visualize_plan(&actions, &start, &goal, &plan, &path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("digraph GOAP"));
        assert!(content.contains("use_item"));

        std::fs::remove_file(&path).unwrap();
    }
}
