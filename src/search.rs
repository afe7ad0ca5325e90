use crate::config::SearchLimits;
use crate::planner::Plan;
use crate::{Action, FactState};
use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Trait defining the interface for search algorithms used by the planner.
///
/// Implementations must be pure functions of their inputs: the same actions (in
/// the same order), start and goal always produce the same plan.
///
/// # Examples
///
/// ```
/// use goap_agent::{Action, FactState, Plan, SearchAlgorithm};
///
/// /// Picks the first applicable action that reaches the goal in one step.
/// struct OneStepSearch;
///
/// impl SearchAlgorithm for OneStepSearch {
///     fn search(&self, actions: &[Action], start: &FactState, goal: &FactState) -> Option<Plan> {
///         actions
///             .iter()
///             .filter(|a| a.can_perform(start))
///             .find(|a| a.successor(start).satisfies(goal))
///             .map(|a| Plan::new(vec![a.clone()], a.cost(start)))
///     }
/// }
/// ```
pub trait SearchAlgorithm: Send + Sync {
    /// Finds a sequence of actions that transforms `start` into a state
    /// satisfying `goal`, or `None` if there is none.
    fn search(&self, actions: &[Action], start: &FactState, goal: &FactState) -> Option<Plan>;
}

/// A trait for heuristic functions used in search algorithms.
pub trait HeuristicStrategy: Send + Sync {
    /// Estimates the remaining cost from `state` to `goal`.
    fn calculate(&self, state: &FactState, goal: &FactState) -> f64;
}

/// Counts goal facts the state does not match.
///
/// Assumes every mismatch costs one unit to fix. It is not admissible when a
/// single action fixes several mismatches for less than their count, so A* with
/// this heuristic can return a plan that is not the cheapest.
pub struct DefaultHeuristic;

impl HeuristicStrategy for DefaultHeuristic {
    fn calculate(&self, state: &FactState, goal: &FactState) -> f64 {
        state.mismatch_count(goal) as f64
    }
}

/// Zero heuristic for algorithms like Dijkstra that don't use heuristics.
pub struct ZeroHeuristic;

impl HeuristicStrategy for ZeroHeuristic {
    fn calculate(&self, _state: &FactState, _goal: &FactState) -> f64 {
        0.0
    }
}

/// One distinct canonical state reached during a search.
#[derive(Debug)]
struct Node {
    state: FactState,
    /// Index of the predecessor node
    parent: Option<usize>,
    /// Index into the action slice of the edge from the predecessor
    action: Option<usize>,
    /// Best known path cost from start to this node
    g_cost: f64,
}

/// Open-set entry. Ordered so the smallest entry is the one to expand next.
#[derive(Debug, Clone, Copy)]
struct NodeWrapper {
    idx: usize,
    f_cost: f64,
    g_cost: f64,
    /// Insertion counter, the last tie-breaker
    seq: u64,
}

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower f first; on ties prefer paths that are further along (higher g),
        // then the earlier insertion.
        self.f_cost
            .total_cmp(&other.f_cost)
            .then_with(|| other.g_cost.total_cmp(&self.g_cost))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeWrapper {}

/// Bookkeeping for a single search. Dropped when the search returns.
struct SearchContext<'a> {
    goal: &'a FactState,
    heuristic: &'a dyn HeuristicStrategy,
    /// Arena of every distinct state reached
    nodes: Vec<Node>,
    /// Canonical key to node index
    index: HashMap<String, usize>,
    open_set: BinaryHeap<Reverse<NodeWrapper>>,
    seq: u64,
}

impl<'a> SearchContext<'a> {
    fn new(start: &FactState, goal: &'a FactState, heuristic: &'a dyn HeuristicStrategy) -> Self {
        let mut context = Self {
            goal,
            heuristic,
            nodes: Vec::new(),
            index: HashMap::new(),
            open_set: BinaryHeap::new(),
            seq: 0,
        };

        context.index.insert(start.canonical_key(), 0);
        context.nodes.push(Node {
            state: start.clone(),
            parent: None,
            action: None,
            g_cost: 0.0,
        });
        context.push_open(0);
        context
    }

    fn push_open(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let f_cost = node.g_cost + self.heuristic.calculate(&node.state, self.goal);
        self.open_set.push(Reverse(NodeWrapper {
            idx,
            f_cost,
            g_cost: node.g_cost,
            seq: self.seq,
        }));
        self.seq += 1;
    }

    /// Pops the best open node, skipping entries superseded by a cheaper path.
    fn next_node(&mut self) -> Option<usize> {
        while let Some(Reverse(entry)) = self.open_set.pop() {
            if entry.g_cost <= self.nodes[entry.idx].g_cost {
                return Some(entry.idx);
            }
        }
        None
    }

    /// Relaxes the edge `parent --action--> successor`.
    fn relax(&mut self, parent_idx: usize, action_idx: usize, action: &Action) {
        let parent = &self.nodes[parent_idx];

        let step_cost = action.cost(&parent.state);
        if !step_cost.is_finite() || step_cost < 0.0 {
            log::warn!(
                "skipping action {} with invalid cost {}",
                action.name,
                step_cost
            );
            return;
        }

        let successor = action.successor(&parent.state);
        let tentative_g = parent.g_cost + step_cost;
        let key = successor.canonical_key();

        match self.index.get(&key) {
            Some(&existing) if self.nodes[existing].g_cost <= tentative_g => {}
            Some(&existing) => {
                let node = &mut self.nodes[existing];
                node.parent = Some(parent_idx);
                node.action = Some(action_idx);
                node.g_cost = tentative_g;
                self.push_open(existing);
            }
            None => {
                let idx = self.nodes.len();
                self.nodes.push(Node {
                    state: successor,
                    parent: Some(parent_idx),
                    action: Some(action_idx),
                    g_cost: tentative_g,
                });
                self.index.insert(key, idx);
                self.push_open(idx);
            }
        }
    }

    /// Walks predecessor links back to the start and returns the plan.
    fn reconstruct_plan(&self, node_idx: usize, actions: &[Action]) -> Plan {
        let mut path = Vec::new();
        let mut current = Some(node_idx);

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if let Some(action_idx) = node.action {
                path.push(actions[action_idx].clone());
            }
            current = node.parent;
        }

        path.reverse();
        Plan::new(path, self.nodes[node_idx].g_cost)
    }
}

/// A* search algorithm implementation.
pub struct AStarSearch {
    heuristic: Box<dyn HeuristicStrategy>,
    limits: SearchLimits,
}

impl AStarSearch {
    /// Creates a new A* search with the given heuristic.
    pub fn new(heuristic: Box<dyn HeuristicStrategy>) -> Self {
        Self {
            heuristic,
            limits: SearchLimits::planner(),
        }
    }

    /// Creates a new A* search with the mismatch-count heuristic.
    pub fn with_default_heuristic() -> Self {
        Self::new(Box::new(DefaultHeuristic))
    }

    /// Replaces the expansion cap.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }
}

impl Default for AStarSearch {
    fn default() -> Self {
        Self::with_default_heuristic()
    }
}

impl SearchAlgorithm for AStarSearch {
    fn search(&self, actions: &[Action], start: &FactState, goal: &FactState) -> Option<Plan> {
        if start.satisfies(goal) {
            return Some(Plan::empty());
        }

        let mut context = SearchContext::new(start, goal, self.heuristic.as_ref());
        let mut expanded = 0usize;

        while let Some(current_idx) = context.next_node() {
            if context.nodes[current_idx].state.satisfies(goal) {
                let plan = context.reconstruct_plan(current_idx, actions);
                log::trace!(
                    "plan found after {} expansions over {} states",
                    expanded,
                    context.nodes.len()
                );
                return Some(plan);
            }

            if !self.limits.allows(expanded) {
                log::warn!(
                    "planner gave up after {} expansions without reaching {}",
                    expanded,
                    goal
                );
                return None;
            }
            expanded += 1;

            for (action_idx, action) in actions.iter().enumerate() {
                if action.can_perform(&context.nodes[current_idx].state) {
                    context.relax(current_idx, action_idx, action);
                }
            }
        }

        None
    }
}

/// Dijkstra's algorithm implementation. Always returns a cheapest plan.
#[derive(Default)]
pub struct DijkstraSearch {
    limits: SearchLimits,
}

impl DijkstraSearch {
    pub fn with_limits(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl SearchAlgorithm for DijkstraSearch {
    fn search(&self, actions: &[Action], start: &FactState, goal: &FactState) -> Option<Plan> {
        // Dijkstra is A* with a zero heuristic
        let astar = AStarSearch::new(Box::new(ZeroHeuristic)).with_limits(self.limits);
        astar.search(actions, start, goal)
    }
}
