//! # Grid Pathfinding
//!
//! A* over the open cells of a [`Grid`]. Straight steps cost `1`, diagonal
//! steps cost `√2`, and the heuristic is the Euclidean distance in cells, which
//! never overestimates, so returned paths are the cheapest available.
//!
//! A diagonal step is only taken when both straight cells it passes between
//! are open as well. Agents never squeeze through the corner of two obstacles.
//!
//! ```
//! use goap_agent::{Cell, Pathfinder, TileGrid};
//!
//! let grid = TileGrid::from_ascii(
//!     "
//!     ...
//!     .#.
//!     ...
//!     ",
//! );
//! let pathfinder = Pathfinder::new(["mountain"]);
//!
//! let path = pathfinder.find_path(&grid, Cell::new(0, 0), Cell::new(2, 2)).unwrap();
//! assert_eq!(path.start(), Some(Cell::new(0, 0)));
//! assert_eq!(path.end(), Some(Cell::new(2, 2)));
//! // Every diagonal here would clip the obstacle, so the path goes around it.
//! assert_eq!(path.cost(), 4.0);
//! ```

use crate::config::SearchLimits;
use crate::{Cell, GoapError, Grid, Result};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::f64::consts::SQRT_2;

const STRAIGHT: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// A sequence of cells from start to end, with its total step cost.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    cells: Vec<Cell>,
    cost: f64,
}

impl GridPath {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    pub fn end(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

#[derive(Debug, Clone, Copy)]
struct CellEntry {
    cell: Cell,
    f_cost: f64,
    g_cost: f64,
    seq: u64,
}

impl Ord for CellEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            .then_with(|| other.g_cost.total_cmp(&self.g_cost))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for CellEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellEntry {}

/// Finds paths through a grid while avoiding cells with blocking tags.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    blocking_tags: Vec<String>,
    limits: SearchLimits,
}

impl Pathfinder {
    pub fn new<I, S>(blocking_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocking_tags: blocking_tags.into_iter().map(Into::into).collect(),
            limits: SearchLimits::pathfinder(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn blocking_tags(&self) -> &[String] {
        &self.blocking_tags
    }

    /// Open cells reachable from `cell` in one step, with their step costs.
    pub fn neighbors<G: Grid + ?Sized>(&self, grid: &G, cell: Cell) -> Vec<(Cell, f64)> {
        let open = |c: Cell| grid.cell_open(c, &self.blocking_tags);
        let mut neighbors = Vec::with_capacity(8);

        for (dx, dy) in STRAIGHT {
            let next = cell.offset(dx, dy);
            if open(next) {
                neighbors.push((next, 1.0));
            }
        }

        for (dx, dy) in DIAGONAL {
            let next = cell.offset(dx, dy);
            if open(cell.offset(dx, 0)) && open(cell.offset(0, dy)) && open(next) {
                neighbors.push((next, SQRT_2));
            }
        }

        neighbors
    }

    /// Finds the cheapest path from `start` to `end`.
    ///
    /// Returns `None` when either endpoint lies outside the grid, when no open
    /// route connects them, or when the expansion cap is hit first.
    pub fn find_path<G: Grid + ?Sized>(
        &self,
        grid: &G,
        start: Cell,
        end: Cell,
    ) -> Option<GridPath> {
        if !grid.cell_exists(start) || !grid.cell_exists(end) {
            return None;
        }
        if start == end {
            return Some(GridPath {
                cells: vec![start],
                cost: 0.0,
            });
        }

        let mut open_set = BinaryHeap::new();
        let mut g_score: HashMap<Cell, f64> = HashMap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut closed: HashSet<Cell> = HashSet::new();
        let mut seq = 0u64;
        let mut expanded = 0usize;

        g_score.insert(start, 0.0);
        open_set.push(Reverse(CellEntry {
            cell: start,
            f_cost: start.distance(end),
            g_cost: 0.0,
            seq,
        }));

        while let Some(Reverse(current)) = open_set.pop() {
            if current.cell == end {
                let path = reconstruct_path(&came_from, end, current.g_cost);
                log::trace!(
                    "path {} -> {} of {} cells after {} expansions",
                    start,
                    end,
                    path.len(),
                    expanded
                );
                return Some(path);
            }

            if !closed.insert(current.cell) {
                continue;
            }

            if !self.limits.allows(expanded) {
                log::warn!(
                    "pathfinder gave up after {} expansions between {} and {}",
                    expanded,
                    start,
                    end
                );
                return None;
            }
            expanded += 1;

            for (next, step) in self.neighbors(grid, current.cell) {
                if closed.contains(&next) {
                    continue;
                }

                let tentative_g = current.g_cost + step;
                let improved = g_score.get(&next).map_or(true, |&g| tentative_g < g);
                if improved {
                    g_score.insert(next, tentative_g);
                    came_from.insert(next, current.cell);
                    seq += 1;
                    open_set.push(Reverse(CellEntry {
                        cell: next,
                        f_cost: tentative_g + next.distance(end),
                        g_cost: tentative_g,
                        seq,
                    }));
                }
            }
        }

        None
    }

    /// Like [`Pathfinder::find_path`], reporting failure as an error.
    pub fn try_find_path<G: Grid + ?Sized>(
        &self,
        grid: &G,
        start: Cell,
        end: Cell,
    ) -> Result<GridPath> {
        self.find_path(grid, start, end).ok_or(GoapError::NoPathFound {
            from: start.into(),
            to: end.into(),
        })
    }
}

fn reconstruct_path(came_from: &HashMap<Cell, Cell>, end: Cell, cost: f64) -> GridPath {
    let mut cells = vec![end];
    let mut current = end;
    while let Some(&previous) = came_from.get(&current) {
        cells.push(previous);
        current = previous;
    }
    cells.reverse();
    GridPath { cells, cost }
}
