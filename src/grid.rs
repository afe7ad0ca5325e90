//! # Grid Module
//!
//! Discrete view of the world used by the pathfinder. A [`Cell`] is a plain
//! coordinate pair; everything about it (whether it exists, what is on it) is
//! answered by the [`Grid`] it is looked up in.
//!
//! [`TileGrid`] is the in-memory implementation: a rectangle of cells each
//! carrying a set of tags. Fixtures can be written as ASCII art:
//!
//! ```
//! use goap_agent::{Cell, Grid, TileGrid};
//!
//! let grid = TileGrid::from_ascii(
//!     "
//!     ..#
//!     .D.
//!     ",
//! );
//! let blocking = vec!["mountain".to_string(), "goblin_den".to_string()];
//!
//! assert_eq!((grid.width(), grid.height()), (3, 2));
//! assert!(grid.cell_blocked(Cell::new(2, 0), &blocking));
//! assert!(grid.cell_blocked(Cell::new(1, 1), &blocking));
//! assert!(!grid.cell_blocked(Cell::new(0, 0), &blocking));
//! assert!(!grid.cell_exists(Cell::new(3, 0)));
//! ```

use crate::Vec2;
use std::collections::BTreeSet;
use std::fmt;

/// Integer grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Straight-line distance in cells.
    pub fn distance(self, other: Cell) -> f64 {
        f64::from(other.x - self.x).hypot(f64::from(other.y - self.y))
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Queries the pathfinder and agents make against a tiled world.
pub trait Grid {
    /// Whether `cell` lies inside the grid.
    fn cell_exists(&self, cell: Cell) -> bool;

    /// Whether `cell` carries any of `tags`. Cells outside the grid are blocked.
    fn cell_blocked(&self, cell: Cell, tags: &[String]) -> bool;

    /// The cell containing a world-space point.
    fn world_to_cell(&self, point: Vec2) -> Cell;

    /// World-space center of `cell`.
    fn cell_center(&self, cell: Cell) -> Vec2;

    /// Whether `cell` exists and is not blocked.
    fn cell_open(&self, cell: Cell, tags: &[String]) -> bool {
        self.cell_exists(cell) && !self.cell_blocked(cell, tags)
    }
}

/// A rectangular grid of tagged cells.
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tile_size: f64,
    cells: Vec<BTreeSet<String>>,
}

impl TileGrid {
    pub const DEFAULT_TILE_SIZE: f64 = 32.0;

    pub const OBSTACLE_CHAR: char = '#';
    pub const STRUCTURE_CHAR: char = 'D';

    /// Creates an untagged grid of `width` x `height` cells.
    pub fn new(width: i32, height: i32, tile_size: f64) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tile_size,
            cells: vec![BTreeSet::new(); (width as usize) * (height as usize)],
        }
    }

    /// Parses an ASCII map with the default tile size.
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed, so maps
    /// can be indented. `#` becomes `mountain`, `D` becomes `goblin_den`;
    /// anything else is open ground. Short rows are padded with open cells.
    pub fn from_ascii(map: &str) -> Self {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        let mut grid = Self::new(width as i32, rows.len() as i32, Self::DEFAULT_TILE_SIZE);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                match ch {
                    Self::OBSTACLE_CHAR => grid.add_tag(cell, "mountain"),
                    Self::STRUCTURE_CHAR => grid.add_tag(cell, "goblin_den"),
                    _ => {}
                }
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.cell_exists(cell) {
            Some((cell.y * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    /// Tags `cell`. Does nothing for cells outside the grid.
    pub fn add_tag(&mut self, cell: Cell, tag: impl Into<String>) {
        if let Some(idx) = self.index(cell) {
            self.cells[idx].insert(tag.into());
        }
    }

    pub fn remove_tag(&mut self, cell: Cell, tag: &str) -> bool {
        match self.index(cell) {
            Some(idx) => self.cells[idx].remove(tag),
            None => false,
        }
    }

    pub fn has_tag(&self, cell: Cell, tag: &str) -> bool {
        self.index(cell)
            .map_or(false, |idx| self.cells[idx].contains(tag))
    }

    /// Tags on `cell`, empty for cells outside the grid.
    pub fn tags(&self, cell: Cell) -> impl Iterator<Item = &str> {
        self.index(cell)
            .into_iter()
            .flat_map(move |idx| self.cells[idx].iter().map(String::as_str))
    }
}

impl Grid for TileGrid {
    fn cell_exists(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    fn cell_blocked(&self, cell: Cell, tags: &[String]) -> bool {
        match self.index(cell) {
            Some(idx) => tags.iter().any(|tag| self.cells[idx].contains(tag)),
            None => true,
        }
    }

    fn world_to_cell(&self, point: Vec2) -> Cell {
        Cell::new(
            (point.x / self.tile_size).floor() as i32,
            (point.y / self.tile_size).floor() as i32,
        )
    }

    fn cell_center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            (f64::from(cell.x) + 0.5) * self.tile_size,
            (f64::from(cell.y) + 0.5) * self.tile_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocking() -> Vec<String> {
        vec!["mountain".to_string()]
    }

    #[test]
    fn test_from_ascii_pads_short_rows() {
        let grid = TileGrid::from_ascii("...\n.\n");
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert!(grid.cell_open(Cell::new(2, 1), &blocking()));
    }

    #[test]
    fn test_out_of_bounds_cells() {
        let grid = TileGrid::new(2, 2, 32.0);
        assert!(!grid.cell_exists(Cell::new(-1, 0)));
        assert!(!grid.cell_exists(Cell::new(0, 2)));
        assert!(grid.cell_blocked(Cell::new(5, 5), &[]));
        assert_eq!(grid.tags(Cell::new(5, 5)).count(), 0);
    }

    #[test]
    fn test_tags() {
        let mut grid = TileGrid::new(2, 2, 32.0);
        let cell = Cell::new(1, 0);
        grid.add_tag(cell, "mountain");
        assert!(grid.has_tag(cell, "mountain"));
        assert!(grid.cell_blocked(cell, &blocking()));
        assert!(!grid.cell_blocked(cell, &["goblin_den".to_string()]));

        assert!(grid.remove_tag(cell, "mountain"));
        assert!(!grid.cell_blocked(cell, &blocking()));
    }

    #[test]
    fn test_world_cell_conversion() {
        let grid = TileGrid::new(4, 4, 32.0);
        assert_eq!(grid.world_to_cell(Vec2::new(40.0, 70.0)), Cell::new(1, 2));
        assert_eq!(grid.world_to_cell(Vec2::new(-1.0, 0.0)), Cell::new(-1, 0));
        assert_eq!(grid.cell_center(Cell::new(1, 2)), Vec2::new(48.0, 80.0));
    }
}
