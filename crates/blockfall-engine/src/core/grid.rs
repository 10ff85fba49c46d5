use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH, HIDDEN_ROWS,
    piece::{PieceKind, Shape, occupied_cells},
};

/// A single cell of the board grid.
///
/// Empty cells render as color id `0`; locked cells carry the kind of the
/// piece that produced them (color ids `1..=7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Cell {
    /// Empty cell (no block).
    #[default]
    Empty,
    /// Locked block of a specific piece type.
    Block(PieceKind),
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric color id: `0` for empty, `1..=7` for locked blocks.
    #[must_use]
    pub const fn color_id(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Block(kind) => kind.color_id(),
        }
    }
}

/// Anchor position of a shape's top-left matrix cell within the grid.
///
/// Coordinates are signed so that candidate positions outside the grid can
/// be expressed and rejected by [`Grid::collides`] instead of being clamped
/// away before the collision test runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// Fixed spawn anchor: centered horizontally, at the top hidden row.
    pub const SPAWN: Self = Self::new(4, 2);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Result of a full-row sweep: the lines removed, the grid that remains,
/// and the score bonus earned.
///
/// Produced once per lock and consumed immediately by the caller; the bonus
/// is `50 × lines²`, rewarding multi-line clears superlinearly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearOutcome {
    pub lines_removed: usize,
    pub grid: Grid,
    pub score_bonus: usize,
}

/// The board grid: `10 × 25` cells, rows 0–1 hidden above the play-field.
///
/// Owned exclusively by the board engine and only ever replaced wholesale
/// through [`Grid::merged`] and [`Grid::sweep_full_rows`]; all operations
/// treat `self` as immutable and return new data, so callers never observe
/// partial mutation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Grid {
    rows: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const EMPTY: Self = Self {
        rows: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
    };

    /// Builds a grid from explicit rows, hidden rows first.
    #[must_use]
    pub const fn from_rows(rows: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT]) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y][x]
    }

    /// All rows, including the hidden spawn buffer.
    #[must_use]
    pub const fn rows(&self) -> &[[Cell; BOARD_WIDTH]; BOARD_HEIGHT] {
        &self.rows
    }

    /// Rows of the visible play-field, skipping the hidden spawn buffer.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows[HIDDEN_ROWS..].iter()
    }

    /// Single source of truth for every collision decision (movement,
    /// rotation, spawn, and hold-swap).
    ///
    /// Returns `true` iff any occupied cell of `shape`, anchored at `at`,
    /// falls outside the grid bounds or lands on a non-empty cell. Bounds
    /// are checked on all four sides; a shape row above row 0 is a
    /// collision, same as one past the bottom.
    #[must_use]
    pub fn collides(&self, shape: &Shape, at: Offset) -> bool {
        occupied_cells(shape).any(|(dx, dy)| match cell_position(at, dx, dy) {
            Some((x, y)) => !self.rows[y][x].is_empty(),
            None => true,
        })
    }

    /// Returns a new grid with the shape's occupied cells written in.
    ///
    /// Used exactly once per lock; the pose must already have passed
    /// [`Grid::collides`].
    #[must_use]
    pub fn merged(&self, shape: &Shape, at: Offset) -> Self {
        debug_assert!(!self.collides(shape, at));
        let mut merged = self.clone();
        for (dx, dy) in occupied_cells(shape) {
            if let Some((x, y)) = cell_position(at, dx, dy) {
                merged.rows[y][x] = shape[dy][dx];
            }
        }
        merged
    }

    /// Scans for full rows and produces the grid that remains.
    ///
    /// Surviving rows keep their relative order and shift down to fill the
    /// gaps; fresh empty rows enter at the top. With no full rows the
    /// returned grid equals `self` and the bonus is 0.
    #[must_use]
    pub fn sweep_full_rows(&self) -> ClearOutcome {
        let mut rows = [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        let mut write = BOARD_HEIGHT;
        let mut removed = 0;
        for row in self.rows.iter().rev() {
            if row.iter().all(|cell| !cell.is_empty()) {
                removed += 1;
            } else {
                write -= 1;
                rows[write] = *row;
            }
        }
        ClearOutcome {
            lines_removed: removed,
            grid: Self { rows },
            score_bonus: 50 * removed * removed,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }
}

/// Maps a shape-matrix cell to grid coordinates, or `None` when the cell
/// falls outside the grid on any side.
fn cell_position(at: Offset, dx: usize, dy: usize) -> Option<(usize, usize)> {
    let x = at.x.checked_add(i32::try_from(dx).ok()?)?;
    let y = at.y.checked_add(i32::try_from(dy).ok()?)?;
    let x = usize::try_from(x).ok()?;
    let y = usize::try_from(y).ok()?;
    (x < BOARD_WIDTH && y < BOARD_HEIGHT).then_some((x, y))
}
