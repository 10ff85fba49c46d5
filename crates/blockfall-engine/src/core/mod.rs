pub use self::{grid::*, piece::*};

pub(crate) mod grid;
pub(crate) mod piece;

/// Board width in cells.
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells, including the hidden spawn rows at the top.
pub const BOARD_HEIGHT: usize = 25;

/// Rows above the visible play-field used as a spawn buffer.
///
/// Newly spawned pieces may extend into these rows before locking; renderers
/// skip them via [`Grid::visible_rows`](grid::Grid::visible_rows).
pub const HIDDEN_ROWS: usize = 2;
