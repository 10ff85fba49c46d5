use arrayvec::ArrayVec;

use crate::core::{ClearOutcome, Grid, Offset, PieceKind, Rotation, Shape};

use super::{
    active_piece::ActivePiece,
    supply::{PieceSupply, SUPPLY_LOOKAHEAD, SupplySeed},
};

/// Renderer-facing bundle: the falling piece's resolved shape and offset,
/// plus the next piece's shape at rotation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveView {
    pub shape: Shape,
    pub offset: Offset,
    pub next_shape: Shape,
}

/// Owns the grid, the falling piece, and the piece supply, and orchestrates
/// spawn → move → lock → clear → respawn.
///
/// The board never self-terminates: a spawn that collides is reported as
/// `true` and the caller decides what game-over means. Collision checks all
/// go through [`Grid::collides`]; the grid itself is only replaced through
/// [`Board::merge_active`] and [`Board::sweep_rows`].
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    active: ActivePiece,
    supply: PieceSupply,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A fresh board with the first piece already spawned.
    #[must_use]
    pub fn new() -> Self {
        Self::with_supply(PieceSupply::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: SupplySeed) -> Self {
        Self::with_supply(PieceSupply::with_seed(seed))
    }

    fn with_supply(mut supply: PieceSupply) -> Self {
        let active = ActivePiece::new(supply.pop());
        Self {
            grid: Grid::EMPTY,
            active,
            supply,
        }
    }

    /// Draws the next piece from the supply and spawns it.
    ///
    /// Returns `true` on immediate collision — the game-over signal.
    pub fn spawn_from_supply(&mut self) -> bool {
        let kind = self.supply.pop();
        self.active.respawn(kind, &self.grid)
    }

    /// Replaces the falling piece with an explicit kind and rotation at the
    /// spawn anchor (the hold-swap path). Returns the spawn collision
    /// signal, like [`Self::spawn_from_supply`].
    pub fn set_active(&mut self, kind: PieceKind, rotation: Rotation) -> bool {
        self.active.set_piece(kind, rotation, &self.grid)
    }

    pub fn shift_down(&mut self) -> bool {
        self.active.shift_down(&self.grid)
    }

    pub fn shift_left(&mut self) -> bool {
        self.active.shift_left(&self.grid)
    }

    pub fn shift_right(&mut self) -> bool {
        self.active.shift_right(&self.grid)
    }

    pub fn rotate(&mut self) -> bool {
        self.active.rotate(&self.grid)
    }

    /// Locks the falling piece into the grid. Must be called before
    /// [`Self::sweep_rows`].
    pub fn merge_active(&mut self) {
        self.grid = self.grid.merged(&self.active.shape(), self.active.offset());
    }

    /// Sweeps full rows, replaces the owned grid, and returns the outcome
    /// for the caller to consume (score bonus, lines for progression).
    pub fn sweep_rows(&mut self) -> ClearOutcome {
        let outcome = self.grid.sweep_full_rows();
        self.grid = outcome.grid.clone();
        outcome
    }

    /// Empties the grid and spawns a fresh piece from the supply.
    pub fn reset(&mut self) {
        self.grid = Grid::EMPTY;
        // A spawn on an empty grid cannot collide.
        let collided = self.spawn_from_supply();
        debug_assert!(!collided);
    }

    /// Snapshot of the grid, by value.
    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid.clone()
    }

    /// Read access to the falling piece's pose.
    #[must_use]
    pub fn active(&self) -> &ActivePiece {
        &self.active
    }

    /// The current-view bundle consumed by renderers.
    #[must_use]
    pub fn view(&self) -> ActiveView {
        ActiveView {
            shape: self.active.shape(),
            offset: self.active.offset(),
            next_shape: self.supply.peek().shape(Rotation::default()),
        }
    }

    /// Shape of the second upcoming piece, at rotation 0.
    #[must_use]
    pub fn second_next_shape(&self) -> Shape {
        self.supply.peek_second().shape(Rotation::default())
    }

    /// Shape of the third upcoming piece, at rotation 0.
    #[must_use]
    pub fn third_next_shape(&self) -> Shape {
        self.supply.peek_third().shape(Rotation::default())
    }

    /// The three upcoming piece kinds, in draw order.
    #[must_use]
    pub fn preview(&self) -> ArrayVec<PieceKind, SUPPLY_LOOKAHEAD> {
        self.supply.preview()
    }

    /// Ghost/landing preview for the falling piece; a pure read.
    #[must_use]
    pub fn landing_offset(&self) -> Offset {
        self.active.landing_offset(&self.grid)
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
