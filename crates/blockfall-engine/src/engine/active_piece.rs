use crate::core::{Grid, Offset, PieceKind, Rotation, Shape};

/// The falling piece: kind, rotation index, and board offset.
///
/// A small state machine over `{kind, rotation, offset}`. Every transition
/// consults [`Grid::collides`] first; a rejected transition leaves the
/// state untouched and reports `false` — rejection is the expected-case
/// control flow here, not a fault.
///
/// Rotation uses the fixed four-state table at the piece's current offset.
/// There is deliberately no wall-kick search: a rotation that collides is
/// simply rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    rotation: Rotation,
    offset: Offset,
}

impl ActivePiece {
    /// A fresh piece at the spawn anchor, rotation 0.
    ///
    /// Construction does not test for collision; see [`Self::respawn`].
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::default(),
            offset: Offset::SPAWN,
        }
    }

    /// Replaces the piece with a fresh one at the spawn anchor and reports
    /// whether the spawn pose already collides.
    ///
    /// A `true` return is the game-over signal: the spawn never retries or
    /// nudges, and the collided pose is left in place for the caller to
    /// render.
    pub fn respawn(&mut self, kind: PieceKind, grid: &Grid) -> bool {
        *self = Self::new(kind);
        grid.collides(&self.shape(), self.offset)
    }

    /// Replaces the piece keeping an explicit rotation (the hold-swap path)
    /// and resets the offset to the spawn anchor.
    ///
    /// Returns the same collision signal as [`Self::respawn`].
    pub fn set_piece(&mut self, kind: PieceKind, rotation: Rotation, grid: &Grid) -> bool {
        *self = Self {
            kind,
            rotation,
            offset: Offset::SPAWN,
        };
        grid.collides(&self.shape(), self.offset)
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// The rotation-resolved shape matrix, by value.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.kind.shape(self.rotation)
    }

    pub fn shift_left(&mut self, grid: &Grid) -> bool {
        self.try_shift(-1, 0, grid)
    }

    pub fn shift_right(&mut self, grid: &Grid) -> bool {
        self.try_shift(1, 0, grid)
    }

    pub fn shift_down(&mut self, grid: &Grid) -> bool {
        self.try_shift(0, 1, grid)
    }

    fn try_shift(&mut self, dx: i32, dy: i32, grid: &Grid) -> bool {
        let target = self.offset.translated(dx, dy);
        if grid.collides(&self.shape(), target) {
            return false;
        }
        self.offset = target;
        true
    }

    /// Advances the rotation index by one state, tried at the same offset.
    ///
    /// On collision the rotation is rejected and the state is unchanged.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        let next = self.rotation.next();
        if grid.collides(&self.kind.shape(next), self.offset) {
            return false;
        }
        self.rotation = next;
        true
    }

    /// Where the piece would come to rest if dropped now.
    ///
    /// Simulates repeated down-moves from the current offset without
    /// mutating state; used by renderers for the ghost/landing preview.
    #[must_use]
    pub fn landing_offset(&self, grid: &Grid) -> Offset {
        let shape = self.shape();
        let mut at = self.offset;
        while !grid.collides(&shape, at.translated(0, 1)) {
            at = at.translated(0, 1);
        }
        at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BOARD_WIDTH, Cell};

    #[test]
    fn test_spawn_anchor_and_rotation() {
        let grid = Grid::EMPTY;
        let mut piece = ActivePiece::new(PieceKind::T);
        assert!(!piece.respawn(PieceKind::T, &grid));
        assert_eq!(piece.offset(), Offset::new(4, 2));
        assert_eq!(piece.rotation(), Rotation::default());
    }

    #[test]
    fn test_spawn_collision_reported_not_nudged() {
        let mut grid = Grid::EMPTY;
        // Block the spawn area: T's bar occupies row 3 at spawn.
        for x in 0..BOARD_WIDTH {
            grid.set_cell(x, 3, Cell::Block(PieceKind::L));
        }
        let mut piece = ActivePiece::new(PieceKind::T);
        assert!(piece.respawn(PieceKind::T, &grid));
        // The pose stays at the anchor even when collided.
        assert_eq!(piece.offset(), Offset::SPAWN);
    }

    #[test]
    fn test_shift_rejection_leaves_state_unchanged() {
        let grid = Grid::EMPTY;
        let mut piece = ActivePiece::new(PieceKind::O);
        // O occupies matrix columns 0-1; walk it into the left wall.
        assert!(piece.shift_left(&grid));
        assert!(piece.shift_left(&grid));
        assert!(piece.shift_left(&grid));
        assert!(piece.shift_left(&grid));
        assert_eq!(piece.offset(), Offset::new(0, 2));
        assert!(!piece.shift_left(&grid));
        assert_eq!(piece.offset(), Offset::new(0, 2));
    }

    #[test]
    fn test_shift_right_stops_at_wall() {
        let grid = Grid::EMPTY;
        let mut piece = ActivePiece::new(PieceKind::O);
        while piece.shift_right(&grid) {}
        // Last anchor where columns 0-1 of the matrix stay inside width 10.
        assert_eq!(piece.offset(), Offset::new(8, 2));
    }

    #[test]
    fn test_rotate_keeps_offset_and_cycles_back() {
        let grid = Grid::EMPTY;
        let mut piece = ActivePiece::new(PieceKind::S);
        // Move clear of the top so all four states fit.
        for _ in 0..5 {
            assert!(piece.shift_down(&grid));
        }
        let offset = piece.offset();
        let spawn_shape = piece.shape();
        for _ in 0..4 {
            assert!(piece.rotate(&grid));
            assert_eq!(piece.offset(), offset);
        }
        assert_eq!(piece.rotation(), Rotation::default());
        assert_eq!(piece.shape(), spawn_shape);
    }

    #[test]
    fn test_rotate_rejected_when_blocked() {
        let mut grid = Grid::EMPTY;
        let mut piece = ActivePiece::new(PieceKind::I);
        // Vertical I at spawn would occupy column 6, rows 2-5; block one.
        grid.set_cell(6, 4, Cell::Block(PieceKind::J));
        assert!(!piece.rotate(&grid));
        assert_eq!(piece.rotation(), Rotation::default());
        assert_eq!(piece.shape(), PieceKind::I.shape(Rotation::default()));
    }

    #[test]
    fn test_rotate_near_spawn_buffer_top() {
        // Regression test: rotating at the spawn anchor maps shape rows into
        // the hidden buffer; negative-row indexing must never occur.
        let grid = Grid::EMPTY;
        for kind in PieceKind::ALL {
            let mut piece = ActivePiece::new(kind);
            piece.rotate(&grid);
            piece.rotate(&grid);
            piece.rotate(&grid);
            piece.rotate(&grid);
        }
    }

    #[test]
    fn test_set_piece_preserves_rotation() {
        let grid = Grid::EMPTY;
        let mut piece = ActivePiece::new(PieceKind::L);
        assert!(!piece.set_piece(PieceKind::J, Rotation::new(2), &grid));
        assert_eq!(piece.kind(), PieceKind::J);
        assert_eq!(piece.rotation(), Rotation::new(2));
        assert_eq!(piece.offset(), Offset::SPAWN);
    }

    #[test]
    fn test_landing_offset_is_pure() {
        let grid = Grid::EMPTY;
        let piece = ActivePiece::new(PieceKind::O);
        let landing = piece.landing_offset(&grid);
        // O occupies matrix rows 0-1; it rests with its bottom row on 24.
        assert_eq!(landing, Offset::new(4, 23));
        // The query never mutates the piece.
        assert_eq!(piece.offset(), Offset::SPAWN);
    }

    #[test]
    fn test_landing_offset_stops_on_stack() {
        let mut grid = Grid::EMPTY;
        for x in 0..BOARD_WIDTH {
            grid.set_cell(x, 20, Cell::Block(PieceKind::Z));
        }
        let piece = ActivePiece::new(PieceKind::O);
        assert_eq!(piece.landing_offset(&grid), Offset::new(4, 18));
    }
}
