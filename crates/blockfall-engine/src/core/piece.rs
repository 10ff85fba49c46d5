use serde::{Deserialize, Serialize};

use super::grid::Cell;

/// Enum representing the type of piece.
///
/// A piece value carries no position or orientation; rotation state is
/// tracked externally by the active-piece controller so that piece values
/// stay immutable and cheaply comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece types, in canonical order.
    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
        Self::T,
    ];

    /// Returns the color id stored in locked grid cells for this kind.
    ///
    /// Ids are `1..=7`; `0` is reserved for empty cells.
    #[must_use]
    pub const fn color_id(self) -> u8 {
        self as u8 + 1
    }

    /// Returns a copy of this kind's shape matrix at the given rotation.
    #[must_use]
    pub fn shape(self, rotation: Rotation) -> Shape {
        PIECE_SHAPES[self as usize][rotation.index()]
    }

    /// Height of the occupied region of the shape, measured from the top of
    /// the 4×4 matrix through the bottom-most occupied row.
    #[must_use]
    pub fn extent_height(self, rotation: Rotation) -> usize {
        occupied_cells(&self.shape(rotation))
            .map(|(_, dy)| dy + 1)
            .max()
            .unwrap_or(0)
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Rotation state of a piece.
///
/// One of four states: `0` (spawn), `1` (90° clockwise), `2` (180°),
/// `3` (270° clockwise). [`Rotation::next`] wraps around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rotation(u8);

impl Rotation {
    /// Creates a rotation from an index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`; an out-of-range index is a programming error
    /// on the caller's side, not a runtime condition the engine negotiates.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!(index < 4);
        Self(index)
    }

    /// The next rotation state, 90° clockwise.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Piece shape represented as a 4×4 cell matrix.
///
/// One `Shape` is one rotation state of one piece type. Shapes are handed
/// out by value; the precomputed catalog is never aliased mutably.
pub type Shape = [[Cell; 4]; 4];

/// Iterates the occupied cells of a shape as `(dx, dy)` matrix coordinates.
pub fn occupied_cells(shape: &Shape) -> impl Iterator<Item = (usize, usize)> + '_ {
    shape.iter().enumerate().flat_map(|(dy, row)| {
        row.iter()
            .enumerate()
            .filter_map(move |(dx, &cell)| if cell.is_empty() { None } else { Some((dx, dy)) })
    })
}

/// Generates all 4 rotation states of a shape by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for O)
/// * `shape` - Initial shape at the spawn rotation
const fn shape_rotations(size: usize, shape: &Shape) -> [Shape; 4] {
    let mut rotates = [*shape; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_shape = [[Cell::Empty; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                new_shape[y][x] = rotates[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_shape;
        i += 1;
    }
    rotates
}

const PIECE_SHAPES: [[Shape; 4]; PieceKind::LEN] = {
    use Cell::Empty as E;
    const I: Cell = Cell::Block(PieceKind::I);
    const O: Cell = Cell::Block(PieceKind::O);
    const S: Cell = Cell::Block(PieceKind::S);
    const Z: Cell = Cell::Block(PieceKind::Z);
    const J: Cell = Cell::Block(PieceKind::J);
    const L: Cell = Cell::Block(PieceKind::L);
    const T: Cell = Cell::Block(PieceKind::T);
    const EEEE: [Cell; 4] = [E; 4];
    [
        // I-piece
        shape_rotations(4, &[EEEE, [I, I, I, I], EEEE, EEEE]),
        // O-piece
        shape_rotations(2, &[[O, O, E, E], [O, O, E, E], EEEE, EEEE]),
        // S-piece
        shape_rotations(3, &[[E, S, S, E], [S, S, E, E], EEEE, EEEE]),
        // Z-piece
        shape_rotations(3, &[[Z, Z, E, E], [E, Z, Z, E], EEEE, EEEE]),
        // J-piece
        shape_rotations(3, &[[J, E, E, E], [J, J, J, E], EEEE, EEEE]),
        // L-piece
        shape_rotations(3, &[[E, E, L, E], [L, L, L, E], EEEE, EEEE]),
        // T-piece
        shape_rotations(3, &[[E, T, E, E], [T, T, T, E], EEEE, EEEE]),
    ]
};
