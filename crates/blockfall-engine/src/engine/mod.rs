//! Game engine logic and state management.
//!
//! This module provides the stateful machinery that drives the pure data
//! structures in [`core`](crate::core) through a game:
//!
//! - [`ActivePiece`] - the falling piece's kind, rotation, and offset
//! - [`PieceSupply`] - 7-bag piece sequencing with 3-piece lookahead
//! - [`Board`] - owns the grid and orchestrates spawn, move, lock, clear
//! - [`Progression`] - level and drop-speed curve driven by lines cleared
//! - [`GameSession`] - ties board, scoring, progression, and hold together
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`]; the first piece spawns immediately
//! 2. The driver moves, rotates, and holds the falling piece
//! 3. A down-move that fails grounds the piece: it merges into the grid,
//!    full rows are swept, and the next piece spawns
//! 4. A spawn that collides is the game-over signal; the session reports it
//!    and ignores further ticks
//!
//! The engine is single-threaded and fully synchronous: every call either
//! completes and returns or has no effect. Pacing is the caller's job; the
//! session only reports the current drop interval.
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{DropSource, GameSession};
//!
//! let mut session = GameSession::new();
//!
//! session.shift_left();
//! session.rotate();
//!
//! let outcome = session.step_down(DropSource::Player);
//! if outcome.moved {
//!     assert_eq!(session.score(), 1);
//! }
//! ```

pub use self::{active_piece::*, board::*, progression::*, session::*, supply::*};

mod active_piece;
mod board;
mod progression;
mod session;
mod supply;
