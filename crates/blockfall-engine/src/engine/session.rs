use std::time::Duration;

use crate::core::{Grid, Offset, PieceKind, Rotation, Shape};

use super::{
    board::{ActiveView, Board},
    progression::{Progression, Score},
    supply::SupplySeed,
};

/// Points for a successful player-initiated down-move.
const PLAYER_DOWN_POINTS: usize = 1;
/// Points per row descended during a hard drop.
const HARD_DROP_POINTS_PER_ROW: usize = 2;

/// Whether a down-move came from gravity or from the player.
///
/// Only player-initiated down-moves score; gravity is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSource {
    Gravity,
    Player,
}

/// Whether the session is still accepting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GamePhase {
    Playing,
    GameOver,
}

/// A held piece: kind plus the rotation it was holding when set aside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldPiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
}

/// What a down-move (or hard drop) did, consumed immediately by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOutcome {
    /// The piece descended at least one row.
    pub moved: bool,
    /// The piece grounded: it was merged and rows were swept.
    pub locked: bool,
    /// Lines removed by the sweep (0 when `locked` is `false`).
    pub lines_cleared: usize,
    /// The respawn after the lock collided; the session is over.
    pub game_over: bool,
}

impl DropOutcome {
    const fn moved() -> Self {
        Self {
            moved: true,
            locked: false,
            lines_cleared: 0,
            game_over: false,
        }
    }

    const fn ignored(game_over: bool) -> Self {
        Self {
            moved: false,
            locked: false,
            lines_cleared: 0,
            game_over,
        }
    }
}

/// Top-level game state machine: board, scoring, progression, and hold.
///
/// The driver (a timer tick or an input handler) calls the command
/// operations; results flow back as plain values for renderers to consume.
/// The session is single-threaded and fully synchronous — callers serialize
/// their own ticks and key events.
///
/// # Hold
///
/// One piece (with its rotation) can be set aside per lock. The first hold
/// stores the falling piece and spawns the next one; later holds swap with
/// the stored piece at the spawn anchor. The gate re-opens exactly once per
/// lock event, never mid-fall.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    score: Score,
    progression: Progression,
    held: Option<HeldPiece>,
    can_hold: bool,
    phase: GamePhase,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// A fresh session with the first piece already spawned.
    #[must_use]
    pub fn new() -> Self {
        Self::with_board(Board::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: SupplySeed) -> Self {
        Self::with_board(Board::with_seed(seed))
    }

    fn with_board(board: Board) -> Self {
        Self {
            board,
            score: Score::new(),
            progression: Progression::new(),
            held: None,
            can_hold: true,
            phase: GamePhase::Playing,
        }
    }

    /// Resets everything: grid, score, progression, hold slot, and phase,
    /// then spawns a fresh piece.
    pub fn new_game(&mut self) {
        self.board.reset();
        self.score.reset();
        self.progression.reset();
        self.held = None;
        self.can_hold = true;
        self.phase = GamePhase::Playing;
    }

    /// One tick of the game loop: attempt a down-move, locking on failure.
    ///
    /// A successful player-initiated move scores one point. A failed move
    /// grounds the piece: merge, sweep (bonus scored, lines fed into
    /// progression), respawn. A colliding respawn ends the session; once
    /// over, further ticks are no-ops.
    pub fn step_down(&mut self, source: DropSource) -> DropOutcome {
        if self.phase.is_game_over() {
            return DropOutcome::ignored(true);
        }
        if self.board.shift_down() {
            if source == DropSource::Player {
                self.score.add(PLAYER_DOWN_POINTS);
            }
            return DropOutcome::moved();
        }
        self.lock_active()
    }

    /// Drops the piece straight to its landing position and locks it,
    /// scoring per row descended.
    pub fn hard_drop(&mut self) -> DropOutcome {
        if self.phase.is_game_over() {
            return DropOutcome::ignored(true);
        }
        let mut rows = 0;
        while self.board.shift_down() {
            rows += 1;
        }
        self.score.add(HARD_DROP_POINTS_PER_ROW * rows);
        let mut outcome = self.lock_active();
        outcome.moved = rows > 0;
        outcome
    }

    /// Merge → sweep → respawn; the lock half of the tick contract.
    fn lock_active(&mut self) -> DropOutcome {
        self.board.merge_active();
        let outcome = self.board.sweep_rows();
        if outcome.lines_removed > 0 {
            self.score.add(outcome.score_bonus);
            self.progression.add_lines_cleared(outcome.lines_removed);
        }
        let game_over = self.board.spawn_from_supply();
        if game_over {
            self.phase = GamePhase::GameOver;
        } else {
            self.can_hold = true;
        }
        DropOutcome {
            moved: false,
            locked: true,
            lines_cleared: outcome.lines_removed,
            game_over,
        }
    }

    pub fn shift_left(&mut self) -> bool {
        self.phase.is_playing() && self.board.shift_left()
    }

    pub fn shift_right(&mut self) -> bool {
        self.phase.is_playing() && self.board.shift_right()
    }

    pub fn rotate(&mut self) -> bool {
        self.phase.is_playing() && self.board.rotate()
    }

    /// Sets the falling piece aside, swapping with a previously held piece
    /// if one exists.
    ///
    /// Returns `false` without any effect when the gate is closed (already
    /// held since the last lock) or the session is over. A swap whose spawn
    /// pose collides is terminal, same as a colliding respawn.
    pub fn hold(&mut self) -> bool {
        if self.phase.is_game_over() || !self.can_hold {
            return false;
        }
        let current = HeldPiece {
            kind: self.board.active().kind(),
            rotation: self.board.active().rotation(),
        };
        let collided = match self.held.replace(current) {
            Some(previous) => self.board.set_active(previous.kind, previous.rotation),
            None => self.board.spawn_from_supply(),
        };
        self.can_hold = false;
        if collided {
            self.phase = GamePhase::GameOver;
        }
        true
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<HeldPiece> {
        self.held
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Snapshot of the grid, by value.
    #[must_use]
    pub fn grid(&self) -> Grid {
        self.board.grid()
    }

    /// The current-view bundle consumed by renderers.
    #[must_use]
    pub fn view(&self) -> ActiveView {
        self.board.view()
    }

    /// Shape of the second upcoming piece, at rotation 0.
    #[must_use]
    pub fn second_next_shape(&self) -> Shape {
        self.board.second_next_shape()
    }

    /// Shape of the third upcoming piece, at rotation 0.
    #[must_use]
    pub fn third_next_shape(&self) -> Shape {
        self.board.third_next_shape()
    }

    /// Ghost/landing preview for the falling piece; a pure read.
    #[must_use]
    pub fn landing_offset(&self) -> Offset {
        self.board.landing_offset()
    }

    /// Current score, for UI binding and for the embedder to persist.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score.value()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.progression.level()
    }

    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.progression.total_lines()
    }

    /// Current drop interval; the caller paces its gravity ticks with this.
    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        self.progression.drop_interval()
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Cell};

    /// Fills row `y` except for the columns in `gaps`.
    fn prefill_row(session: &mut GameSession, y: usize, gaps: &[usize]) {
        for x in 0..BOARD_WIDTH {
            if !gaps.contains(&x) {
                session
                    .board_mut()
                    .grid_mut()
                    .set_cell(x, y, Cell::Block(PieceKind::J));
            }
        }
    }

    /// Steps the session with gravity until the current piece locks.
    fn drop_until_lock(session: &mut GameSession) -> DropOutcome {
        loop {
            let outcome = session.step_down(DropSource::Gravity);
            if outcome.locked || outcome.game_over {
                return outcome;
            }
        }
    }

    #[test]
    fn test_player_down_scores_gravity_does_not() {
        let mut session = GameSession::new();
        assert!(session.step_down(DropSource::Gravity).moved);
        assert_eq!(session.score(), 0);
        assert!(session.step_down(DropSource::Player).moved);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_grounded_player_down_does_not_score() {
        let mut session = GameSession::new();
        while session.step_down(DropSource::Gravity).moved {}
        // The piece locked; the failed move itself scored nothing.
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_lock_with_no_clear_reports_zero_lines() {
        let mut session = GameSession::new();
        let outcome = drop_until_lock(&mut session);
        assert!(outcome.locked);
        assert_eq!(outcome.lines_cleared, 0);
        assert!(!outcome.game_over);
        assert_eq!(session.total_lines(), 0);
    }

    #[test]
    fn test_single_line_clear_scores_fifty() {
        let mut session = GameSession::new();
        // Cycle new games until an I piece spawns; the bag guarantees one
        // within seven draws.
        while session.view().shape != PieceKind::I.shape(Rotation::default()) {
            session.new_game();
        }
        // Row 24 full except column 5; a vertical I dropped there completes
        // the row with its bottom cell.
        prefill_row(&mut session, 24, &[5]);
        assert!(session.rotate());
        // Vertical I occupies grid column 6 at the spawn anchor; one shift
        // left lands it in column 5.
        assert!(session.shift_left());
        let outcome = session.hard_drop();
        assert!(outcome.locked);
        assert_eq!(outcome.lines_cleared, 1);
        assert_eq!(session.total_lines(), 1);
        // The I descends from anchor y=2 to y=21 (bottom cell on row 24):
        // 19 rows at 2 points each, plus the 50-point single-line bonus.
        assert_eq!(session.score(), 50 + 2 * 19);
    }

    #[test]
    fn test_hard_drop_scores_two_per_row() {
        let mut session = GameSession::new();
        let spawn_y = session.view().offset.y;
        let landing_y = session.landing_offset().y;
        let rows = usize::try_from(landing_y - spawn_y).unwrap();
        let outcome = session.hard_drop();
        assert!(outcome.locked);
        assert_eq!(session.score(), 2 * rows);
    }

    #[test]
    fn test_hold_gate_reopens_on_lock() {
        let mut session = GameSession::new();
        let first_kind = session.board_mut().active().kind();

        // First hold stores the piece and spawns a new one.
        assert!(session.hold());
        let held = session.held_piece().unwrap();
        assert_eq!(held.kind, first_kind);

        // Gate is closed until the next lock.
        assert!(!session.hold());
        assert!(!session.can_hold());

        let outcome = drop_until_lock(&mut session);
        assert!(outcome.locked && !outcome.game_over);
        assert!(session.can_hold());

        // Second hold swaps with the stored piece.
        let falling = session.board_mut().active().kind();
        assert!(session.hold());
        assert_eq!(session.board_mut().active().kind(), first_kind);
        assert_eq!(session.held_piece().unwrap().kind, falling);
    }

    #[test]
    fn test_hold_preserves_rotation_across_swap() {
        let mut session = GameSession::new();
        // Rotate clear of the spawn buffer first so the rotation sticks.
        session.step_down(DropSource::Gravity);
        session.step_down(DropSource::Gravity);
        let rotated = session.rotate();
        let stored_rotation = session.board_mut().active().rotation();
        assert_eq!(rotated, stored_rotation != Rotation::default());

        assert!(session.hold());
        drop_until_lock(&mut session);
        assert!(session.hold());
        // The swap restores the rotation the piece was holding.
        assert_eq!(session.board_mut().active().rotation(), stored_rotation);
        assert_eq!(session.board_mut().active().offset(), Offset::SPAWN);
    }

    #[test]
    fn test_game_over_suspends_ticks() {
        let mut session = GameSession::new();
        // Stack everything below the spawn buffer except one column. The
        // falling piece grounds at the anchor, merges into rows 2-3, and the
        // respawn collides with it immediately.
        for y in 4..BOARD_HEIGHT {
            prefill_row(&mut session, y, &[0]);
        }
        let outcome = drop_until_lock(&mut session);
        assert!(outcome.game_over);
        assert!(session.phase().is_game_over());

        // Everything is a no-op now.
        assert!(session.step_down(DropSource::Player).game_over);
        assert!(!session.shift_left());
        assert!(!session.shift_right());
        assert!(!session.rotate());
        assert!(!session.hold());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_new_game_resets_everything() {
        let mut session = GameSession::new();
        session.hold();
        session.hard_drop();
        session.new_game();
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.total_lines(), 0);
        assert_eq!(session.held_piece(), None);
        assert!(session.can_hold());
        assert!(session.phase().is_playing());
        assert_eq!(session.grid(), Grid::EMPTY);
    }

    #[test]
    fn test_clear_feeds_progression() {
        let mut session = GameSession::new();
        let initial_interval = session.drop_interval();

        // Fill row 24 except the columns under the falling piece's landing
        // footprint, so whatever piece spawned completes the row on lock.
        let landing = session.landing_offset();
        let shape = session.view().shape;
        let mut gaps = Vec::new();
        for (dx, dy) in crate::core::occupied_cells(&shape) {
            let x = usize::try_from(landing.x + i32::try_from(dx).unwrap()).unwrap();
            let y = usize::try_from(landing.y + i32::try_from(dy).unwrap()).unwrap();
            if y == 24 {
                gaps.push(x);
            }
        }
        // On an empty board every piece rests its bottom cells on row 24.
        assert!(!gaps.is_empty());
        prefill_row(&mut session, 24, &gaps);

        let outcome = session.hard_drop();
        assert_eq!(outcome.lines_cleared, 1);
        assert_eq!(session.total_lines(), 1);
        assert_eq!(session.level(), 1);
        assert_eq!(session.drop_interval(), initial_interval);
    }
}
