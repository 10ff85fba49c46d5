use std::time::Duration;

const LINES_PER_LEVEL: usize = 10;
const INITIAL_DROP_INTERVAL: Duration = Duration::from_millis(1000);
const MIN_DROP_INTERVAL_MS: u64 = 10;

/// Score counter, mutated by addition only (monotonic unless reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score(usize);

impl Score {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn add(&mut self, delta: usize) {
        self.0 += delta;
    }

    pub const fn reset(&mut self) {
        self.0 = 0;
    }

    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

/// Snapshot of the progression state after feeding in cleared lines.
///
/// `level_increased` is `true` only on the call where the level actually
/// rose; that is the caller's cue to reconfigure its tick cadence to the
/// new `drop_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpdate {
    pub level: usize,
    pub total_lines: usize,
    pub drop_interval: Duration,
    pub level_increased: bool,
}

/// Level and drop-speed progression driven by lines cleared.
///
/// The level is a pure function of total lines: `total / 10 + 1`. The drop
/// interval follows the guideline gravity curve
/// `(0.8 - (level - 1) * 0.01) ^ (level - 1)` seconds, truncated to whole
/// milliseconds and clamped to a 10 ms floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    level: usize,
    total_lines: usize,
    drop_interval: Duration,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: 1,
            total_lines: 0,
            drop_interval: INITIAL_DROP_INTERVAL,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Accumulates cleared lines and recomputes the level.
    ///
    /// A non-positive count is a no-op reporting the current state. The
    /// drop interval is recomputed only when the level actually increased.
    pub fn add_lines_cleared(&mut self, lines: usize) -> LevelUpdate {
        if lines == 0 {
            return self.snapshot(false);
        }
        self.total_lines += lines;
        let level = level_for(self.total_lines);
        let mut level_increased = false;
        if level > self.level {
            self.level = level;
            self.drop_interval = drop_interval_for(level);
            level_increased = true;
        }
        self.snapshot(level_increased)
    }

    const fn snapshot(&self, level_increased: bool) -> LevelUpdate {
        LevelUpdate {
            level: self.level,
            total_lines: self.total_lines,
            drop_interval: self.drop_interval,
            level_increased,
        }
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    #[must_use]
    pub const fn drop_interval(&self) -> Duration {
        self.drop_interval
    }
}

const fn level_for(total_lines: usize) -> usize {
    total_lines / LINES_PER_LEVEL + 1
}

/// Guideline gravity curve; a sharply accelerating speed-up per level.
///
/// Milliseconds are truncated, not rounded, matching the reference curve
/// exactly; at very high levels the base goes non-positive and the clamp
/// takes over.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn drop_interval_for(level: usize) -> Duration {
    let exponent = level - 1;
    let seconds = (0.8 - exponent as f64 * 0.01).powi(exponent as i32);
    let millis = (seconds * 1000.0) as u64;
    Duration::from_millis(millis.max(MIN_DROP_INTERVAL_MS))
}
