use std::collections::VecDeque;

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// How many upcoming pieces can be peeked without consuming.
pub const SUPPLY_LOOKAHEAD: usize = 3;

/// Fair, drought-free piece sequencing using the 7-bag algorithm.
///
/// # 7-Bag System
///
/// A working bag holds one instance of each of the 7 piece types. It is
/// refilled and reshuffled (uniform random permutation) whenever it runs
/// empty, so the draw sequence is a concatenation of 7-type permutations:
/// every contiguous block aligned to a bag boundary contains each type
/// exactly once.
///
/// # Lookahead Queue
///
/// A FIFO queue in front of the bag is kept topped up to
/// [`SUPPLY_LOOKAHEAD`] entries by draining the bag one piece at a time,
/// preserving bag order. [`PieceSupply::pop`] consumes the head;
/// [`PieceSupply::peek`] and friends read ahead without consuming.
///
/// # Example
///
/// ```
/// use blockfall_engine::PieceSupply;
///
/// let mut supply = PieceSupply::new();
///
/// let upcoming = supply.peek();
/// assert_eq!(supply.pop(), upcoming);
/// ```
#[derive(Debug, Clone)]
pub struct PieceSupply {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
    queue: VecDeque<PieceKind>,
}

impl Default for PieceSupply {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece sequencing.
///
/// A 128-bit (16-byte) seed for the supply's random number generator. The
/// same seed produces the same piece sequence, enabling reproducible
/// gameplay for debugging and deterministic tests.
///
/// Serializes as a 32-character lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplySeed([u8; 16]);

impl SupplySeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Serialize for SupplySeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        serializer.serialize_str(&format!("{num:032x}"))
    }
}

impl<'de> Deserialize<'de> for SupplySeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex seed: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex seed: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random `SupplySeed` values with `rng.random()`.
impl Distribution<SupplySeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SupplySeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SupplySeed(seed)
    }
}

impl PieceSupply {
    /// Creates a new supply with a random seed.
    ///
    /// The lookahead queue is filled immediately. For deterministic
    /// sequencing, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: SupplySeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            bag: VecDeque::with_capacity(PieceKind::LEN),
            queue: VecDeque::with_capacity(SUPPLY_LOOKAHEAD + 1),
        };
        this.top_up();
        this
    }

    /// Tops the lookahead queue back up from the bag, refilling the bag with
    /// a fresh shuffled set of 7 whenever it runs empty.
    ///
    /// Bag order is preserved as pieces move into the queue, so the queue is
    /// always a window onto the concatenated bag permutations. The queue
    /// holds at least [`SUPPLY_LOOKAHEAD`] entries after every call.
    fn top_up(&mut self) {
        while self.queue.len() < SUPPLY_LOOKAHEAD {
            if self.bag.is_empty() {
                let mut refill = PieceKind::ALL;
                refill.shuffle(&mut self.rng);
                self.bag.extend(refill);
            }
            let piece = self.bag.pop_front().expect("bag was just refilled");
            self.queue.push_back(piece);
        }
    }

    /// Consumes and returns the next piece, then refills the lookahead.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (cannot happen; every constructor and
    /// `pop` leaves it topped up).
    pub fn pop(&mut self) -> PieceKind {
        let piece = self.queue.pop_front().expect("supply queue is kept topped up");
        self.top_up();
        piece
    }

    /// The next piece, without consuming it.
    #[must_use]
    pub fn peek(&self) -> PieceKind {
        self.queue[0]
    }

    /// The piece after the next, without consuming it.
    #[must_use]
    pub fn peek_second(&self) -> PieceKind {
        self.queue[1]
    }

    /// The third upcoming piece, without consuming it.
    #[must_use]
    pub fn peek_third(&self) -> PieceKind {
        self.queue[2]
    }

    /// The three upcoming pieces, in draw order.
    #[must_use]
    pub fn preview(&self) -> ArrayVec<PieceKind, SUPPLY_LOOKAHEAD> {
        self.queue.iter().copied().take(SUPPLY_LOOKAHEAD).collect()
    }
}
