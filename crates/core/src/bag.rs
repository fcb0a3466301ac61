//! Bag module - bounded-repetition piece sequencing
//!
//! Each queue is a shuffled permutation of the seven kinds. Two queues are
//! kept: the primary one is drawn from, the secondary one is promoted when the
//! primary runs dry and a freshly shuffled queue takes its place. Between them
//! there are always at least seven kinds queued, so a preview of the next five
//! pieces never needs to look past the stored state.
//!
//! Also provides a simple LCG so that sequences are reproducible from a seed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::{PieceKind, BAG_SIZE};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate an unbiased value in range [0, max)
    ///
    /// Draws falling in the incomplete top bucket are rejected, so every
    /// value is equally likely.
    pub fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0);
        let zone = u32::MAX - (u32::MAX % max);
        loop {
            // The low bits of an LCG cycle with short periods; use the high half.
            let v = self.next_u32();
            let v = v.rotate_right(16);
            if v < zone {
                return v % max;
            }
        }
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state (for saving and restoring)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Two-queue bag randomizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bag {
    primary: VecDeque<PieceKind>,
    secondary: VecDeque<PieceKind>,
    rng: SimpleRng,
}

impl Bag {
    /// Create a bag with both queues freshly shuffled
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let primary = Self::shuffled(&mut rng);
        let secondary = Self::shuffled(&mut rng);
        Self {
            primary,
            secondary,
            rng,
        }
    }

    /// Rebuild a bag from saved queues and RNG state
    ///
    /// Returns `None` if the queues would break the seven-kinds-queued
    /// invariant: the secondary queue must be a full permutation and the
    /// primary queue must be non-empty with no repeats.
    pub fn from_parts(
        primary: Vec<PieceKind>,
        secondary: Vec<PieceKind>,
        rng: SimpleRng,
    ) -> Option<Self> {
        if primary.is_empty() || !Self::distinct(&primary) {
            return None;
        }
        if secondary.len() != BAG_SIZE || !Self::distinct(&secondary) {
            return None;
        }
        Some(Self {
            primary: primary.into(),
            secondary: secondary.into(),
            rng,
        })
    }

    fn distinct(kinds: &[PieceKind]) -> bool {
        kinds
            .iter()
            .enumerate()
            .all(|(i, k)| !kinds[i + 1..].contains(k))
    }

    fn shuffled(rng: &mut SimpleRng) -> VecDeque<PieceKind> {
        let mut kinds = PieceKind::ALL;
        rng.shuffle(&mut kinds);
        kinds.into_iter().collect()
    }

    /// Draw the next piece
    pub fn pick(&mut self) -> PieceKind {
        let Some(kind) = self.primary.pop_front() else {
            unreachable!("primary queue is refilled before it can run dry");
        };

        if self.primary.is_empty() {
            let next = Self::shuffled(&mut self.rng);
            self.primary = std::mem::replace(&mut self.secondary, next);
        }

        kind
    }

    /// First `n` upcoming kinds, without consuming them
    ///
    /// At most `primary.len() + secondary.len()` kinds can be returned, which
    /// is always at least seven.
    pub fn preview(&self, n: usize) -> Vec<PieceKind> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .take(n)
            .copied()
            .collect()
    }

    /// Next kind `pick()` will return
    pub fn peek(&self) -> PieceKind {
        self.primary[0]
    }

    pub fn primary(&self) -> &VecDeque<PieceKind> {
        &self.primary
    }

    pub fn secondary(&self) -> &VecDeque<PieceKind> {
        &self.secondary
    }

    pub fn rng(&self) -> &SimpleRng {
        &self.rng
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new(1)
    }
}
