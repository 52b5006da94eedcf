//! Platform type randomizer that keeps every run playable
//!
//! - The first picks of a run are starter types only.
//! - An unstable type needs at least one stable type among the last
//!   `max_unstable_streak - 1` accepted picks, so no run of
//!   `max_unstable_streak` unstable platforms can occur.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::platform::PlatformKind;
use crate::consts::{MAX_UNSTABLE_STREAK, START_UP_BONUS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Randomizer {
    max_unstable_streak: usize,
    start_up_bonus: u32,
    /// Last accepted picks, oldest first
    history: VecDeque<PlatformKind>,
    count: u32,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new(MAX_UNSTABLE_STREAK, START_UP_BONUS)
    }
}

impl Randomizer {
    pub fn new(max_unstable_streak: usize, start_up_bonus: u32) -> Self {
        assert!(max_unstable_streak >= 2, "streak limit must allow one unstable pick");
        Self {
            max_unstable_streak,
            start_up_bonus,
            history: VecDeque::with_capacity(max_unstable_streak - 1),
            count: 0,
        }
    }

    #[inline]
    fn history_len(&self) -> usize {
        self.max_unstable_streak - 1
    }

    /// Decide on a candidate, recording it when accepted
    fn accept(&mut self, kind: PlatformKind) -> bool {
        if self.count < self.start_up_bonus && !kind.is_starter() {
            return false;
        }

        // Until the history is full, only stable picks are taken
        if self.history.len() < self.history_len() {
            if !kind.is_stable() {
                return false;
            }
            self.history.push_back(kind);
            return true;
        }

        if !kind.is_stable() && !self.history.iter().any(|k| k.is_stable()) {
            return false;
        }
        self.history.pop_front();
        self.history.push_back(kind);
        true
    }

    /// Draw uniformly until a candidate is acceptable
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlatformKind {
        loop {
            let kind = PlatformKind::ALL[rng.random_range(0..PlatformKind::COUNT)];
            if self.accept(kind) {
                self.count += 1;
                return kind;
            }
        }
    }

    /// Still in the opening stretch; power-ups are withheld meanwhile
    pub fn might_want_to_slow_down(&self) -> bool {
        self.count < self.start_up_bonus * 2
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn clear(&mut self) {
        self.count = 0;
        self.history.clear();
    }
}
