use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use crate::foundation::core::{Millis, TileId};

/// Upper bound (exclusive) of the per-tile random start delay.
pub const REVEAL_WINDOW: Millis = Millis(1500);
/// Fade-in length of one revealed tile.
pub const REVEAL_DURATION: Millis = Millis(350);

/// Uniform source in `[0, 1)` for presentation jitter.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeds from the process's per-instance hasher keys; not reproducible.
    pub fn from_entropy() -> Self {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(0x7469_6c65_6c69_6e6b);
        Self::new(hasher.finish())
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl RandomSource for Rng64 {
    fn next_f64(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// One tile's pop-in: when it starts and how long it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RevealStep {
    pub tile: TileId,
    pub delay: Millis,
    pub duration: Millis,
}

/// Draws an independent start delay for every tile.
pub fn plan_reveal(
    tiles: impl IntoIterator<Item = TileId>,
    rng: &mut dyn RandomSource,
) -> Vec<RevealStep> {
    tiles
        .into_iter()
        .map(|tile| RevealStep {
            tile,
            delay: Millis((rng.next_f64() * REVEAL_WINDOW.0 as f64) as u64),
            duration: REVEAL_DURATION,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/reveal.rs"]
mod tests;
