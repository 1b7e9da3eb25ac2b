//! Deterministic random number generation.
//!
//! RULE: Nothing in the game core may call any platform RNG.
//! All randomness flows through GameRng instances derived from the
//! single master seed handed to the engine.
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot_index * golden ratio). Decorative draws
//! therefore never shift the tile layouts of a seeded run.

use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct GameRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl GameRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a usize in [0, n).
    pub fn below(&mut self, n: usize) -> usize {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// `amount` distinct indices from `0..len`, uniformly without replacement.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.inner, len, amount).into_vec()
    }

    /// Uniform in-place shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Hands out per-slot streams for a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: RngSlot) -> GameRng {
        GameRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries. Only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Pairs = 0,
    Decor = 1,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pairs => "pairs",
            Self::Decor => "decor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_independent_streams() {
        let bank = RngBank::new(12345);
        let mut pairs = bank.for_slot(RngSlot::Pairs);
        let mut decor = bank.for_slot(RngSlot::Decor);

        let a: Vec<usize> = (0..16).map(|_| pairs.below(1000)).collect();
        let b: Vec<usize> = (0..16).map(|_| decor.below(1000)).collect();
        assert_ne!(a, b, "pairs and decor streams should not coincide");
        assert_eq!(pairs.name, "pairs");
    }

    #[test]
    fn same_seed_same_shuffle() {
        let mut items_a: Vec<u32> = (0..20).collect();
        let mut items_b = items_a.clone();
        RngBank::new(7).for_slot(RngSlot::Pairs).shuffle(&mut items_a);
        RngBank::new(7).for_slot(RngSlot::Pairs).shuffle(&mut items_b);
        assert_eq!(items_a, items_b);
    }
}
