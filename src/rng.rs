//! Shared pseudo-random source.
//!
//! Spec §5: "Randomness source is a process-global PRNG; implementations may
//! accept an explicit seed for determinism testing." Rather than a true
//! global, this wraps a seedable `StdRng` behind a mutex so the sampler and
//! confidence estimator can share one source without the caller threading a
//! `&mut` through every call — a small, deliberate deviation in favor of
//! ergonomics at the API boundary, while the underlying generator is still a
//! single sequential stream.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A `Send + Sync` pseudo-random generator shared by sampling and confidence
/// estimation.
pub struct SharedRng {
    inner: Mutex<StdRng>,
}

impl SharedRng {
    /// Seed from a fixed value, for reproducible test runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seed from entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Return `true` with probability 0.5.
    pub fn coin_flip(&self) -> bool {
        self.with(|rng| rng.gen_bool(0.5))
    }

    /// Pick a uniformly random index in `[0, len)`. Panics if `len == 0`.
    pub fn gen_index(&self, len: usize) -> usize {
        self.with(|rng| rng.gen_range(0..len))
    }

    /// Pick a uniformly random element of a non-empty slice.
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.gen_index(items.len())])
    }

    fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.inner.lock().expect("rng mutex poisoned");
        f(&mut guard)
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choose_is_deterministic_for_a_fixed_seed() {
        let rng_a = SharedRng::from_seed(7);
        let rng_b = SharedRng::from_seed(7);
        let items = vec![1, 2, 3, 4, 5];
        for _ in 0..10 {
            assert_eq!(rng_a.choose(&items), rng_b.choose(&items));
        }
    }

    #[test]
    fn choose_on_empty_slice_is_none() {
        let rng = SharedRng::from_seed(1);
        let items: Vec<i32> = vec![];
        assert_eq!(rng.choose(&items), None);
    }
}
