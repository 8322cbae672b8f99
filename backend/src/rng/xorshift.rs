//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. Jittered rescheduling,
//! Bernoulli delays and strategy draws all go through this generator so a
//! run is reproducible bit for bit.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use firm_control_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let jitter = rng.range(-3, 4); // [-3, 4)
/// assert!((-3..4).contains(&jitter));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,

    /// Second Box-Muller variate waiting to be returned
    #[serde(default)]
    spare_gaussian: Option<f64>,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// assert_eq!(rng.get_state(), 12345);
    /// ```
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self {
            state,
            spare_gaussian: None,
        }
    }

    /// Generate next random u64 value
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Generate random value in range [min, max] (both ends included)
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// for _ in 0..100 {
    ///     let v = rng.range_inclusive(-3, 3);
    ///     assert!((-3..=3).contains(&v));
    /// }
    /// ```
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        self.range(min, max + 1)
    }

    /// Uniform index into a collection of `len` elements
    ///
    /// # Panics
    /// Panics if `len == 0`
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot draw an index from an empty collection");
        (self.next() % len as u64) as usize
    }

    /// Get current xorshift state
    ///
    /// Does not include a cached Gaussian variate; use [`checkpoint`] to
    /// resume a stream that mixes Gaussian and uniform draws.
    ///
    /// [`checkpoint`]: RngManager::checkpoint
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Full generator state (for checkpointing/replay)
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(3);
    /// rng.next_gaussian(); // caches the second variate of the pair
    /// let (state, spare) = rng.checkpoint();
    /// let mut resumed = RngManager::restore(state, spare);
    /// assert_eq!(rng.next_gaussian(), resumed.next_gaussian());
    /// ```
    pub fn checkpoint(&self) -> (u64, Option<f64>) {
        (self.state, self.spare_gaussian)
    }

    /// Rebuild a generator from [`checkpoint`](RngManager::checkpoint)
    pub fn restore(state: u64, spare_gaussian: Option<f64>) -> Self {
        Self {
            spare_gaussian,
            ..Self::new(state)
        }
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli draw: true with probability `p`
    ///
    /// `p <= 0` is never true, `p >= 1` is always true.
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(42);
    /// assert!(rng.next_bool(1.0));
    /// assert!(!rng.next_bool(0.0));
    /// ```
    pub fn next_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Standard normal draw (Box-Muller, polar form)
    ///
    /// Variates are produced in pairs; the second one is cached and returned
    /// on the following call.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(spare) = self.spare_gaussian.take() {
            return spare;
        }
        loop {
            let u = 2.0 * self.next_f64() - 1.0;
            let v = 2.0 * self.next_f64() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let factor = (-2.0 * s.ln() / s).sqrt();
                self.spare_gaussian = Some(v * factor);
                return u * factor;
            }
        }
    }

    /// Normal draw with the given mean and standard deviation
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.next_gaussian()
    }
}
