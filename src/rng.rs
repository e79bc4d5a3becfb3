use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded, reproducible uniform source for Monte Carlo runs.
///
/// Run `i` of a batch with base seed `s` is seeded with `s + i`, so runs are
/// independent of how they are distributed across workers.
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        SimRng {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform sample in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Standard Gaussian via Box-Muller.
    ///
    /// Both uniforms must be strictly positive for the log and the angle to
    /// be well defined; a zero draw is rejected and resampled.
    pub fn next_gaussian(&mut self) -> f64 {
        let u = loop {
            let u = self.next_f64();
            if u > 0.0 {
                break u;
            }
        };
        let v = loop {
            let v = self.next_f64();
            if v > 0.0 {
                break v;
            }
        };
        (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
    }

    /// Bernoulli trial with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
