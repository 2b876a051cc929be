use std::time::{SystemTime, UNIX_EPOCH};

use decay_cascade_core::Clock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest simulated gap between two consecutive seeded clock samples.
const SEEDED_MAX_STEP_MICROS: u64 = 1_000;

/// Clock backed by the operating system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sample_micros(&mut self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Clock that always reports the same sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    micros: u64,
}

impl FixedClock {
    /// Creates a clock pinned to the provided sample.
    #[must_use]
    pub const fn new(micros: u64) -> Self {
        Self { micros }
    }
}

impl Clock for FixedClock {
    fn sample_micros(&mut self) -> u64 {
        self.micros
    }
}

/// Deterministic clock that advances by pseudo-random steps.
///
/// Two clocks built from the same seed and start produce identical sample
/// sequences, which makes whole cascade runs replayable.
#[derive(Clone, Debug)]
pub struct SeededClock {
    rng: ChaCha8Rng,
    current: u64,
}

impl SeededClock {
    /// Creates a clock starting at `start_micros` whose steps derive from `seed`.
    #[must_use]
    pub fn new(seed: u64, start_micros: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            current: start_micros,
        }
    }
}

impl Clock for SeededClock {
    fn sample_micros(&mut self) -> u64 {
        let step = self.rng.gen_range(1..=SEEDED_MAX_STEP_MICROS);
        self.current = self.current.saturating_add(step);
        self.current
    }
}
