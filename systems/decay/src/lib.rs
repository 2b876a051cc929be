#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Exponential energy decay and clock-aligned timing jitter.
//!
//! Both computations are pure given their inputs. The only impurity in this
//! crate is reading a [`Clock`], which callers inject so tests can pin the
//! sample and replays can use a seeded source.

mod clock;

use decay_cascade_core::{CascadeConfig, Clock, DEFAULT_PRIMES};

pub use clock::{FixedClock, SeededClock, SystemClock};

/// Base completion delay in seconds at layer zero.
pub const BASE_DELAY_SECONDS: f64 = 0.001;

/// Largest fraction of the base delay the prime alignment may add.
pub const ALIGNMENT_SPREAD: f64 = 0.1;

/// Energy remaining at `position` for a cascade starting at `initial`.
///
/// Computes `initial · e^(-α·position)`. Equals `initial` at position zero and
/// strictly decreases with `position` whenever `coefficient` is positive.
#[must_use]
pub fn energy(initial: f64, position: f64, coefficient: f64) -> f64 {
    initial * decay_factor(position, coefficient)
}

/// Decay factor `e^(-α·position)` independent of the initial energy.
#[must_use]
pub fn decay_factor(position: f64, coefficient: f64) -> f64 {
    (-coefficient * position).exp()
}

/// Timing jitter for `position` using the default prime table.
///
/// See [`jitter_with_primes`] for the exact formula.
#[must_use]
pub fn jitter(position: f64, coefficient: f64, clock_sample: u64) -> f64 {
    jitter_with_primes(position, coefficient, &DEFAULT_PRIMES, clock_sample)
}

/// Timing jitter for `position` phase-aligned against `primes`.
///
/// The base delay `0.001 · e^(-α·position)` is stretched by up to ten percent
/// depending on where `clock_sample` falls modulo the prime selected by the
/// integer part of `position`. The result lies in `[base, 1.1 · base)`.
#[must_use]
pub fn jitter_with_primes(
    position: f64,
    coefficient: f64,
    primes: &[u64],
    clock_sample: u64,
) -> f64 {
    let base = BASE_DELAY_SECONDS * decay_factor(position, coefficient);
    base * (1.0 + ALIGNMENT_SPREAD * prime_alignment(position, primes, clock_sample))
}

fn prime_alignment(position: f64, primes: &[u64], clock_sample: u64) -> f64 {
    if primes.is_empty() {
        return 0.0;
    }

    // `as` saturates: negative and NaN positions map to slot zero.
    let slot = position.floor() as u64 as usize % primes.len();
    let prime = primes[slot];
    if prime == 0 {
        return 0.0;
    }

    (clock_sample % prime) as f64 / prime as f64
}

/// Decay parameters of a single simulation bundled for repeated evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct DecayProfile {
    initial_energy: f64,
    coefficient: f64,
    primes: Vec<u64>,
}

impl DecayProfile {
    /// Captures the decay parameters of the provided configuration.
    #[must_use]
    pub fn from_config(config: &CascadeConfig) -> Self {
        Self {
            initial_energy: config.initial_energy,
            coefficient: config.coefficient,
            primes: config.primes.clone(),
        }
    }

    /// Dispersion coefficient of the profile.
    #[must_use]
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Initial energy of the profile.
    #[must_use]
    pub fn initial_energy(&self) -> f64 {
        self.initial_energy
    }

    /// Energy at the provided position.
    #[must_use]
    pub fn energy_at(&self, position: f64) -> f64 {
        energy(self.initial_energy, position, self.coefficient)
    }

    /// Jitter at the provided position for an explicit clock sample.
    #[must_use]
    pub fn jitter_at(&self, position: f64, clock_sample: u64) -> f64 {
        jitter_with_primes(position, self.coefficient, &self.primes, clock_sample)
    }

    /// Jitter at the provided position, reading the sample from `clock`.
    pub fn sample_jitter<C: Clock + ?Sized>(&self, position: f64, clock: &mut C) -> f64 {
        self.jitter_at(position, clock.sample_micros())
    }
}
