#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic pressure sampling over event batches.
//!
//! Pressure is advisory. The accumulator only classifies samples; deciding
//! what a signalling sample means is left to the caller.

use decay_cascade_core::{CascadeConfig, EventRecord, PressureSample};

/// Converts a completion delay in seconds into milliseconds of pressure.
const PRESSURE_SCALE: f64 = 1_000.0;

/// Pressure derived from an event's energy and completion delay.
#[must_use]
pub fn pressure(energy: f64, delay: f64) -> f64 {
    energy * delay * PRESSURE_SCALE
}

/// Classifies periodically sampled events by their pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureAccumulator {
    pressure_threshold: f64,
    critical_threshold: f64,
    sample_period: u32,
}

impl PressureAccumulator {
    /// Creates an accumulator using the thresholds of `config`.
    ///
    /// Samples above the cascade threshold itself are flagged critical.
    #[must_use]
    pub fn new(config: &CascadeConfig) -> Self {
        Self {
            pressure_threshold: config.pressure_threshold,
            critical_threshold: config.threshold,
            sample_period: config.sample_period.max(1),
        }
    }

    /// Whether the event at `sequence` is sampled at all.
    #[must_use]
    pub fn is_sampled(&self, sequence: u32) -> bool {
        sequence % self.sample_period == 0
    }

    /// Whether `value` exceeds the pressure threshold.
    #[must_use]
    pub fn exceeds(&self, value: f64) -> bool {
        value > self.pressure_threshold
    }

    /// Samples `event` and returns it when it signals excess pressure.
    #[must_use]
    pub fn observe(&self, event: &EventRecord) -> Option<PressureSample> {
        if !self.is_sampled(event.sequence) {
            return None;
        }

        let value = pressure(event.energy, event.delay);
        if !self.exceeds(value) {
            return None;
        }

        Some(PressureSample {
            sequence: event.sequence,
            pressure: value,
            critical: value > self.critical_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decay_cascade_core::LayerIndex;

    fn event(sequence: u32, energy: f64, delay: f64) -> EventRecord {
        EventRecord {
            layer: LayerIndex::new(0),
            sequence,
            position: f64::from(sequence) / 10.0,
            energy,
            local_energy: energy,
            delay,
            phase: 0.0,
        }
    }

    #[test]
    fn pressure_scales_energy_by_delay() {
        assert!((pressure(0.5, 0.001) - 0.5).abs() < 1e-12);
        assert_eq!(pressure(0.0, 0.001), 0.0);
    }

    #[test]
    fn only_every_tenth_event_is_sampled() {
        let accumulator = PressureAccumulator::new(&CascadeConfig::default());
        let sampled: Vec<u32> = (0..35).filter(|&i| accumulator.is_sampled(i)).collect();
        assert_eq!(sampled, vec![0, 10, 20, 30]);
        assert!(accumulator.observe(&event(11, 1.0, 0.001)).is_none());
    }

    #[test]
    fn low_pressure_is_not_reported() {
        let accumulator = PressureAccumulator::new(&CascadeConfig::default());
        assert!(accumulator.observe(&event(0, 0.05, 0.001)).is_none());
    }

    #[test]
    fn high_pressure_is_reported_and_classified() {
        let accumulator = PressureAccumulator::new(&CascadeConfig::default());

        let mild = accumulator
            .observe(&event(10, 0.3, 0.001))
            .expect("pressure 0.3 exceeds 0.1");
        assert_eq!(mild.sequence, 10);
        assert!(!mild.critical, "0.3 stays below the default threshold");

        let critical = accumulator
            .observe(&event(20, 1.0, 0.001))
            .expect("pressure 1.0 exceeds 0.1");
        assert!(critical.critical);
    }
}
