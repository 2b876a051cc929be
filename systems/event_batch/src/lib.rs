#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Energy-proportional synthetic event batches.

use std::f64::consts::TAU;

use decay_cascade_core::{CascadeConfig, Clock, EventRecord, LayerIndex};
use decay_cascade_system_decay::DecayProfile;

/// Sub-layer distance between two consecutive events of a batch.
const SUB_LAYER_STEP: f64 = 10.0;

/// Produces a fresh batch of synthetic events for any layer.
#[derive(Clone, Debug)]
pub struct EventBatchGenerator {
    profile: DecayProfile,
    batch_scale: f64,
}

impl EventBatchGenerator {
    /// Creates a generator using the decay parameters and batch scale of `config`.
    #[must_use]
    pub fn new(config: &CascadeConfig) -> Self {
        Self {
            profile: DecayProfile::from_config(config),
            batch_scale: config.batch_scale,
        }
    }

    /// Decay parameters shared with the generated events.
    #[must_use]
    pub fn profile(&self) -> &DecayProfile {
        &self.profile
    }

    /// Number of events generated for `layer`: `floor(energy · scale)`, never negative.
    #[must_use]
    pub fn batch_size(&self, layer: LayerIndex) -> u32 {
        let scaled = (self.profile.energy_at(layer.position()) * self.batch_scale).floor();
        if !scaled.is_finite() || scaled <= 0.0 {
            return 0;
        }
        // `as` saturates at u32::MAX.
        scaled as u32
    }

    /// Starts a new lazy batch for `layer`, sampling `clock` once per event.
    pub fn generate<'a, C>(&'a self, layer: LayerIndex, clock: &'a mut C) -> EventBatch<'a, C>
    where
        C: Clock + ?Sized,
    {
        EventBatch {
            profile: &self.profile,
            clock,
            layer,
            layer_energy: self.profile.energy_at(layer.position()),
            next: 0,
            len: self.batch_size(layer),
        }
    }
}

/// Lazy, finite sequence of events for a single layer.
///
/// The batch cannot be restarted; call [`EventBatchGenerator::generate`] again
/// for a new one. Each event consumes exactly one clock sample.
#[derive(Debug)]
pub struct EventBatch<'a, C: ?Sized> {
    profile: &'a DecayProfile,
    clock: &'a mut C,
    layer: LayerIndex,
    layer_energy: f64,
    next: u32,
    len: u32,
}

impl<C: ?Sized> EventBatch<'_, C> {
    /// Layer the batch belongs to.
    #[must_use]
    pub fn layer(&self) -> LayerIndex {
        self.layer
    }

    /// Energy of the layer the batch belongs to.
    #[must_use]
    pub fn layer_energy(&self) -> f64 {
        self.layer_energy
    }
}

impl<C: Clock + ?Sized> Iterator for EventBatch<'_, C> {
    type Item = EventRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }

        let sequence = self.next;
        self.next += 1;

        let position = self.layer.position() + f64::from(sequence) / SUB_LAYER_STEP;
        let delay = self.profile.sample_jitter(position, &mut *self.clock);
        let period = 1.0 / self.profile.coefficient();

        Some(EventRecord {
            layer: self.layer,
            sequence,
            position,
            energy: self.layer_energy,
            local_energy: self.profile.energy_at(position),
            delay,
            phase: (TAU * f64::from(sequence) / period).sin(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.len - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<C: Clock + ?Sized> ExactSizeIterator for EventBatch<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use decay_cascade_system_decay::{energy, jitter, FixedClock, SeededClock};

    #[test]
    fn batch_size_tracks_layer_energy() {
        let config = CascadeConfig::default();
        let generator = EventBatchGenerator::new(&config);
        for layer in config.schedule() {
            let expected = (energy(1.0, layer.position(), config.coefficient) * 100.0).floor();
            assert_eq!(f64::from(generator.batch_size(layer)), expected);
        }
        assert_eq!(generator.batch_size(LayerIndex::new(0)), 100);
        assert_eq!(generator.batch_size(LayerIndex::new(32)), 38);
    }

    #[test]
    fn negative_energy_clamps_to_empty_batch() {
        let mut config = CascadeConfig::default();
        config.initial_energy = -1.0;
        let generator = EventBatchGenerator::new(&config);
        let mut clock = FixedClock::new(0);
        assert_eq!(generator.batch_size(LayerIndex::new(3)), 0);
        assert_eq!(generator.generate(LayerIndex::new(3), &mut clock).count(), 0);
    }

    #[test]
    fn events_carry_sub_layer_timing() {
        let config = CascadeConfig::default();
        let generator = EventBatchGenerator::new(&config);
        let mut clock = FixedClock::new(42);
        let layer = LayerIndex::new(2);
        let events: Vec<_> = generator.generate(layer, &mut clock).collect();

        assert_eq!(events.len(), 94);
        let layer_energy = energy(1.0, 2.0, config.coefficient);
        for (index, event) in events.iter().enumerate() {
            let sequence = u32::try_from(index).expect("batch index fits in u32");
            let position = 2.0 + f64::from(sequence) / 10.0;
            assert_eq!(event.layer, layer);
            assert_eq!(event.sequence, sequence);
            assert_eq!(event.position, position);
            assert_eq!(event.energy, layer_energy);
            assert_eq!(event.local_energy, energy(1.0, position, config.coefficient));
            assert_eq!(event.delay, jitter(position, config.coefficient, 42));
            assert!(event.phase.abs() <= 1.0);
        }
        assert_eq!(events[0].phase, 0.0);
    }

    #[test]
    fn batch_reports_exact_remaining_length() {
        let config = CascadeConfig::default();
        let generator = EventBatchGenerator::new(&config);
        let mut clock = SeededClock::new(1, 0);
        let mut batch = generator.generate(LayerIndex::new(10), &mut clock);
        assert_eq!(batch.len(), 73);
        let _ = batch.next();
        assert_eq!(batch.len(), 72);
        assert_eq!(batch.by_ref().count(), 72);
        assert!(batch.next().is_none());
    }

    #[test]
    fn each_call_generates_a_fresh_batch() {
        let config = CascadeConfig::default();
        let generator = EventBatchGenerator::new(&config);
        let mut clock = FixedClock::new(9);
        let first: Vec<_> = generator.generate(LayerIndex::new(5), &mut clock).collect();
        let second: Vec<_> = generator.generate(LayerIndex::new(5), &mut clock).collect();
        assert_eq!(first, second);
    }
}
