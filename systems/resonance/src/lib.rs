#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Post-convergence analysis: resonance patterns, detection metrics and the
//! closing decay summary.
//!
//! Everything here is derived from the configuration alone and consumed only
//! by reporting.

use std::f64::consts::TAU;

use decay_cascade_core::{
    CascadeConfig, DetectionMetrics, LayerIndex, ResonanceMarker, ResonancePattern,
};
use decay_cascade_system_decay::{decay_factor, energy};

/// Detection probability of a single laminar check.
pub const LAMINAR_DETECTION: f64 = 0.95;

/// Derives one resonance pattern per layer of the configuration.
#[must_use]
pub fn resonance_patterns(config: &CascadeConfig) -> Vec<ResonancePattern> {
    let layer_count = f64::from(config.layer_count.max(1));
    (0..config.layer_count)
        .map(LayerIndex::new)
        .map(|layer| {
            let position = layer.position();
            ResonancePattern {
                layer,
                energy: energy(config.initial_energy, position, config.coefficient),
                marker: ResonanceMarker::for_layer(layer),
                phase: (TAU * position / layer_count).sin(),
                frequency: 1.0 / (config.coefficient * (position + 1.0)),
            }
        })
        .collect()
}

/// Base frequency `1/α` of the resonance patterns.
#[must_use]
pub fn base_frequency(config: &CascadeConfig) -> f64 {
    1.0 / config.coefficient
}

/// Compounds the laminar detection probability across every layer.
#[must_use]
pub fn detection_metrics(layer_count: u32) -> DetectionMetrics {
    let exponent = i32::try_from(layer_count).unwrap_or(i32::MAX);
    let layered = LAMINAR_DETECTION.powi(exponent);
    let evasion = if layered > 0.0 {
        LAMINAR_DETECTION / layered
    } else {
        f64::INFINITY
    };

    DetectionMetrics {
        laminar: LAMINAR_DETECTION,
        layered,
        evasion,
    }
}

/// Closing figures describing the decay law of a configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecaySummary {
    /// Dispersion coefficient α.
    pub coefficient: f64,
    /// Number of layers the integral spans.
    pub layer_count: u32,
    /// `∫₀ᴸ e^(-α·d) dd = (1 - e^(-α·L)) / α`.
    pub integral: f64,
    /// Last layer index of the configuration.
    pub last_layer: LayerIndex,
    /// Decay factor of the last layer relative to layer zero.
    pub decay_ratio: f64,
}

impl DecaySummary {
    /// Computes the summary for `config`.
    #[must_use]
    pub fn new(config: &CascadeConfig) -> Self {
        let span = f64::from(config.layer_count);
        let last_layer = LayerIndex::new(config.layer_count.saturating_sub(1));
        Self {
            coefficient: config.coefficient,
            layer_count: config.layer_count,
            integral: (1.0 - decay_factor(span, config.coefficient)) / config.coefficient,
            last_layer,
            decay_ratio: decay_factor(last_layer.position(), config.coefficient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_pattern_per_layer_with_alternating_markers() {
        let config = CascadeConfig::default();
        let patterns = resonance_patterns(&config);
        assert_eq!(patterns.len(), 33);
        for (index, pattern) in patterns.iter().enumerate() {
            let expected = if index % 2 == 0 { 0xAA } else { 0x55 };
            assert_eq!(pattern.marker.byte(), expected);
            assert_eq!(pattern.layer.get() as usize, index);
        }
    }

    #[test]
    fn patterns_follow_decay_and_frequency_laws() {
        let config = CascadeConfig::default();
        let patterns = resonance_patterns(&config);
        assert_eq!(patterns[0].energy, 1.0);
        assert_eq!(patterns[0].phase, 0.0);
        assert!((patterns[0].frequency - 1.0 / 0.0302011).abs() < 1e-9);
        assert!((patterns[1].frequency - 1.0 / (2.0 * 0.0302011)).abs() < 1e-9);
        assert_eq!(patterns[32].energy, config.threshold);
        assert!(patterns.windows(2).all(|pair| pair[1].energy < pair[0].energy));
    }

    #[test]
    fn detection_metrics_compound_per_layer() {
        let metrics = detection_metrics(33);
        assert_eq!(metrics.laminar, 0.95);
        assert!((metrics.layered - 0.95_f64.powi(33)).abs() < 1e-15);
        assert!((metrics.evasion - 1.0 / 0.95_f64.powi(32)).abs() < 1e-9);
    }

    #[test]
    fn vanishing_detection_yields_infinite_evasion() {
        let metrics = detection_metrics(u32::MAX);
        assert_eq!(metrics.layered, 0.0);
        assert!(metrics.evasion.is_infinite());
    }

    #[test]
    fn summary_integrates_decay_over_all_layers() {
        let summary = DecaySummary::new(&CascadeConfig::default());
        let expected = (1.0 - (-0.0302011_f64 * 33.0).exp()) / 0.0302011;
        assert!((summary.integral - expected).abs() < 1e-12);
        assert_eq!(summary.last_layer, LayerIndex::new(32));
        assert!((summary.decay_ratio - 0.380_436_8).abs() < 1e-6);
    }
}
