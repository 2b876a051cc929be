#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the decay cascade engine.
//!
//! This crate defines the value surface that connects the pure systems, the
//! authoritative cascade controller and the adapters. Systems compute layer
//! energy, timing jitter, event batches and pressure samples from an immutable
//! [`CascadeConfig`]. The controller in the engine crate turns those values
//! into [`LayerReport`] records and a single [`CascadeOutcome`], which the
//! reporting adapter renders without ever touching the decision logic.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Temporal dispersion coefficient used when no configuration overrides it.
pub const DEFAULT_COEFFICIENT: f64 = 0.0302011;

/// Number of layers processed by the default schedule.
pub const DEFAULT_LAYER_COUNT: u32 = 33;

/// Layer whose energy defines the default convergence threshold.
pub const REFERENCE_THRESHOLD_LAYER: u32 = 32;

/// Energy at layer zero for the default configuration.
pub const DEFAULT_INITIAL_ENERGY: f64 = 1.0;

/// Multiplier converting layer energy into an event batch size.
pub const DEFAULT_BATCH_SCALE: f64 = 100.0;

/// Pressure level above which a sampled event is reported.
pub const DEFAULT_PRESSURE_THRESHOLD: f64 = 0.1;

/// Only every n-th event of a batch is sampled for pressure.
pub const DEFAULT_SAMPLE_PERIOD: u32 = 10;

/// Primes used to phase-align timing jitter against the wall clock.
pub const DEFAULT_PRIMES: [u64; 3] = [10_007, 10_009, 10_037];

/// Index of a single layer within the cascade schedule.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LayerIndex(u32);

impl LayerIndex {
    /// Creates a new layer index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Layer position expressed as a floating point value for decay maths.
    #[must_use]
    pub fn position(&self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable parameters describing a single cascade simulation.
///
/// Every run owns its configuration, so several simulations with different
/// parameters can coexist in one process. Values loaded from external sources
/// must pass [`CascadeConfig::validate`] before the engine accepts them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CascadeConfig {
    /// Energy at layer zero (E₀).
    pub initial_energy: f64,
    /// Dispersion coefficient α of the exponential decay.
    pub coefficient: f64,
    /// Number of layers in the schedule; indices run from zero to `layer_count - 1`.
    pub layer_count: u32,
    /// Distance between consecutively visited layers.
    pub stride: u32,
    /// Energy at or below which the cascade converges.
    pub threshold: f64,
    /// Multiplier converting layer energy into an event count.
    pub batch_scale: f64,
    /// Pressure above which a sampled event is recorded.
    pub pressure_threshold: f64,
    /// Period between pressure samples within a batch.
    pub sample_period: u32,
    /// Primes used to derive the jitter phase alignment.
    pub primes: Vec<u64>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            initial_energy: DEFAULT_INITIAL_ENERGY,
            coefficient: DEFAULT_COEFFICIENT,
            layer_count: DEFAULT_LAYER_COUNT,
            stride: 1,
            threshold: DEFAULT_INITIAL_ENERGY
                * (-DEFAULT_COEFFICIENT * f64::from(REFERENCE_THRESHOLD_LAYER)).exp(),
            batch_scale: DEFAULT_BATCH_SCALE,
            pressure_threshold: DEFAULT_PRESSURE_THRESHOLD,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            primes: DEFAULT_PRIMES.to_vec(),
        }
    }
}

impl CascadeConfig {
    /// Returns a copy of the configuration with the provided threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns a copy of the configuration visiting every `stride`-th layer.
    #[must_use]
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// Returns a copy of the configuration with the provided layer count.
    #[must_use]
    pub fn with_layer_count(mut self, layer_count: u32) -> Self {
        self.layer_count = layer_count;
        self
    }

    /// Returns a copy of the configuration with the provided dispersion coefficient.
    #[must_use]
    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }

    /// Checks the numeric preconditions the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_energy.is_finite() || self.initial_energy < 0.0 {
            return Err(ConfigError::InvalidInitialEnergy {
                value: self.initial_energy,
            });
        }
        if !self.coefficient.is_finite() || self.coefficient <= 0.0 {
            return Err(ConfigError::NonPositiveCoefficient {
                value: self.coefficient,
            });
        }
        if self.layer_count == 0 {
            return Err(ConfigError::EmptySchedule);
        }
        if self.stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                value: self.threshold,
            });
        }
        if !self.batch_scale.is_finite() || self.batch_scale < 0.0 {
            return Err(ConfigError::InvalidBatchScale {
                value: self.batch_scale,
            });
        }
        if !self.pressure_threshold.is_finite() {
            return Err(ConfigError::InvalidPressureThreshold {
                value: self.pressure_threshold,
            });
        }
        if self.sample_period == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        if self.primes.is_empty() || self.primes.contains(&0) {
            return Err(ConfigError::InvalidPrimes);
        }
        Ok(())
    }

    /// Layers visited by the schedule, in ascending order.
    pub fn schedule(&self) -> impl Iterator<Item = LayerIndex> {
        let stride = usize::try_from(self.stride.max(1)).unwrap_or(usize::MAX);
        (0..self.layer_count).step_by(stride).map(LayerIndex::new)
    }

    /// Final layer index covered by the schedule, if the schedule is not empty.
    #[must_use]
    pub fn last_scheduled_layer(&self) -> Option<LayerIndex> {
        self.schedule().last()
    }
}

/// Reasons a [`CascadeConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The initial energy is negative or not finite.
    #[error("initial energy must be finite and non-negative (received {value})")]
    InvalidInitialEnergy {
        /// Rejected value.
        value: f64,
    },
    /// The dispersion coefficient would not produce a decaying sequence.
    #[error("dispersion coefficient must be finite and positive (received {value})")]
    NonPositiveCoefficient {
        /// Rejected value.
        value: f64,
    },
    /// The schedule contains no layers.
    #[error("layer count must be positive")]
    EmptySchedule,
    /// The schedule would never advance.
    #[error("layer stride must be positive")]
    ZeroStride,
    /// The convergence threshold is not a finite number.
    #[error("threshold must be finite (received {value})")]
    InvalidThreshold {
        /// Rejected value.
        value: f64,
    },
    /// The batch scale is negative or not finite.
    #[error("batch scale must be finite and non-negative (received {value})")]
    InvalidBatchScale {
        /// Rejected value.
        value: f64,
    },
    /// The pressure threshold is not a finite number.
    #[error("pressure threshold must be finite (received {value})")]
    InvalidPressureThreshold {
        /// Rejected value.
        value: f64,
    },
    /// Pressure sampling would divide by zero.
    #[error("pressure sample period must be positive")]
    ZeroSamplePeriod,
    /// The jitter prime table is empty or contains zero.
    #[error("jitter primes must be non-empty and non-zero")]
    InvalidPrimes,
}

/// Source of wall-clock samples feeding the timing jitter.
pub trait Clock {
    /// Returns the current time in whole microseconds since the Unix epoch.
    fn sample_micros(&mut self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn sample_micros(&mut self) -> u64 {
        (**self).sample_micros()
    }
}

/// Synthetic completion produced while a layer is processed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Layer that produced the event.
    pub layer: LayerIndex,
    /// Position of the event within its batch.
    pub sequence: u32,
    /// Fractional sub-layer position `layer + sequence / 10`.
    pub position: f64,
    /// Energy of the layer that produced the event.
    pub energy: f64,
    /// Energy evaluated at the fractional sub-layer position.
    pub local_energy: f64,
    /// Completion delay in seconds derived from the timing jitter.
    pub delay: f64,
    /// Sinusoidal phase of the event within the batch.
    pub phase: f64,
}

/// Pressure sample that exceeded the pressure threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    /// Sequence number of the sampled event.
    pub sequence: u32,
    /// Derived pressure value.
    pub pressure: f64,
    /// Whether the pressure also exceeded the cascade threshold.
    pub critical: bool,
}

/// Structured outcome of processing a single layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    /// Layer that was processed.
    pub layer: LayerIndex,
    /// Energy of the layer.
    pub energy: f64,
    /// Decay factor `exp(-α·layer)` independent of the initial energy.
    pub decay_factor: f64,
    /// Number of events generated for the layer.
    pub event_count: u32,
    /// Advisory pressure samples that exceeded the pressure threshold.
    pub pressure_signals: Vec<PressureSample>,
    /// Whether the layer energy was at or below the threshold.
    pub below_threshold: bool,
    /// Whether this layer triggered the phase transition.
    pub converged: bool,
}

/// Lifecycle of a cascade controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadeState {
    /// Layers remain to be processed.
    Running,
    /// The threshold was crossed and the terminal trigger fired.
    Converged,
    /// Every scheduled layer was processed without crossing the threshold.
    Exhausted,
    /// The terminal trigger failed; the run cannot continue.
    Aborted,
}

impl fmt::Display for CascadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Converged => "converged",
            Self::Exhausted => "exhausted",
            Self::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Acknowledgement returned by a terminal trigger that completed successfully.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionReceipt {
    /// Layer at which the transition happened.
    pub layer: LayerIndex,
    /// Energy observed when the transition fired.
    pub energy: f64,
    /// Human readable description of the effect the trigger applied.
    pub effect: String,
}

/// Terminal result of a cascade run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CascadeOutcome {
    /// The threshold was crossed and the phase transition fired.
    Converged {
        /// Layer that triggered the transition.
        layer: LayerIndex,
        /// Energy of that layer.
        energy: f64,
        /// Number of events generated across every processed layer.
        total_events: u64,
        /// Receipt produced by the terminal trigger.
        receipt: TransitionReceipt,
    },
    /// The schedule ran out before the threshold was crossed.
    Exhausted {
        /// Last layer that was processed.
        final_layer: LayerIndex,
        /// Energy of the last processed layer.
        final_energy: f64,
        /// Threshold that was never reached.
        threshold: f64,
    },
}

impl CascadeOutcome {
    /// Whether the run reached convergence.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Failure reported by the terminal trigger collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The process lacks the privilege the trigger requires.
    #[error("permission denied while triggering transition at layer {layer}: {reason}")]
    PermissionDenied {
        /// Layer at which the trigger was invoked.
        layer: LayerIndex,
        /// Description supplied by the collaborator.
        reason: String,
    },
    /// The trigger failed for any other reason.
    #[error("transition at layer {layer} failed: {reason}")]
    Failed {
        /// Layer at which the trigger was invoked.
        layer: LayerIndex,
        /// Description supplied by the collaborator.
        reason: String,
    },
}

/// Errors surfaced by the cascade controller.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CascadeError {
    /// The configuration failed validation.
    #[error("invalid cascade configuration: {0}")]
    Config(#[from] ConfigError),
    /// The terminal trigger failed; this is fatal for the run.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// The controller was asked to run after reaching a terminal state.
    #[error("cascade already finished in state {state}")]
    AlreadyFinished {
        /// State the controller was in.
        state: CascadeState,
    },
}

/// Alternating marker modulating resonance patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResonanceMarker {
    /// `0xAA`, used on even layers.
    High,
    /// `0x55`, used on odd layers.
    Low,
}

impl ResonanceMarker {
    /// Marker assigned to the provided layer.
    #[must_use]
    pub const fn for_layer(layer: LayerIndex) -> Self {
        if layer.get() % 2 == 0 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Byte representation of the marker.
    #[must_use]
    pub const fn byte(&self) -> u8 {
        match self {
            Self::High => 0xAA,
            Self::Low => 0x55,
        }
    }
}

/// Resonance pattern derived for one layer after a successful cascade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResonancePattern {
    /// Layer described by the pattern.
    pub layer: LayerIndex,
    /// Energy at the layer.
    pub energy: f64,
    /// Alternating two-valued marker.
    pub marker: ResonanceMarker,
    /// Phase angle `sin(2π·layer / layer_count)`.
    pub phase: f64,
    /// Frequency `1 / (α·(layer + 1))`.
    pub frequency: f64,
}

/// Detection metrics comparing a single laminar check with the layered cascade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    /// Detection probability of a single laminar check.
    pub laminar: f64,
    /// Detection probability after compounding across every layer.
    pub layered: f64,
    /// Ratio `laminar / layered`; infinite when `layered` underflows to zero.
    pub evasion: f64,
}

#[cfg(test)]
mod tests {
    use super::{
        CascadeConfig, CascadeOutcome, ConfigError, LayerIndex, LayerReport, PressureSample,
        ResonanceMarker, TransitionReceipt,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn default_threshold_matches_energy_at_reference_layer() {
        let config = CascadeConfig::default();
        let expected = (-0.0302011_f64 * 32.0).exp();
        assert_eq!(config.threshold, expected);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stride_one_schedule_visits_every_layer() {
        let config = CascadeConfig::default();
        let layers: Vec<u32> = config.schedule().map(|layer| layer.get()).collect();
        assert_eq!(layers, (0..33).collect::<Vec<_>>());
        assert_eq!(config.last_scheduled_layer(), Some(LayerIndex::new(32)));
    }

    #[test]
    fn stepped_schedule_skips_intermediate_layers() {
        let config = CascadeConfig::default().with_stride(5);
        let layers: Vec<u32> = config.schedule().map(|layer| layer.get()).collect();
        assert_eq!(layers, vec![0, 5, 10, 15, 20, 25, 30]);
    }

    #[test]
    fn validation_rejects_degenerate_parameters() {
        let base = CascadeConfig::default();
        assert_eq!(
            base.clone().with_coefficient(0.0).validate(),
            Err(ConfigError::NonPositiveCoefficient { value: 0.0 })
        );
        assert_eq!(
            base.clone().with_stride(0).validate(),
            Err(ConfigError::ZeroStride)
        );
        assert_eq!(
            base.clone().with_layer_count(0).validate(),
            Err(ConfigError::EmptySchedule)
        );

        let mut no_primes = base;
        no_primes.primes.clear();
        assert_eq!(no_primes.validate(), Err(ConfigError::InvalidPrimes));
    }

    #[test]
    fn resonance_marker_alternates_between_layers() {
        assert_eq!(ResonanceMarker::for_layer(LayerIndex::new(0)).byte(), 0xAA);
        assert_eq!(ResonanceMarker::for_layer(LayerIndex::new(1)).byte(), 0x55);
        assert_eq!(ResonanceMarker::for_layer(LayerIndex::new(32)).byte(), 0xAA);
    }

    #[test]
    fn config_round_trips_through_bincode() {
        assert_round_trip(&CascadeConfig::default().with_stride(5));
    }

    #[test]
    fn layer_report_round_trips_through_bincode() {
        let report = LayerReport {
            layer: LayerIndex::new(4),
            energy: 0.886,
            decay_factor: 0.886,
            event_count: 88,
            pressure_signals: vec![PressureSample {
                sequence: 10,
                pressure: 0.9,
                critical: true,
            }],
            below_threshold: false,
            converged: false,
        };
        assert_round_trip(&report);
    }

    #[test]
    fn outcome_round_trips_through_bincode() {
        let outcome = CascadeOutcome::Converged {
            layer: LayerIndex::new(32),
            energy: 0.38,
            total_events: 2_000,
            receipt: TransitionReceipt {
                layer: LayerIndex::new(32),
                energy: 0.38,
                effect: "simulated".to_owned(),
            },
        };
        assert_round_trip(&outcome);
    }
}
