#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative cascade state machine.
//!
//! The [`CascadeController`] walks the layer schedule of a [`CascadeConfig`]
//! in ascending order. For every layer it drains the event batch, records
//! advisory pressure signals and compares the layer energy against the
//! threshold. The first layer at or below the threshold fires the injected
//! [`TransitionTrigger`] once and stops the walk. The controller returns
//! structured [`LayerReport`] values and never prints; presentation belongs to
//! the adapters.

mod pacing;
mod trigger;

use std::time::Duration;

use decay_cascade_core::{
    CascadeConfig, CascadeError, CascadeOutcome, CascadeState, Clock, ConfigError, LayerIndex,
    LayerReport,
};
use decay_cascade_system_decay::decay_factor;
use decay_cascade_system_event_batch::EventBatchGenerator;
use decay_cascade_system_pressure::PressureAccumulator;
use tracing::{debug, error, info};

pub use pacing::{NoPacing, Pacer, ThreadPacer};
pub use trigger::{SimulatedTransition, TransitionTrigger};

/// Stateful orchestrator of a single cascade run.
///
/// A controller runs at most once. Independent controllers share nothing and
/// may run side by side with different configurations.
#[derive(Debug)]
pub struct CascadeController<C, P, T> {
    config: CascadeConfig,
    generator: EventBatchGenerator,
    accumulator: PressureAccumulator,
    schedule: Vec<LayerIndex>,
    cursor: usize,
    state: CascadeState,
    converged: bool,
    total_events: u64,
    last_processed: Option<(LayerIndex, f64)>,
    outcome: Option<CascadeOutcome>,
    clock: C,
    pacer: P,
    trigger: T,
}

impl<C, P, T> CascadeController<C, P, T>
where
    C: Clock,
    P: Pacer,
    T: TransitionTrigger,
{
    /// Creates a controller for `config` after validating it.
    pub fn new(
        config: CascadeConfig,
        clock: C,
        pacer: P,
        trigger: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            generator: EventBatchGenerator::new(&config),
            accumulator: PressureAccumulator::new(&config),
            schedule: config.schedule().collect(),
            config,
            cursor: 0,
            state: CascadeState::Running,
            converged: false,
            total_events: 0,
            last_processed: None,
            outcome: None,
            clock,
            pacer,
            trigger,
        })
    }

    /// Configuration the controller was built with.
    #[must_use]
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CascadeState {
        self.state
    }

    /// Whether the terminal trigger has fired.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Number of events generated so far.
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// Terminal outcome once the controller left the running state.
    #[must_use]
    pub fn outcome(&self) -> Option<&CascadeOutcome> {
        self.outcome.as_ref()
    }

    /// Trigger collaborator the controller invokes on convergence.
    #[must_use]
    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    /// Processes every remaining layer and returns the terminal outcome.
    ///
    /// Per-layer reports are appended to `out` in processing order. A trigger
    /// failure is returned as an error and leaves the controller aborted.
    pub fn run(&mut self, out: &mut Vec<LayerReport>) -> Result<CascadeOutcome, CascadeError> {
        if self.state != CascadeState::Running {
            return Err(CascadeError::AlreadyFinished { state: self.state });
        }

        while let Some(report) = self.advance()? {
            out.push(report);
        }

        self.outcome
            .clone()
            .ok_or(CascadeError::AlreadyFinished { state: self.state })
    }

    /// Processes the next scheduled layer.
    ///
    /// Returns `Ok(None)` once the controller is no longer running.
    pub fn advance(&mut self) -> Result<Option<LayerReport>, CascadeError> {
        if self.state != CascadeState::Running {
            return Ok(None);
        }

        let Some(&layer) = self.schedule.get(self.cursor) else {
            self.finish_exhausted();
            return Ok(None);
        };
        self.cursor += 1;

        let report = self.process_layer(layer)?;
        if report.converged {
            return Ok(Some(report));
        }

        if self.cursor < self.schedule.len() {
            self.pace(layer);
        } else {
            self.finish_exhausted();
        }

        Ok(Some(report))
    }

    fn process_layer(&mut self, layer: LayerIndex) -> Result<LayerReport, CascadeError> {
        let energy = self.generator.profile().energy_at(layer.position());
        let mut event_count = 0_u32;
        let mut pressure_signals = Vec::new();

        for event in self.generator.generate(layer, &mut self.clock) {
            event_count += 1;
            if let Some(sample) = self.accumulator.observe(&event) {
                debug!(
                    layer = layer.get(),
                    sequence = sample.sequence,
                    pressure = sample.pressure,
                    critical = sample.critical,
                    "resonance pressure"
                );
                pressure_signals.push(sample);
            }
        }

        self.total_events += u64::from(event_count);
        self.last_processed = Some((layer, energy));
        debug!(
            layer = layer.get(),
            energy,
            events = event_count,
            signals = pressure_signals.len(),
            "processed layer"
        );

        let below_threshold = energy <= self.config.threshold;
        let mut converged = false;
        if below_threshold && !self.converged {
            info!(
                layer = layer.get(),
                energy,
                threshold = self.config.threshold,
                "energy crossed threshold; triggering transition"
            );
            let receipt = match self.trigger.trigger(layer, energy) {
                Ok(receipt) => receipt,
                Err(err) => {
                    error!(layer = layer.get(), error = %err, "transition trigger failed");
                    self.state = CascadeState::Aborted;
                    return Err(err.into());
                }
            };

            self.converged = true;
            self.state = CascadeState::Converged;
            self.outcome = Some(CascadeOutcome::Converged {
                layer,
                energy,
                total_events: self.total_events,
                receipt,
            });
            converged = true;
        }

        Ok(LayerReport {
            layer,
            energy,
            decay_factor: decay_factor(layer.position(), self.config.coefficient),
            event_count,
            pressure_signals,
            below_threshold,
            converged,
        })
    }

    fn pace(&mut self, layer: LayerIndex) {
        let seconds = self
            .generator
            .profile()
            .sample_jitter(layer.position(), &mut self.clock);
        let delay = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        self.pacer.pause(delay);
    }

    fn finish_exhausted(&mut self) {
        let (final_layer, final_energy) = self.last_processed.unwrap_or_else(|| {
            let layer = LayerIndex::default();
            (layer, self.generator.profile().energy_at(layer.position()))
        });

        info!(
            final_layer = final_layer.get(),
            final_energy,
            threshold = self.config.threshold,
            "schedule exhausted without convergence"
        );
        self.state = CascadeState::Exhausted;
        self.outcome = Some(CascadeOutcome::Exhausted {
            final_layer,
            final_energy,
            threshold: self.config.threshold,
        });
    }
}
