use decay_cascade_core::{LayerIndex, TransitionError, TransitionReceipt};

/// Capability invoked exactly once when the cascade converges.
///
/// Implementations own whatever external effect the transition represents.
/// Returning an error aborts the run; the controller never retries.
pub trait TransitionTrigger {
    /// Fires the transition for `layer`, observed at `energy`.
    fn trigger(
        &mut self,
        layer: LayerIndex,
        energy: f64,
    ) -> Result<TransitionReceipt, TransitionError>;
}

impl<F> TransitionTrigger for F
where
    F: FnMut(LayerIndex, f64) -> Result<TransitionReceipt, TransitionError>,
{
    fn trigger(
        &mut self,
        layer: LayerIndex,
        energy: f64,
    ) -> Result<TransitionReceipt, TransitionError> {
        self(layer, energy)
    }
}

/// Trigger that records the transition without touching the host system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedTransition;

impl TransitionTrigger for SimulatedTransition {
    fn trigger(
        &mut self,
        layer: LayerIndex,
        energy: f64,
    ) -> Result<TransitionReceipt, TransitionError> {
        Ok(TransitionReceipt {
            layer,
            energy,
            effect: "simulated phase transition; no process privileges were changed".to_owned(),
        })
    }
}
