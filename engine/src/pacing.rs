use std::{thread, time::Duration};

/// Suspends the cascade between two layers.
pub trait Pacer {
    /// Blocks for (roughly) `delay`.
    fn pause(&mut self, delay: Duration);
}

impl<F> Pacer for F
where
    F: FnMut(Duration),
{
    fn pause(&mut self, delay: Duration) {
        self(delay);
    }
}

/// Pacer that sleeps the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Pacer that returns immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&mut self, _delay: Duration) {}
}
