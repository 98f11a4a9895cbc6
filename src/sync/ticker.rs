use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

/// A cancellable periodic task.
///
/// Each tick spawns the cycle as its own task, so a slow cycle never holds
/// back the next one, and stopping the ticker never cancels a cycle that is
/// already running.
pub struct Ticker {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    /// Run `cycle` every `period`, replacing any previous schedule.
    ///
    /// The first cycle fires one period from now. A zero period only stops
    /// the current schedule.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<F, Fut>(&mut self, period: Duration, cycle: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        if period.is_zero() {
            tracing::warn!(ticker = self.name, "Refusing to schedule with a zero period");
            return;
        }

        let name = self.name;
        tracing::debug!(ticker = name, ?period, "Starting ticker");

        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = IntervalStream::new(interval);

            while ticks.next().await.is_some() {
                tracing::trace!(ticker = name, "Tick");
                tokio::spawn(cycle());
            }
        }));
    }

    /// Cancel the schedule. Returns whether one was active.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!(ticker = self.name, "Stopped ticker");
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
