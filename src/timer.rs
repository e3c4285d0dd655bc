//! Countdown ticker.
//!
//! The timer never touches game state. It only injects [`TimerTick`]s into the
//! engine's command queue; the engine decrements and decides when to stop.

use std::time::Duration;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A tick tagged with the run that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub epoch: u64,
}

/// Owns at most one running ticker.
///
/// Every start and cancel bumps the epoch, so a tick already queued by a
/// cancelled run is recognised as stale and ignored.
#[derive(Debug)]
pub struct TimerService {
    period: Duration,
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

impl TimerService {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            epoch: 0,
            task: None,
        }
    }

    /// Cancel any running ticker and start a new one. Returns the new epoch.
    pub fn start<T>(&mut self, ticks: WeakUnboundedSender<T>) -> u64
    where
        T: From<TimerTick> + Send + 'static,
    {
        self.cancel();
        let epoch = self.epoch;
        let period = self.period;

        self.task = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(tx) = ticks.upgrade() else {
                    break;
                };
                if tx.send(T::from(TimerTick { epoch })).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!("Timer started (epoch {})", epoch);
        epoch
    }

    pub fn cancel(&mut self) {
        self.epoch += 1;
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Timer cancelled");
        }
    }

    /// Whether a tick belongs to the current run
    pub fn accepts(&self, tick: TimerTick) -> bool {
        self.task.is_some() && tick.epoch == self.epoch
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel::<TimerTick>();
        let mut timer = TimerService::default();
        let epoch = timer.start(tx.downgrade());
        let started = Instant::now();

        for n in 1..=3u32 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick.epoch, epoch);
            assert!(timer.accepts(tick));
            let elapsed = started.elapsed();
            assert!(elapsed >= TICK_PERIOD * n && elapsed < TICK_PERIOD * (n + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_invalidates_previous_run() {
        let (tx, mut rx) = mpsc::unbounded_channel::<TimerTick>();
        let mut timer = TimerService::default();

        let first = timer.start(tx.downgrade());
        let stale = rx.recv().await.unwrap();
        assert_eq!(stale.epoch, first);

        let second = timer.start(tx.downgrade());
        assert_ne!(first, second);
        assert!(!timer.accepts(stale));

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.epoch, second);
        assert!(timer.accepts(tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel::<TimerTick>();
        let mut timer = TimerService::default();
        let epoch = timer.start(tx.downgrade());
        assert!(timer.accepts(TimerTick { epoch }));

        timer.cancel();
        assert!(!timer.accepts(TimerTick { epoch }));

        let waited = tokio::time::timeout(TICK_PERIOD * 5, rx.recv()).await;
        assert!(waited.is_err(), "no tick expected after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_receiver_side_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<TimerTick>();
        let mut timer = TimerService::default();
        timer.start(tx.downgrade());
        drop(tx);
        drop(rx);

        tokio::time::sleep(TICK_PERIOD * 2).await;
        let task = timer.task.take().unwrap();
        assert!(task.is_finished());
    }
}
