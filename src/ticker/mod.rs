mod clock;

use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

pub use clock::{Clock, SystemClock};

#[derive(Debug, Error)]
pub enum TickerError {
    #[error("ticker already running")]
    AlreadyRunning,
    #[error("tick period must be non-zero")]
    ZeroPeriod,
}

/// A callback run on a fixed period from a tokio task. The first tick is
/// immediate; ticks missed while the callback was busy are skipped.
#[derive(Debug)]
pub struct IntervalTask {
    stop_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl IntervalTask {
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Result<Self, TickerError>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(TickerError::ZeroPeriod);
        }
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let join = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticks.tick() => on_tick(),
                }
            }
        });

        Ok(Self {
            stop_tx: Some(stop_tx),
            join,
        })
    }

    /// Ask the task to stop without waiting for it.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub async fn stop(mut self) {
        self.cancel();
        let _ = (&mut self.join).await;
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Holds at most one running [`IntervalTask`].
#[derive(Debug, Default)]
pub struct Ticker {
    task: Option<IntervalTask>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<F>(&mut self, period: Duration, on_tick: F) -> Result<(), TickerError>
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_running() {
            return Err(TickerError::AlreadyRunning);
        }
        self.task = Some(IntervalTask::spawn(period, on_tick)?);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.stop().await;
        }
    }
}
