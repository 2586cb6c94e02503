//! Per-question countdown task.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{Instant, interval_at};

/// Interval between two countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed time unit on the question at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub index: usize,
}

/// Owner of the running countdown task, if any.
///
/// Starting a countdown aborts the previous one, and dropping the timer
/// aborts whatever is running, so at most one task ticks per timer.
pub struct QuestionTimer {
    runtime: Handle,
    period: Duration,
    task: Option<AbortHandle>,
}

impl QuestionTimer {
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            period: TICK_PERIOD,
            task: None,
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Start ticking for the question at `index` into `ticks`.
    pub fn start(&mut self, index: usize, ticks: UnboundedSender<Tick>) {
        self.cancel();
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if ticks.send(Tick { index }).is_err() {
                    break;
                }
            }
        });
        self.task = Some(task.abort_handle());
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
