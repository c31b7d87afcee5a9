// ABOUTME: Bounded polling: repeat a probe until it yields a value or a deadline passes.
// ABOUTME: Used by the shutdown waits and detached exec completion.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Interval between probes and the overall bound on waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// How a bounded poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Satisfied(T),
    TimedOut,
}

impl<T> PollOutcome<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied(_))
    }
}

/// Runs `probe` until it returns `Some`, an error, or the schedule's timeout elapses.
///
/// The probe always runs at least once, even with a zero timeout. Sleeps never
/// overshoot the deadline.
pub async fn poll_until<T, E, F, Fut>(
    schedule: PollSchedule,
    mut probe: F,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + schedule.timeout;

    loop {
        if let Some(value) = probe().await? {
            return Ok(PollOutcome::Satisfied(value));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(PollOutcome::TimedOut);
        }

        tokio::time::sleep(schedule.interval.min(deadline - now)).await;
    }
}
