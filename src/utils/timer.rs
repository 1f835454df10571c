//! Cancellable deadline timer
//!
//! Every timed behavior in the core (clipboard sampling, HUD refresh, HUD hide, overlay close
//! delay) is a [`CancellableTimer`]. Timers never run on their own: the coordinating thread
//! polls them with the current [`Instant`], which keeps all mutation on that thread and lets tests
//! drive time explicitly.
//!
//! Starting an armed timer first discards the outstanding deadline, so two timers for the same
//! purpose can never race. Cancelling disarms it, and a disarmed timer never fires again until it
//! is restarted.

use std::time::{Duration, Instant};

/// Smallest interval a timer accepts; shorter intervals are clamped to it
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A restartable timer with an optional limit on how many times it fires per start
#[derive(Debug, Clone)]
pub struct CancellableTimer {
    /// Time between start and the first fire, and between consecutive fires
    interval: Duration,
    /// Maximum number of fires per start (`None` repeats until cancelled)
    limit: Option<u32>,
    /// Next fire time, `None` while disarmed
    deadline: Option<Instant>,
    /// Fires since the last start
    fired: u32,
}

impl CancellableTimer {
    /// Timer that fires once, `delay` after each start
    pub fn one_shot(delay: Duration) -> Self {
        Self::new(delay, Some(1))
    }

    /// Timer that fires every `interval`, at most `limit` times per start
    pub fn repeating(interval: Duration, limit: Option<u32>) -> Self {
        Self::new(interval, limit)
    }

    fn new(interval: Duration, limit: Option<u32>) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            limit,
            deadline: None,
            fired: 0,
        }
    }

    /// Arm the timer from `now`, replacing any outstanding deadline and resetting the fire count
    pub fn start(&mut self, now: Instant) {
        self.fired = 0;
        self.deadline = if self.limit == Some(0) {
            None
        } else {
            Some(now + self.interval)
        };
    }

    /// Disarm the timer. Returns `true` if it was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a fire is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Next fire time, if armed
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Number of fires since the last start
    pub fn fired(&self) -> u32 {
        self.fired
    }

    /// Configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance the timer to `now` and return how many fires elapsed.
    ///
    /// Fires that were missed because the caller polled late are all counted, but never more than
    /// the remaining limit. The timer disarms itself once its limit is reached.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut count = 0;
        while let Some(deadline) = self.deadline {
            if deadline > now {
                break;
            }
            count += 1;
            self.fired += 1;
            if self.limit.is_some_and(|limit| self.fired >= limit) {
                self.deadline = None;
            } else {
                self.deadline = Some(deadline + self.interval);
            }
        }
        count
    }
}

/// Earliest of a set of optional deadlines
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn test_one_shot_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::one_shot(Duration::from_millis(1500));
        timer.start(t0);

        assert_eq!(timer.poll(t0 + Duration::from_millis(1499)), 0);
        assert!(timer.is_armed());
        assert_eq!(timer.poll(t0 + Duration::from_millis(1500)), 1);
        assert!(!timer.is_armed());
        assert_eq!(timer.poll(t0 + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_repeating_respects_limit() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::repeating(TICK, Some(10));
        timer.start(t0);

        let mut total = 0;
        for step in 1..=20 {
            total += timer.poll(t0 + TICK * step);
        }
        assert_eq!(total, 10);
        assert_eq!(timer.fired(), 10);
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_late_poll_counts_missed_fires() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::repeating(TICK, Some(10));
        timer.start(t0);

        assert_eq!(timer.poll(t0 + Duration::from_millis(350)), 3);
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(400)));
        assert_eq!(timer.poll(t0 + Duration::from_secs(5)), 7);
    }

    #[test]
    fn test_restart_resets_deadline_and_count() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::repeating(TICK, Some(3));
        timer.start(t0);
        assert_eq!(timer.poll(t0 + TICK * 2), 2);

        let t1 = t0 + Duration::from_millis(250);
        timer.start(t1);
        assert_eq!(timer.fired(), 0);
        assert_eq!(timer.deadline(), Some(t1 + TICK));
        assert_eq!(timer.poll(t1 + TICK * 3), 3);
    }

    #[test]
    fn test_cancel_disarms() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::one_shot(TICK);
        assert!(!timer.cancel());
        timer.start(t0);
        assert!(timer.cancel());
        assert_eq!(timer.poll(t0 + TICK * 5), 0);
    }

    #[test]
    fn test_unlimited_repeats_until_cancelled() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::repeating(Duration::from_millis(500), None);
        timer.start(t0);
        assert_eq!(timer.poll(t0 + Duration::from_secs(5)), 10);
        assert!(timer.is_armed());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let timer = CancellableTimer::repeating(Duration::ZERO, None);
        assert_eq!(timer.interval(), MIN_INTERVAL);
    }

    #[test]
    fn test_earliest() {
        let t0 = Instant::now();
        assert_eq!(earliest([None, None]), None);
        assert_eq!(earliest([Some(t0 + TICK), None, Some(t0)]), Some(t0));
    }
}
