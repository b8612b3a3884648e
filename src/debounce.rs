//! Cancelable deferred redraws
//!
//! Rapid size changes coalesce into one redraw: every request cancels the
//! pending one and restarts the quiet period. The scheduler takes `now`
//! explicitly, so the browser can drive it from its own timer and tests
//! can step through time without sleeping.

use web_time::{Duration, Instant};

/// Default quiet period before a redraw fires.
pub const DEFAULT_REDRAW_DELAY: Duration = Duration::from_millis(1000);

/// A scheduled redraw. Owned by the scheduler; replacing it cancels it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRedraw<T> {
    id: u64,
    deadline: Instant,
    value: T,
}

impl<T> PendingRedraw<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Holds at most one pending redraw.
#[derive(Debug, Clone)]
pub struct RedrawScheduler<T> {
    quiet: Duration,
    next_id: u64,
    pending: Option<PendingRedraw<T>>,
}

impl<T> RedrawScheduler<T> {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, next_id: 0, pending: None }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Cancel whatever is pending and schedule `value` for `now + quiet`.
    ///
    /// Returns the id of the new pending redraw.
    pub fn request(&mut self, value: T, now: Instant) -> u64 {
        self.next_id += 1;
        self.pending = Some(PendingRedraw { id: self.next_id, deadline: now + self.quiet, value });
        self.next_id
    }

    /// Fire the pending redraw if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Fire the pending redraw immediately, regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Drop the pending redraw without running it.
    pub fn cancel(&mut self) -> Option<PendingRedraw<T>> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRedraw<T>> {
        self.pending.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Time left until the pending redraw is due (zero if overdue).
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline().map(|d| d.saturating_duration_since(now))
    }
}

impl<T> Default for RedrawScheduler<T> {
    fn default() -> Self {
        Self::new(DEFAULT_REDRAW_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_request_fires_after_quiet_period() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(ms(100));
        scheduler.request(1, start);

        assert_eq!(scheduler.poll(start + ms(99)), None);
        assert_eq!(scheduler.poll(start + ms(100)), Some(1));
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.poll(start + ms(500)), None);
    }

    #[test]
    fn test_rapid_requests_coalesce_into_one_redraw() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(ms(1000));
        let mut fired = Vec::new();

        for (offset, width) in [(0, 10), (200, 20), (400, 30)] {
            let now = start + ms(offset);
            fired.extend(scheduler.poll(now));
            scheduler.request(width, now);
        }

        // Walk the clock forward past the last deadline
        for step in 0..30 {
            fired.extend(scheduler.poll(start + ms(400 + step * 100)));
        }

        assert_eq!(fired, vec![30]);
    }

    #[test]
    fn test_new_request_restarts_quiet_period() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(ms(100));
        scheduler.request("a", start);
        scheduler.request("b", start + ms(90));

        assert_eq!(scheduler.poll(start + ms(150)), None);
        assert_eq!(scheduler.poll(start + ms(190)), Some("b"));
    }

    #[test]
    fn test_request_ids_increase() {
        let now = Instant::now();
        let mut scheduler = RedrawScheduler::new(ms(10));
        let first = scheduler.request((), now);
        let second = scheduler.request((), now);
        assert!(second > first);
        assert_eq!(scheduler.pending().map(|p| p.id()), Some(second));
    }

    #[test]
    fn test_cancel_and_flush() {
        let now = Instant::now();
        let mut scheduler = RedrawScheduler::new(ms(10));

        scheduler.request(5, now);
        let cancelled = scheduler.cancel().unwrap();
        assert_eq!(*cancelled.value(), 5);
        assert_eq!(scheduler.poll(now + ms(20)), None);

        scheduler.request(6, now);
        assert_eq!(scheduler.flush(), Some(6));
        assert_eq!(scheduler.flush(), None);
    }

    #[test]
    fn test_remaining() {
        let now = Instant::now();
        let mut scheduler = RedrawScheduler::new(ms(100));
        assert_eq!(scheduler.remaining(now), None);
        scheduler.request(0, now);
        assert_eq!(scheduler.remaining(now + ms(40)), Some(ms(60)));
        assert_eq!(scheduler.remaining(now + ms(400)), Some(Duration::ZERO));
    }
}
