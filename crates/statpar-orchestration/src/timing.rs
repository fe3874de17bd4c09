//! Monotonic timing of the creation and total phases.

use std::time::{Duration, Instant};

/// A closed window `[start, end]` on the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSample {
    start: Instant,
    end: Instant,
}

impl TimingSample {
    /// Window between two instants; an `end` before `start` collapses to empty.
    #[must_use]
    pub fn new(start: Instant, end: Instant) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Zero-length window at the current instant.
    #[must_use]
    pub fn instant() -> Self {
        let now = Instant::now();
        Self::new(now, now)
    }

    #[must_use]
    pub fn start(&self) -> Instant {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Instant {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Duration in milliseconds with sub-millisecond precision.
    #[must_use]
    pub fn as_millis_f64(&self) -> f64 {
        self.duration().as_secs_f64() * 1000.0
    }

    /// Whether `other` lies entirely inside this window.
    #[must_use]
    pub fn contains(&self, other: &TimingSample) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Clock for one run: both phases start at the same instant.
#[derive(Debug)]
pub struct RunClock {
    start: Instant,
    creation_end: Option<Instant>,
}

impl RunClock {
    /// Start the creation and total timers together.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            creation_end: None,
        }
    }

    /// Stop the creation timer. Later calls keep the first mark.
    pub fn mark_created(&mut self) {
        self.creation_end.get_or_insert_with(Instant::now);
    }

    /// Stop the total timer, returning `(creation, total)`.
    ///
    /// A clock that never marked creation reports an empty creation window.
    #[must_use]
    pub fn finish(self) -> (TimingSample, TimingSample) {
        let end = Instant::now();
        let created = self.creation_end.unwrap_or(self.start);
        (
            TimingSample::new(self.start, created),
            TimingSample::new(self.start, end),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_window_inside_total() {
        let mut clock = RunClock::start();
        clock.mark_created();
        std::thread::sleep(Duration::from_millis(2));
        let (creation, total) = clock.finish();
        assert_eq!(creation.start(), total.start());
        assert!(total.contains(&creation));
        assert!(creation.as_millis_f64() <= total.as_millis_f64());
        assert!(total.as_millis_f64() >= 2.0);
    }

    #[test]
    fn unmarked_creation_is_empty() {
        let (creation, total) = RunClock::start().finish();
        assert_eq!(creation.duration(), Duration::ZERO);
        assert!(total.contains(&creation));
    }

    #[test]
    fn first_mark_wins() {
        let mut clock = RunClock::start();
        clock.mark_created();
        let first = clock.creation_end;
        std::thread::sleep(Duration::from_millis(1));
        clock.mark_created();
        assert_eq!(clock.creation_end, first);
    }

    #[test]
    fn reversed_instants_collapse() {
        let later = Instant::now();
        let earlier = later.checked_sub(Duration::from_millis(5)).unwrap_or(later);
        let sample = TimingSample::new(later, earlier);
        assert_eq!(sample.duration(), Duration::ZERO);
    }

    #[test]
    fn millis_have_sub_millisecond_precision() {
        let start = Instant::now();
        let sample = TimingSample::new(start, start + Duration::from_micros(1_500));
        assert!((sample.as_millis_f64() - 1.5).abs() < 1e-9);
    }
}
