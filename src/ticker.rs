//! Gravity timer: decides when a fast polling loop should let the piece fall.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    floor: Duration,
    step: Duration,
    last: Option<Instant>,
}

impl Ticker {
    /// `step` is how much faster gravity gets per cleared line; `floor` is the fastest it goes.
    pub fn new(interval: Duration, floor: Duration, step: Duration) -> Self {
        Self {
            interval: interval.max(floor),
            floor,
            step,
            last: None,
        }
    }

    /// True (and restarts the interval) if this is the first call or a full
    /// interval has passed since the last gravity step.
    pub fn elapsed(&mut self, now: Instant) -> bool {
        let due = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Push the next gravity step a full interval past `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn speed_up(&mut self, lines: u32) {
        self.interval = self
            .interval
            .saturating_sub(self.step.saturating_mul(lines))
            .max(self.floor);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> Ticker {
        Ticker::new(
            Duration::from_millis(1000),
            Duration::from_millis(300),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_first_call_is_due() {
        let mut t = ticker();
        assert!(t.elapsed(Instant::now()));
    }

    #[test]
    fn test_gating() {
        let mut t = ticker();
        let start = Instant::now();
        assert!(t.elapsed(start));
        assert!(!t.elapsed(start + Duration::from_millis(999)));
        assert!(t.elapsed(start + Duration::from_millis(1000)));
        assert!(!t.elapsed(start + Duration::from_millis(1500)));
        assert!(t.elapsed(start + Duration::from_millis(2000)));
    }

    #[test]
    fn test_reset_delays_next_step() {
        let mut t = ticker();
        let start = Instant::now();
        assert!(t.elapsed(start));
        t.reset(start + Duration::from_millis(800));
        assert!(!t.elapsed(start + Duration::from_millis(1200)));
        assert!(t.elapsed(start + Duration::from_millis(1800)));
    }

    #[test]
    fn test_speed_up_is_floored() {
        let mut t = ticker();
        t.speed_up(1);
        assert_eq!(t.interval(), Duration::from_millis(990));
        t.speed_up(4);
        assert_eq!(t.interval(), Duration::from_millis(950));
        for _ in 0..100 {
            t.speed_up(4);
        }
        assert_eq!(t.interval(), Duration::from_millis(300));
    }
}
