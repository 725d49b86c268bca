//! Cooperative interval timers driven by the frame loop.

/// A recurring timer advanced by frame deltas. Once cancelled it never fires
/// again.
#[derive(Debug, Clone)]
pub struct Interval {
    period: f32,
    elapsed: f32,
    cancelled: bool,
}

impl Interval {
    /// `period` is in seconds and clamped to a small positive minimum.
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(0.001),
            elapsed: 0.0,
            cancelled: false,
        }
    }

    pub fn from_millis(ms: f32) -> Self {
        Self::new(ms / 1000.0)
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Advances the timer by `dt` seconds and returns how many periods
    /// completed.
    pub fn poll(&mut self, dt: f32) -> u32 {
        if self.cancelled {
            return 0;
        }
        self.elapsed += dt.max(0.0);
        let mut fires = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fires += 1;
        }
        fires
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.elapsed = 0.0;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_fires_per_period() {
        let mut interval = Interval::new(1.0);
        assert_eq!(interval.poll(0.5), 0);
        assert_eq!(interval.poll(0.5), 1);
        assert_eq!(interval.poll(2.25), 2);
        assert_eq!(interval.poll(0.75), 1);
    }

    #[test]
    fn test_interval_cancel_is_final() {
        let mut interval = Interval::from_millis(16.0);
        assert_eq!(interval.poll(0.016), 1);
        interval.cancel();
        assert!(interval.is_cancelled());
        assert_eq!(interval.poll(10.0), 0);
    }

    #[test]
    fn test_frame_clock_matches_fixed_step() {
        let dt = 1.0 / 60.0;
        let mut clock = Interval::new(dt);
        for _ in 0..120 {
            assert_eq!(clock.poll(dt), 1);
        }
    }
}
