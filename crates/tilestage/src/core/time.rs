use std::time::Instant;

/// Most updates a single host frame may trigger; any backlog beyond that
/// is dropped.
pub const MAX_CATCH_UP: u32 = 10;

/// Turns variable host frame times into whole world updates of `dt`.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f64,
    banked: f64,
}

impl FixedTimestep {
    pub fn new(dt: f64) -> Self {
        Self { dt, banked: 0.0 }
    }

    /// Bank `frame_dt` seconds and return how many updates are now due.
    pub fn accumulate(&mut self, frame_dt: f64) -> u32 {
        if self.dt <= 0.0 {
            return 0;
        }
        self.banked = (self.banked + frame_dt.max(0.0)).min(self.dt * MAX_CATCH_UP as f64);
        let due = (self.banked / self.dt) as u32;
        self.banked -= due as f64 * self.dt;
        due
    }

    /// Seconds banked towards the next update.
    pub fn remainder(&self) -> f64 {
        self.banked
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

/// Wall-clock bookkeeping for `World::update`.
#[derive(Debug, Default)]
pub(crate) struct FrameClock {
    last: Option<Instant>,
    frame: u64,
}

impl FrameClock {
    pub(crate) const FIRST_DELTA: f64 = 1.0 / 60.0;

    /// Elapsed seconds since the previous tick, `FIRST_DELTA` on the first one.
    pub(crate) fn tick(&mut self, now: Instant) -> f64 {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => Self::FIRST_DELTA,
        };
        self.mark(now);
        delta
    }

    pub(crate) fn mark(&mut self, now: Instant) {
        self.last = Some(now);
        self.frame += 1;
    }

    pub(crate) fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn short_frames_bank_until_an_update_is_due() {
        let mut ts = FixedTimestep::new(DT);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
        assert!(ts.remainder() < DT);
    }

    #[test]
    fn long_stalls_are_capped() {
        let mut ts = FixedTimestep::new(DT);
        assert_eq!(ts.accumulate(2.5), MAX_CATCH_UP);
        assert_eq!(ts.accumulate(DT), 1);
    }

    #[test]
    fn negative_frames_and_zero_dt_run_nothing() {
        let mut ts = FixedTimestep::new(DT);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.remainder(), 0.0);
        assert_eq!(FixedTimestep::new(0.0).accumulate(1.0), 0);
    }

    #[test]
    fn first_tick_uses_default_delta() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        assert_eq!(clock.tick(start), FrameClock::FIRST_DELTA);
        let later = start + Duration::from_millis(50);
        let delta = clock.tick(later);
        assert!((delta - 0.05).abs() < 1e-9);
        assert_eq!(clock.frame(), 2);
    }
}
