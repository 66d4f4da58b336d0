//! Tick timing for the soft real-time control loop.
//!
//! Each tick sleeps for whatever is left of the period after its own work.
//! A tick that overruns starts the next one immediately, so lateness never
//! accumulates into a backlog.

use crate::error::{TwinError, TwinResult};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSchedule {
    period: Duration,
    overruns: u64,
}

impl TickSchedule {
    pub fn new(period: Duration) -> TwinResult<Self> {
        if period.is_zero() {
            return Err(TwinError::Config("tick period must be positive".to_string()));
        }
        Ok(Self {
            period,
            overruns: 0,
        })
    }

    pub fn from_secs_f64(period_s: f64) -> TwinResult<Self> {
        if !(period_s.is_finite() && period_s > 0.0) {
            return Err(TwinError::Config(format!(
                "tick period must be positive and finite, got {period_s} s"
            )));
        }
        Self::new(Duration::from_secs_f64(period_s))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks whose work took at least a full period.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Time to sleep after a tick whose work took `elapsed`.
    pub fn delay_after(&mut self, elapsed: Duration) -> Duration {
        if elapsed >= self.period {
            self.overruns += 1;
        }
        self.period.saturating_sub(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sleeps_for_remainder_of_period() {
        let mut schedule = TickSchedule::from_secs_f64(1.0).unwrap();
        assert_eq!(
            schedule.delay_after(Duration::from_millis(250)),
            Duration::from_millis(750)
        );
        assert_eq!(schedule.overruns(), 0);
    }

    #[test]
    fn overrun_gives_zero_delay() {
        let mut schedule = TickSchedule::from_secs_f64(0.1).unwrap();
        assert_eq!(schedule.delay_after(Duration::from_millis(300)), Duration::ZERO);
        assert_eq!(schedule.overruns(), 1);
    }

    #[test]
    fn rejects_non_positive_period() {
        assert!(TickSchedule::from_secs_f64(0.0).is_err());
        assert!(TickSchedule::from_secs_f64(f64::NAN).is_err());
        assert!(TickSchedule::new(Duration::ZERO).is_err());
    }

    proptest! {
        #[test]
        fn delay_never_exceeds_period(period_ms in 1u64..5_000, elapsed_ms in 0u64..10_000) {
            let mut schedule = TickSchedule::new(Duration::from_millis(period_ms)).unwrap();
            let elapsed = Duration::from_millis(elapsed_ms);
            let delay = schedule.delay_after(elapsed);
            prop_assert!(delay <= schedule.period());
            if elapsed < schedule.period() {
                prop_assert_eq!(delay + elapsed, schedule.period());
                prop_assert_eq!(schedule.overruns(), 0);
            } else {
                prop_assert_eq!(delay, Duration::ZERO);
                prop_assert_eq!(schedule.overruns(), 1);
            }
        }
    }
}
