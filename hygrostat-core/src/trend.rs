//! RH Trend Estimation
//!
//! Smooths the noisy RH history into a three-state directional signal
//! for the status screen arrow. The estimator compares the average of
//! the newest `k` readings against the average of the `k` readings
//! before them; a block-average delta beyond a small threshold counts
//! as a direction, anything less is flat. Averaging over blocks rather
//! than comparing single readings keeps one noisy sample from flipping
//! the arrow.
//!
//! Unset history slots (the zero-as-unset convention of
//! [`crate::history`]) are excluded from each block's average. If the
//! older block has no real samples at all there is not enough history
//! to call a direction, and the trend reads Even.

use crate::constants::{RH_TREND_DELTA, RH_TREND_WINDOW};
use crate::history::RhHistory;

/// Direction of the recent RH movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(i8)]
pub enum Trend {
    /// RH is dropping
    Falling = -1,
    /// No clear direction, or not enough history
    Even = 0,
    /// RH is climbing
    Rising = 1,
}

impl Trend {
    /// Human-readable name, for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Trend::Falling => "falling",
            Trend::Even => "even",
            Trend::Rising => "rising",
        }
    }
}

/// Block-average trend estimator
#[derive(Debug, Clone)]
pub struct TrendEstimator {
    /// Readings per block
    window: usize,

    /// Delta beyond which the trend counts as rising/falling
    delta: f32,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self {
            window: RH_TREND_WINDOW,
            delta: RH_TREND_DELTA,
        }
    }
}

impl TrendEstimator {
    /// Estimator with a custom block size and delta threshold
    pub fn new(window: usize, delta: f32) -> Self {
        Self { window, delta }
    }

    /// Estimate the trend from the tail of the history
    ///
    /// Compares slots `[N-2k, N-k)` against `[N-k, N)`. The history
    /// must be at least two windows wide.
    pub fn estimate<const N: usize>(&self, history: &RhHistory<N>) -> Trend {
        let k = self.window;
        debug_assert!(N >= 2 * k, "history narrower than two trend windows");

        let older_avg = match block_average(history, N - 2 * k, N - k) {
            Some(avg) => avg,
            None => {
                log_debug!("too few RH readings to trend");
                return Trend::Even;
            }
        };
        let newest_avg = match block_average(history, N - k, N) {
            Some(avg) => avg,
            None => return Trend::Even,
        };

        let delta = newest_avg - older_avg;
        let trend = if delta < -self.delta {
            Trend::Falling
        } else if delta > self.delta {
            Trend::Rising
        } else {
            Trend::Even
        };

        log_debug!(
            "RH older avg = {:.4}, newest avg = {:.4}, delta = {:.4}, trend = {}",
            older_avg,
            newest_avg,
            delta,
            trend.name()
        );
        trend
    }
}

/// Average of the real (nonzero) readings in `[from, to)`, if any
fn block_average<const N: usize>(history: &RhHistory<N>, from: usize, to: usize) -> Option<f32> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for i in from..to {
        let rh = history.slot(i);
        if rh > 0.0 {
            sum += rh;
            count += 1;
        }
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_from(readings: &[f32]) -> RhHistory<20> {
        let mut history = RhHistory::new();
        for &rh in readings {
            history.record(rh);
        }
        history
    }

    #[test]
    fn rising_when_newest_block_is_higher() {
        // older block averages 60, newest 61 -> delta 1.0
        let history = history_from(&[60.0, 60.0, 60.0, 60.0, 60.0, 61.0, 61.0, 61.0, 61.0, 61.0]);
        let trend = TrendEstimator::default().estimate(&history);
        assert_eq!(trend, Trend::Rising);
    }

    #[test]
    fn falling_when_newest_block_is_lower() {
        let history = history_from(&[60.0, 60.0, 60.0, 60.0, 60.0, 58.0, 58.0, 58.0, 58.0, 58.0]);
        let trend = TrendEstimator::default().estimate(&history);
        assert_eq!(trend, Trend::Falling);
    }

    #[test]
    fn even_within_delta_threshold() {
        let history = history_from(&[60.0, 60.0, 60.0, 60.0, 60.0, 60.1, 60.1, 60.1, 60.1, 60.1]);
        let trend = TrendEstimator::default().estimate(&history);
        assert_eq!(trend, Trend::Even);
    }

    #[test]
    fn even_without_older_samples() {
        // Only 5 readings: the newest block is populated but the older
        // block is entirely unset slots.
        let history = history_from(&[61.0, 61.0, 61.0, 61.0, 61.0]);
        let trend = TrendEstimator::default().estimate(&history);
        assert_eq!(trend, Trend::Even);
    }

    #[test]
    fn partial_older_block_still_trends() {
        // 7 readings: two land in the older block, five in the newest.
        let history = history_from(&[58.0, 58.0, 63.0, 63.0, 63.0, 63.0, 63.0]);
        let trend = TrendEstimator::default().estimate(&history);
        assert_eq!(trend, Trend::Rising);
    }

    #[test]
    fn empty_history_is_even() {
        let history: RhHistory<20> = RhHistory::new();
        let trend = TrendEstimator::default().estimate(&history);
        assert_eq!(trend, Trend::Even);
    }
}
