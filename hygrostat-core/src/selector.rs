//! Outlet Selection Policy
//!
//! ## Overview
//!
//! Translates the target [`Intensity`] into concrete energize and
//! de-energize calls against the outlet roster:
//!
//! - **Off**: everything de-energized, unconditionally.
//! - **Heavy**: every outlet with a tier configured gets energized;
//!   nothing is ever de-energized while Heavy holds, all available
//!   capacity stays in use.
//! - **Light**: keep exactly one outlet running, preferring the Low
//!   tier over High and the least-depleted reservoir within a tier,
//!   while leaving a single healthy running Low outlet alone.
//!
//! ## The Light preference ladder
//!
//! When a fresh pick is needed, candidates are tried in order:
//!
//! 1. least-depleted Low outlet under the error bound
//! 2. least-depleted High outlet under the error bound
//! 3. least-depleted Low outlet regardless of depletion ("desperate")
//! 4. least-depleted High outlet regardless of depletion
//! 5. no outlet configured at all: report unavailable
//!
//! A desperate pick runs a unit the controller believes is nearly
//! empty; it is logged distinctly so the operator can see why the room
//! is not getting any wetter. "Unavailable" is an outcome value, not
//! an error: the control loop keeps running and retries at the next
//! automation tick while the alert indicator is lit.
//!
//! ## Stability rule
//!
//! If exactly one Low outlet is running, no High outlet is, and its
//! reservoir is still under the error bound, selection is a no-op.
//! This is what keeps the relay from cycling every automation tick.
//! The rule deliberately covers only that exact case: a single running
//! High outlet is torn down and reselected even when healthy, because
//! Light prefers moving the load back onto a Low unit.
//!
//! Ties in depletion are broken by outlet index ascending.

use heapless::Vec;

use crate::constants::ERROR_PCT;
use crate::hysteresis::Intensity;
use crate::outlet::{OutletBank, PowerSetting};
use crate::time::Timestamp;

/// One entry in a sorted candidate list
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    depleted: f32,
}

/// What a selection pass did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// Off intensity: all outlets de-energized
    AllOff,
    /// Heavy intensity: every configured outlet energized
    EnergizedAll,
    /// Light: the already-running Low outlet is healthy, no change
    Kept { index: usize },
    /// Light: a fresh healthy outlet was energized
    Energized { index: usize },
    /// Light: only a near-empty outlet was left to energize
    Desperate { index: usize },
    /// No outlet is configured at all; nothing could be energized
    Unavailable,
}

impl SelectionOutcome {
    /// True when the pass ended with no usable outlet
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SelectionOutcome::Unavailable)
    }
}

/// Intensity-to-outlet selection policy
#[derive(Debug, Clone)]
pub struct OutletSelector {
    /// A reservoir at or past `100 - error_pct` depleted is treated as out
    error_pct: f32,
}

impl Default for OutletSelector {
    fn default() -> Self {
        Self { error_pct: ERROR_PCT }
    }
}

impl OutletSelector {
    /// Selector with an explicit exhaustion cutoff
    pub fn new(error_pct: f32) -> Self {
        Self { error_pct }
    }

    /// Apply the target intensity to the roster
    pub fn apply<const N: usize>(
        &self,
        intensity: Intensity,
        bank: &mut OutletBank<N>,
        now: Timestamp,
    ) -> SelectionOutcome {
        match intensity {
            Intensity::Off => {
                bank.deenergize_all(now);
                SelectionOutcome::AllOff
            }
            Intensity::Heavy => {
                for outlet in bank.iter_mut() {
                    if outlet.setting() != PowerSetting::Off && !outlet.is_energized() {
                        outlet.energize(now);
                    }
                }
                SelectionOutcome::EnergizedAll
            }
            Intensity::Light => self.select_light(bank, now),
        }
    }

    /// Light-intensity selection: keep exactly one outlet running
    fn select_light<const N: usize>(
        &self,
        bank: &mut OutletBank<N>,
        now: Timestamp,
    ) -> SelectionOutcome {
        let mut energized_low: Vec<Candidate, N> = Vec::new();
        let mut energized_high: Vec<Candidate, N> = Vec::new();
        let mut all_low: Vec<Candidate, N> = Vec::new();
        let mut all_high: Vec<Candidate, N> = Vec::new();

        for outlet in bank.iter() {
            let candidate = Candidate {
                index: outlet.index(),
                depleted: outlet.depleted_percent(now),
            };
            // Lists are capacity N; pushes cannot overflow
            match outlet.setting() {
                PowerSetting::Low => {
                    let _ = all_low.push(candidate);
                    if outlet.is_energized() {
                        let _ = energized_low.push(candidate);
                    }
                }
                PowerSetting::High => {
                    let _ = all_high.push(candidate);
                    if outlet.is_energized() {
                        let _ = energized_high.push(candidate);
                    }
                }
                PowerSetting::Off => {}
            }
        }

        sort_by_depletion(&mut energized_low);
        sort_by_depletion(&mut energized_high);
        sort_by_depletion(&mut all_low);
        sort_by_depletion(&mut all_high);

        log_debug!(
            "light selection: {} lo / {} hi energized, {} lo / {} hi configured",
            energized_low.len(),
            energized_high.len(),
            all_low.len(),
            all_high.len()
        );

        // Nothing running: pick from scratch
        if energized_low.is_empty() && energized_high.is_empty() {
            return self.energize_preferred(bank, &all_low, &all_high, now);
        }

        // Exactly one Low running, still healthy: leave it alone
        if energized_low.len() == 1 && energized_high.is_empty() {
            let running = energized_low[0];
            if running.depleted < 100.0 - self.error_pct {
                log_debug!("light keeping lo outlet {}", running.index);
                return SelectionOutcome::Kept { index: running.index };
            }
        }

        // A High is running, or several are, or the running Low is out:
        // tear everything down and reselect along the same ladder.
        bank.deenergize_all(now);
        self.energize_preferred(bank, &all_low, &all_high, now)
    }

    /// The preference ladder shared by fresh selection and reselection
    fn energize_preferred<const N: usize>(
        &self,
        bank: &mut OutletBank<N>,
        all_low: &[Candidate],
        all_high: &[Candidate],
        now: Timestamp,
    ) -> SelectionOutcome {
        let bound = 100.0 - self.error_pct;

        for candidates in [all_low, all_high] {
            if let Some(best) = candidates.first() {
                if best.depleted < bound {
                    bank.get_mut(best.index).energize(now);
                    return SelectionOutcome::Energized { index: best.index };
                }
            }
        }

        // No healthy unit; run whatever has the most left in it
        for candidates in [all_low, all_high] {
            if let Some(best) = candidates.first() {
                log_warn!(
                    "desperately energizing outlet {} at {:.1}% depleted",
                    best.index,
                    best.depleted
                );
                bank.get_mut(best.index).energize(now);
                return SelectionOutcome::Desperate { index: best.index };
            }
        }

        log_error!("no outlet available to energize");
        SelectionOutcome::Unavailable
    }
}

/// Ascending by depletion, ties broken by index ascending
fn sort_by_depletion(candidates: &mut [Candidate]) {
    candidates.sort_unstable_by(|a, b| {
        a.depleted
            .total_cmp(&b.depleted)
            .then_with(|| a.index.cmp(&b.index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LOW_PCT_PER_SEC;
    use crate::time::MILLIS_PER_SEC;

    const T0: Timestamp = 1_000_000;

    /// Run an outlet on its own tier long enough to reach roughly
    /// `pct` depleted, leaving it de-energized. Returns the time after
    /// the run.
    fn deplete<const N: usize>(
        bank: &mut OutletBank<N>,
        index: usize,
        pct: f32,
        from: Timestamp,
    ) -> Timestamp {
        let rate = match bank.get(index).setting() {
            PowerSetting::High => crate::constants::HIGH_PCT_PER_SEC,
            _ => LOW_PCT_PER_SEC,
        };
        let secs = (pct / rate) as u64;
        bank.get_mut(index).energize(from);
        let end = from + secs * MILLIS_PER_SEC;
        bank.get_mut(index).deenergize(end);
        end
    }

    fn all_low_bank(now: Timestamp) -> OutletBank<3> {
        OutletBank::new([PowerSetting::Low; 3], now)
    }

    #[test]
    fn off_deenergizes_everything() {
        let selector = OutletSelector::default();
        let mut bank = OutletBank::standard(T0);
        bank.get_mut(0).energize(T0);
        bank.get_mut(2).energize(T0);

        let outcome = selector.apply(Intensity::Off, &mut bank, T0 + 1000);
        assert_eq!(outcome, SelectionOutcome::AllOff);
        assert_eq!(bank.energized_count(), 0);
    }

    #[test]
    fn heavy_energizes_all_configured() {
        let selector = OutletSelector::default();
        let mut bank = OutletBank::new(
            [PowerSetting::Low, PowerSetting::Off, PowerSetting::High],
            T0,
        );

        let outcome = selector.apply(Intensity::Heavy, &mut bank, T0);
        assert_eq!(outcome, SelectionOutcome::EnergizedAll);
        assert!(bank.get(0).is_energized());
        assert!(!bank.get(1).is_energized(), "Off outlets stay off");
        assert!(bank.get(2).is_energized());
    }

    #[test]
    fn heavy_never_deenergizes_across_repeated_calls() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);

        let mut now = T0;
        for _ in 0..10 {
            selector.apply(Intensity::Heavy, &mut bank, now);
            assert_eq!(bank.energized_count(), 3);
            now += 5 * MILLIS_PER_SEC;
        }
    }

    #[test]
    fn light_tie_break_picks_lowest_index() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);

        let outcome = selector.apply(Intensity::Light, &mut bank, T0);
        assert_eq!(outcome, SelectionOutcome::Energized { index: 0 });
        assert!(bank.get(0).is_energized());
        assert_eq!(bank.energized_count(), 1);
    }

    #[test]
    fn light_prefers_least_depleted_low() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);
        let t1 = deplete(&mut bank, 0, 20.0, T0);
        let t2 = deplete(&mut bank, 1, 5.0, t1);

        let outcome = selector.apply(Intensity::Light, &mut bank, t2);
        // Outlet 2 is untouched, outlet 1 at ~5%, outlet 0 at ~20%
        assert_eq!(outcome, SelectionOutcome::Energized { index: 2 });
    }

    #[test]
    fn light_prefers_low_over_fresher_high() {
        let selector = OutletSelector::default();
        let mut bank = OutletBank::new(
            [PowerSetting::High, PowerSetting::Low, PowerSetting::Off],
            T0,
        );
        let t1 = deplete(&mut bank, 1, 50.0, T0);

        let outcome = selector.apply(Intensity::Light, &mut bank, t1);
        assert_eq!(outcome, SelectionOutcome::Energized { index: 1 });
    }

    #[test]
    fn light_keeps_single_healthy_low() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);
        let t1 = deplete(&mut bank, 1, 5.0, T0);
        bank.get_mut(1).energize(t1);

        let outcome = selector.apply(Intensity::Light, &mut bank, t1);
        assert_eq!(outcome, SelectionOutcome::Kept { index: 1 });
        assert!(bank.get(1).is_energized());
        assert_eq!(bank.energized_count(), 1);
    }

    #[test]
    fn light_reselects_when_running_low_is_out() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);
        let t1 = deplete(&mut bank, 0, 95.0, T0);
        bank.get_mut(0).energize(t1);

        let outcome = selector.apply(Intensity::Light, &mut bank, t1);
        // 95% depleted is past 100 - ERROR_PCT: tear down and pick fresh
        assert_eq!(outcome, SelectionOutcome::Energized { index: 1 });
        assert!(!bank.get(0).is_energized());
        assert!(bank.get(1).is_energized());
        assert_eq!(bank.energized_count(), 1);
    }

    #[test]
    fn light_reselects_away_from_healthy_high() {
        // Deliberate asymmetry: a single healthy running High is still
        // torn down in favour of a Low unit.
        let selector = OutletSelector::default();
        let mut bank = OutletBank::standard(T0);
        bank.get_mut(2).energize(T0);

        let outcome = selector.apply(Intensity::Light, &mut bank, T0 + MILLIS_PER_SEC);
        assert_eq!(outcome, SelectionOutcome::Energized { index: 0 });
        assert!(!bank.get(2).is_energized());
    }

    #[test]
    fn light_collapses_multiple_energized_to_one() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);
        bank.get_mut(0).energize(T0);
        bank.get_mut(1).energize(T0);

        let outcome = selector.apply(Intensity::Light, &mut bank, T0 + MILLIS_PER_SEC);
        assert!(matches!(outcome, SelectionOutcome::Energized { .. }));
        assert_eq!(bank.energized_count(), 1);
    }

    #[test]
    fn light_desperate_when_everything_is_out() {
        let selector = OutletSelector::default();
        let mut bank = all_low_bank(T0);
        let mut now = T0;
        for i in 0..3 {
            now = deplete(&mut bank, i, 99.0, now);
        }

        let outcome = selector.apply(Intensity::Light, &mut bank, now);
        assert!(matches!(outcome, SelectionOutcome::Desperate { .. }));
        assert_eq!(bank.energized_count(), 1);
    }

    #[test]
    fn light_unavailable_when_no_outlet_configured() {
        let selector = OutletSelector::default();
        let mut bank = OutletBank::new([PowerSetting::Off; 3], T0);

        let outcome = selector.apply(Intensity::Light, &mut bank, T0);
        assert!(outcome.is_unavailable());
        assert_eq!(bank.energized_count(), 0);
    }

    #[test]
    fn light_falls_back_to_high_when_lows_are_out() {
        let selector = OutletSelector::default();
        let mut bank = OutletBank::standard(T0);
        let mut now = T0;
        for i in [0usize, 1] {
            now = deplete(&mut bank, i, 95.0, now);
        }

        let outcome = selector.apply(Intensity::Light, &mut bank, now);
        assert_eq!(outcome, SelectionOutcome::Energized { index: 2 });
    }
}
