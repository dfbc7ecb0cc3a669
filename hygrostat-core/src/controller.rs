//! Top-Level Control Loop State
//!
//! ## Overview
//!
//! [`Controller`] owns everything that persists across loop iterations:
//! thresholds, the current intensity, the outlet roster, the RH history
//! and the schedule deadlines. The host loop is a thin shell around it:
//!
//! ```text
//! loop {
//!     match controller.poll(clock.now()) {
//!         Some(Task::SampleRh)       => controller.update_rh(&mut sensor, &mut pause),
//!         Some(Task::Automate)       => { controller.automate(now); }
//!         Some(Task::RefreshDisplay) => display.render(&controller.snapshot(now)),
//!         Some(Task::Heartbeat) | None => {}
//!     }
//!     controller.sync_relays(&mut relays);
//! }
//! ```
//!
//! `poll` hands back at most one due task per call, most urgent first,
//! so a slow display redraw never starves the sensor read that was due
//! in the same iteration.
//!
//! ## Relay shadowing
//!
//! The roster tracks *desired* energization;
//! [`Controller::sync_relays`] diffs it against a shadow of what the
//! hardware was last told and writes only the lines that changed.
//! Relay coils are mechanical, so redundant writes are never sent.

use crate::constants::{
    AUTOMATE_SECS, AUTOMATE_STARTUP_GRACE_SECS, DISPLAY_REFRESH_SECS, HEARTBEAT_MS, RH_DEBOUNCE,
    RH_HISTORY_SLOTS, RH_UPDATE_SECS,
};
use crate::display::{OutletStatus, StatusSnapshot};
use crate::history::RhHistory;
use crate::hysteresis::{next_intensity, Intensity, Thresholds};
use crate::outlet::{OutletBank, PowerSetting};
use crate::sampler::{HumiditySensor, RhSampler};
use crate::selector::{OutletSelector, SelectionOutcome};
use crate::time::{Pause, Timestamp, MILLIS_PER_SEC};
use crate::trend::TrendEstimator;

/// The relay board behind the outlets
pub trait RelayDriver {
    /// Drive one relay line. Called only when the desired state differs
    /// from what the hardware was last told.
    fn set_outlet_energized(&mut self, index: usize, energized: bool);
}

/// One unit of due work, returned by [`Controller::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Read the sensor and record a new RH reading
    SampleRh,
    /// Re-evaluate intensity and outlet selection
    Automate,
    /// Redraw the status screen
    RefreshDisplay,
    /// Toggle the heartbeat indicator
    Heartbeat,
}

/// All controller state that lives across loop iterations
#[derive(Debug)]
pub struct Controller<const N: usize> {
    thresholds: Thresholds,
    intensity: Intensity,
    bank: OutletBank<N>,
    history: RhHistory<RH_HISTORY_SLOTS>,
    trend: TrendEstimator,
    selector: OutletSelector,
    sampler: RhSampler,

    current_rh: f32,
    alert: bool,
    heartbeat_on: bool,

    /// Energization last written to the hardware, per relay line
    relay_shadow: [bool; N],

    /// Set when state shown on the status screen changed; forces the
    /// next poll to hand out a refresh ahead of its regular cadence
    refresh_due: bool,

    next_sample_at: Timestamp,
    next_automate_at: Timestamp,
    next_refresh_at: Timestamp,
    next_heartbeat_at: Timestamp,
}

impl Controller<3> {
    /// Controller for the shipped three-outlet hardware
    pub fn standard(now: Timestamp) -> Self {
        Self::new(OutletBank::standard(now), now)
    }
}

impl<const N: usize> Controller<N> {
    /// New controller around an outlet roster
    ///
    /// The first sensor read and display refresh are due immediately;
    /// the first automation pass waits out the startup grace so a
    /// reading exists before any relay decision.
    pub fn new(bank: OutletBank<N>, now: Timestamp) -> Self {
        Self {
            thresholds: Thresholds::default(),
            intensity: Intensity::Off,
            bank,
            history: RhHistory::new(),
            trend: TrendEstimator::default(),
            selector: OutletSelector::default(),
            sampler: RhSampler::default(),
            current_rh: 0.0,
            alert: false,
            heartbeat_on: false,
            relay_shadow: [false; N],
            refresh_due: false,
            next_sample_at: now,
            next_automate_at: now + AUTOMATE_STARTUP_GRACE_SECS * MILLIS_PER_SEC,
            next_refresh_at: now,
            next_heartbeat_at: now + HEARTBEAT_MS,
        }
    }

    // --- scheduling -------------------------------------------------------

    /// Hand out the most urgent due task, if any, and reschedule it
    ///
    /// At most one task per call. Order: sensor read, automation,
    /// display refresh, heartbeat.
    pub fn poll(&mut self, now: Timestamp) -> Option<Task> {
        if now >= self.next_sample_at {
            self.next_sample_at = now + RH_UPDATE_SECS * MILLIS_PER_SEC;
            return Some(Task::SampleRh);
        }
        if now >= self.next_automate_at {
            self.next_automate_at = now + AUTOMATE_SECS * MILLIS_PER_SEC;
            return Some(Task::Automate);
        }
        if self.refresh_due || now >= self.next_refresh_at {
            self.refresh_due = false;
            self.next_refresh_at = now + DISPLAY_REFRESH_SECS * MILLIS_PER_SEC;
            return Some(Task::RefreshDisplay);
        }
        if now >= self.next_heartbeat_at {
            self.next_heartbeat_at = now + HEARTBEAT_MS;
            self.heartbeat_on = !self.heartbeat_on;
            return Some(Task::Heartbeat);
        }
        None
    }

    // --- sensor path ------------------------------------------------------

    /// Read the sensor (retrying until it succeeds) and record the result
    pub fn update_rh<S: HumiditySensor, P: Pause>(&mut self, sensor: &mut S, pause: &mut P) -> f32 {
        let rh = self.sampler.read_with_retry(sensor, pause);
        self.record_reading(rh);
        rh
    }

    /// Record an averaged RH reading directly
    pub fn record_reading(&mut self, rh: f32) {
        log_info!("RH {:.2}", rh);
        self.history.record(rh);
        self.current_rh = rh;
        self.refresh_due = true;
    }

    // --- automation -------------------------------------------------------

    /// One automation pass: step the intensity, then apply it to the
    /// roster. A no-op until the first reading exists.
    pub fn automate(&mut self, now: Timestamp) -> SelectionOutcome {
        if self.history.is_empty() {
            return SelectionOutcome::AllOff;
        }

        let next = next_intensity(self.intensity, self.current_rh, &self.thresholds, RH_DEBOUNCE);
        let outcome = self.selector.apply(next, &mut self.bank, now);

        if next != self.intensity {
            self.intensity = next;
            self.refresh_due = true;
        }
        let unavailable = outcome.is_unavailable();
        if unavailable != self.alert {
            self.alert = unavailable;
            self.refresh_due = true;
        }
        outcome
    }

    /// Push desired energization to the hardware, changed lines only
    pub fn sync_relays<D: RelayDriver>(&mut self, driver: &mut D) {
        for outlet in self.bank.iter() {
            let desired = outlet.is_energized();
            if self.relay_shadow[outlet.index()] != desired {
                driver.set_outlet_energized(outlet.index(), desired);
                self.relay_shadow[outlet.index()] = desired;
                self.refresh_due = true;
            }
        }
    }

    // --- configuration ----------------------------------------------------

    /// The live RH thresholds
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Install new thresholds, typically from a committed menu edit
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
        self.refresh_due = true;
    }

    /// Change the on threshold alone. Ordering against `low_rh` is the
    /// configuration UI's responsibility.
    pub fn set_on_rh(&mut self, on_rh: f32) {
        self.thresholds.on_rh = on_rh;
        self.refresh_due = true;
    }

    /// Change the low threshold alone
    pub fn set_low_rh(&mut self, low_rh: f32) {
        self.thresholds.low_rh = low_rh;
        self.refresh_due = true;
    }

    /// Change an outlet's capacity tier
    pub fn set_outlet_power(&mut self, index: usize, setting: PowerSetting, now: Timestamp) {
        self.bank.get_mut(index).set_power(setting, now);
        self.refresh_due = true;
    }

    /// Mark one reservoir refilled
    pub fn refill_outlet(&mut self, index: usize, now: Timestamp) {
        self.bank.get_mut(index).refill(now);
        self.refresh_due = true;
    }

    /// Mark every reservoir refilled
    pub fn refill_all(&mut self, now: Timestamp) {
        self.bank.refill_all(now);
        self.refresh_due = true;
    }

    // --- status -----------------------------------------------------------

    /// Most recent averaged RH reading (0.0 before the first read)
    pub fn current_rh(&self) -> f32 {
        self.current_rh
    }

    /// Current humidifying intensity
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// True while the selector has no outlet to energize
    pub fn alert(&self) -> bool {
        self.alert
    }

    /// The outlet roster
    pub fn bank(&self) -> &OutletBank<N> {
        &self.bank
    }

    /// Capture everything the status screen needs at one instant
    pub fn snapshot(&self, now: Timestamp) -> StatusSnapshot<N> {
        let mut index = 0;
        let outlets = [(); N].map(|()| {
            let status = OutletStatus::of(self.bank.get(index), now);
            index += 1;
            status
        });

        StatusSnapshot {
            rh: self.current_rh,
            trend: self.trend.estimate(&self.history),
            intensity: self.intensity,
            alert: self.alert,
            heartbeat: self.heartbeat_on,
            history: self.history.to_slots(),
            outlets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::BarLevel;

    const T0: Timestamp = 1_000_000;

    #[derive(Default)]
    struct SpyRelays {
        writes: std::vec::Vec<(usize, bool)>,
    }

    impl RelayDriver for SpyRelays {
        fn set_outlet_energized(&mut self, index: usize, energized: bool) {
            self.writes.push((index, energized));
        }
    }

    #[test]
    fn first_tasks_in_priority_order() {
        let mut controller = Controller::standard(T0);

        // Sample and refresh are both due at T0; sample wins, refresh next
        assert_eq!(controller.poll(T0), Some(Task::SampleRh));
        assert_eq!(controller.poll(T0), Some(Task::RefreshDisplay));
        assert_eq!(controller.poll(T0), None);
    }

    #[test]
    fn automation_waits_out_startup_grace() {
        let mut controller = Controller::standard(T0);
        controller.poll(T0);
        controller.poll(T0);

        // Heartbeats still tick during the grace; automation must not
        let just_before = T0 + AUTOMATE_STARTUP_GRACE_SECS * MILLIS_PER_SEC - 1;
        while let Some(task) = controller.poll(just_before) {
            assert_ne!(task, Task::Automate);
        }

        let due = T0 + AUTOMATE_STARTUP_GRACE_SECS * MILLIS_PER_SEC;
        assert_eq!(controller.poll(due), Some(Task::Automate));
    }

    #[test]
    fn heartbeat_toggles_every_second() {
        let mut controller = Controller::standard(T0);
        controller.poll(T0);
        controller.poll(T0);

        let t1 = T0 + HEARTBEAT_MS;
        assert_eq!(controller.poll(t1), Some(Task::Heartbeat));
        assert!(controller.snapshot(t1).heartbeat);

        let t2 = t1 + HEARTBEAT_MS;
        assert_eq!(controller.poll(t2), Some(Task::Heartbeat));
        assert!(!controller.snapshot(t2).heartbeat);
    }

    #[test]
    fn automation_is_inert_before_first_reading() {
        let mut controller = Controller::standard(T0);
        assert_eq!(controller.automate(T0), SelectionOutcome::AllOff);
        assert_eq!(controller.bank().energized_count(), 0);
        assert_eq!(controller.intensity(), Intensity::Off);
    }

    #[test]
    fn dry_reading_energizes_least_depleted_low() {
        let mut controller = Controller::standard(T0);
        controller.record_reading(60.0);

        let outcome = controller.automate(T0);
        assert_eq!(controller.intensity(), Intensity::Light);
        assert_eq!(outcome, SelectionOutcome::Energized { index: 0 });
        assert_eq!(controller.bank().energized_count(), 1);
    }

    #[test]
    fn very_dry_reading_energizes_everything() {
        let mut controller = Controller::standard(T0);
        controller.record_reading(50.0);

        assert_eq!(controller.automate(T0), SelectionOutcome::EnergizedAll);
        assert_eq!(controller.intensity(), Intensity::Heavy);
        assert_eq!(controller.bank().energized_count(), 3);
    }

    #[test]
    fn relay_sync_writes_only_changes() {
        let mut controller = Controller::standard(T0);
        let mut relays = SpyRelays::default();

        controller.sync_relays(&mut relays);
        assert!(relays.writes.is_empty(), "all-off start needs no writes");

        controller.record_reading(50.0);
        controller.automate(T0);
        controller.sync_relays(&mut relays);
        assert_eq!(relays.writes, vec![(0, true), (1, true), (2, true)]);

        // Same state again: nothing new to write
        controller.sync_relays(&mut relays);
        assert_eq!(relays.writes.len(), 3);

        // Back above the off threshold: all lines drop
        controller.record_reading(70.0);
        controller.automate(T0 + 60_000);
        controller.sync_relays(&mut relays);
        assert_eq!(
            &relays.writes[3..],
            &[(0, false), (1, false), (2, false)]
        );
    }

    #[test]
    fn alert_follows_unavailable_selection() {
        // No configured outlet at all
        let bank = OutletBank::new([PowerSetting::Off; 3], T0);
        let mut controller = Controller::new(bank, T0);
        controller.record_reading(60.0);

        assert_eq!(controller.automate(T0), SelectionOutcome::Unavailable);
        assert!(controller.alert());

        // Configuring an outlet clears the alert on the next pass
        controller.set_outlet_power(0, PowerSetting::Low, T0);
        assert!(!controller.automate(T0).is_unavailable());
        assert!(!controller.alert());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut controller = Controller::standard(T0);
        controller.record_reading(60.0);
        controller.automate(T0);

        let snapshot = controller.snapshot(T0);
        assert_eq!(snapshot.rh, 60.0);
        assert_eq!(snapshot.intensity, Intensity::Light);
        assert!(!snapshot.alert);
        assert_eq!(snapshot.outlets.len(), 3);
        assert!(snapshot.outlets[0].energized);
        assert_eq!(snapshot.outlets[0].bar, BarLevel::Ok);
        assert_eq!(snapshot.history[RH_HISTORY_SLOTS - 1], 60.0);
        assert_eq!(snapshot.history[0], 0.0);
    }

    #[test]
    fn threshold_install_changes_behavior() {
        let mut controller = Controller::standard(T0);
        controller.record_reading(60.0);
        controller.automate(T0);
        assert_eq!(controller.intensity(), Intensity::Light);

        // Drop the on threshold below the reading: next pass turns off
        controller.set_thresholds(Thresholds {
            on_rh: 58.0,
            low_rh: 48.0,
        });
        assert_eq!(controller.automate(T0 + 5_000), SelectionOutcome::AllOff);
        assert_eq!(controller.intensity(), Intensity::Off);
    }
}
