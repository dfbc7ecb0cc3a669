//! Per-Outlet Reservoir and Energization Bookkeeping
//!
//! ## Overview
//!
//! Each physical relay drives one humidifier outlet. The controller
//! cannot measure the water level in a reservoir, so it estimates
//! depletion from accumulated run-time: a full reservoir lasts about
//! 11h45m on the High tier and 23h30m on Low, and percent-consumed is
//! derived from seconds run at each tier since the last refill.
//!
//! ## Accrual model
//!
//! Run-time is split into two parts:
//!
//! - `low_run_ms` / `high_run_ms`: intervals already folded into the
//!   accumulators.
//! - the in-progress interval since `last_change_at`, which belongs to
//!   whatever (setting, energized) pair is current and is folded in
//!   lazily whenever that pair is about to change.
//!
//! Invariant: usage accrues under the pair that was in effect while
//! the time passed. Every mutation of `setting` or `energized`
//! therefore folds the elapsed interval first, under the OLD pair,
//! then applies the change and restamps `last_change_at`. Derived
//! depletion adds the in-progress interval on the fly, so it is always
//! current without a periodic tick.
//!
//! Nothing here persists across power loss: accumulators reset on
//! reboot, an accepted approximation since reservoirs do not.

use crate::constants::{HIGH_PCT_PER_SEC, LOW_PCT_PER_SEC};
use crate::time::Timestamp;

/// User-configured capacity tier for the humidifier on an outlet
///
/// `Off` doubles as "nothing plugged in": the selector skips such
/// outlets entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum PowerSetting {
    /// Nothing plugged in, or deliberately disabled
    Off = 0,
    /// A low-capacity humidifier
    Low = 1,
    /// A high-capacity humidifier
    High = 2,
}

impl PowerSetting {
    /// Short name matching the tier labels on the appliance
    pub const fn name(&self) -> &'static str {
        match self {
            PowerSetting::Off => "off",
            PowerSetting::Low => "lo",
            PowerSetting::High => "hi",
        }
    }
}

/// One relay-controlled outlet and its reservoir estimate
#[derive(Debug, Clone)]
pub struct Outlet {
    /// Stable identity, 0-based; doubles as the relay line number
    index: usize,

    /// Capacity tier of whatever is plugged in
    setting: PowerSetting,

    /// Whether the relay is currently commanded on
    energized: bool,

    /// Run-time folded in at the Low tier since last refill
    low_run_ms: u64,

    /// Run-time folded in at the High tier since last refill
    high_run_ms: u64,

    /// When (setting, energized) last changed; start of the
    /// in-progress interval not yet in the accumulators
    last_change_at: Timestamp,

    /// When the reservoir was last refilled (informational)
    filled_at: Timestamp,
}

impl Outlet {
    /// New outlet with an empty run-time ledger
    pub fn new(index: usize, setting: PowerSetting, now: Timestamp) -> Self {
        Self {
            index,
            setting,
            energized: false,
            low_run_ms: 0,
            high_run_ms: 0,
            last_change_at: now,
            filled_at: 0,
        }
    }

    /// Stable 0-based identity; doubles as the relay line number
    pub fn index(&self) -> usize {
        self.index
    }

    /// Configured capacity tier
    pub fn setting(&self) -> PowerSetting {
        self.setting
    }

    /// Whether the relay is currently commanded on
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// When the reservoir was last marked refilled (0 = never)
    pub fn filled_at(&self) -> Timestamp {
        self.filled_at
    }

    /// Estimated percent of the reservoir consumed, in `[0, 100]`
    ///
    /// Includes the in-progress interval when the outlet is currently
    /// energized at a consuming tier.
    pub fn depleted_percent(&self, now: Timestamp) -> f32 {
        let mut low_ms = self.low_run_ms;
        let mut high_ms = self.high_run_ms;

        if self.energized {
            let elapsed = now.saturating_sub(self.last_change_at);
            match self.setting {
                PowerSetting::Low => low_ms += elapsed,
                PowerSetting::High => high_ms += elapsed,
                PowerSetting::Off => {}
            }
        }

        let pct = (low_ms as f32 / 1000.0) * LOW_PCT_PER_SEC
            + (high_ms as f32 / 1000.0) * HIGH_PCT_PER_SEC;
        pct.clamp(0.0, 100.0)
    }

    /// Fold the in-progress interval into the accumulator for the
    /// current (setting, energized) pair and restamp.
    ///
    /// Must run before any change to the pair.
    fn accrue_usage(&mut self, now: Timestamp) {
        if !self.energized {
            return;
        }

        let elapsed = now.saturating_sub(self.last_change_at);
        match self.setting {
            PowerSetting::Low => self.low_run_ms += elapsed,
            PowerSetting::High => self.high_run_ms += elapsed,
            PowerSetting::Off => return,
        }
        self.last_change_at = now;
    }

    /// Command the relay on. No-op if already energized.
    pub fn energize(&mut self, now: Timestamp) {
        if self.energized {
            return;
        }

        log_info!("energizing outlet {}", self.index);
        self.accrue_usage(now);
        self.energized = true;
        self.last_change_at = now;
    }

    /// Command the relay off. No-op if already de-energized.
    pub fn deenergize(&mut self, now: Timestamp) {
        if !self.energized {
            return;
        }

        log_info!("de-energizing outlet {}", self.index);
        self.accrue_usage(now);
        self.energized = false;
        self.last_change_at = now;
    }

    /// Change the capacity tier, accruing usage under the old tier
    /// first. An energized outlet stays energized under the new tier.
    pub fn set_power(&mut self, new_setting: PowerSetting, now: Timestamp) {
        log_info!(
            "outlet {} setting {} -> {}",
            self.index,
            self.setting.name(),
            new_setting.name()
        );
        self.accrue_usage(now);
        self.setting = new_setting;
        self.last_change_at = now;
    }

    /// Mark the reservoir refilled: run-time ledger back to zero.
    /// Setting and energization are untouched.
    pub fn refill(&mut self, now: Timestamp) {
        log_info!("outlet {} refilled", self.index);
        self.low_run_ms = 0;
        self.high_run_ms = 0;
        self.filled_at = now;
        self.last_change_at = now;
    }
}

/// The fixed outlet roster, created once at startup
///
/// `N` is the relay count for the hardware revision; the shipped
/// product has three.
#[derive(Debug, Clone)]
pub struct OutletBank<const N: usize> {
    outlets: [Outlet; N],
}

impl<const N: usize> OutletBank<N> {
    /// Bank with an explicit tier per outlet
    pub fn new(settings: [PowerSetting; N], now: Timestamp) -> Self {
        let mut index = 0;
        let outlets = settings.map(|setting| {
            let outlet = Outlet::new(index, setting, now);
            index += 1;
            outlet
        });
        Self { outlets }
    }

    /// Relay count for this hardware
    pub fn len(&self) -> usize {
        N
    }

    /// True only for a zero-relay bank
    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Borrow one outlet. Panics if `index >= N`.
    pub fn get(&self, index: usize) -> &Outlet {
        &self.outlets[index]
    }

    /// Mutably borrow one outlet. Panics if `index >= N`.
    pub fn get_mut(&mut self, index: usize) -> &mut Outlet {
        &mut self.outlets[index]
    }

    /// Iterate the roster in relay order
    pub fn iter(&self) -> core::slice::Iter<'_, Outlet> {
        self.outlets.iter()
    }

    /// Mutably iterate the roster in relay order
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Outlet> {
        self.outlets.iter_mut()
    }

    /// Number of outlets currently commanded on
    pub fn energized_count(&self) -> usize {
        self.outlets.iter().filter(|o| o.is_energized()).count()
    }

    /// De-energize every outlet unconditionally
    pub fn deenergize_all(&mut self, now: Timestamp) {
        for outlet in &mut self.outlets {
            outlet.deenergize(now);
        }
    }

    /// Mark every reservoir refilled
    pub fn refill_all(&mut self, now: Timestamp) {
        for outlet in &mut self.outlets {
            outlet.refill(now);
        }
    }
}

impl OutletBank<3> {
    /// The shipped loadout: two Low humidifiers and one High
    pub fn standard(now: Timestamp) -> Self {
        Self::new(
            [PowerSetting::Low, PowerSetting::Low, PowerSetting::High],
            now,
        )
    }
}
