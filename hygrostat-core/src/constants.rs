//! Calibration constants and default settings
//!
//! Everything tunable in one place. Thresholds marked "default" can be
//! changed at runtime through the configuration menu; the rest are
//! compile-time calibration for this hardware revision.

use crate::time::Timestamp;

// --- RH thresholds --------------------------------------------------------

/// Turn on one low humidifier when RH drops below this (default setting)
pub const DEFAULT_ON_RH: f32 = 66.0;

/// Turn on all humidifiers when RH drops below this (default setting)
pub const DEFAULT_LOW_RH: f32 = 55.0;

/// Hysteresis margin around each RH threshold. A prospective transition
/// must clear the threshold by this much, giving a dead band of twice
/// this width. Distinct from button-press debouncing, which belongs to
/// the input hardware.
pub const RH_DEBOUNCE: f32 = 0.5;

/// Adjustable threshold floor and ceiling in the settings menu
pub const RH_SETTING_MIN: f32 = 10.0;
pub const RH_SETTING_MAX: f32 = 95.0;

// --- Reservoir depletion --------------------------------------------------

/// Reservoir percent consumed per second on the High tier
/// (full reservoir lasts 11h 45m)
pub const HIGH_PCT_PER_SEC: f32 = 100.0 / ((11 * 3600 + 45 * 60) as f32);

/// Reservoir percent consumed per second on the Low tier
/// (full reservoir lasts 23h 30m)
pub const LOW_PCT_PER_SEC: f32 = 100.0 / ((23 * 3600 + 30 * 60) as f32);

/// Below this percent remaining a reservoir is flagged on the display
pub const WARN_PCT: f32 = 30.0;

/// Below this percent remaining a reservoir is treated as out
pub const ERROR_PCT: f32 = 10.0;

// --- RH sampling and trend ------------------------------------------------

/// Rolling history capacity: one reading per display column
pub const RH_HISTORY_SLOTS: usize = 240;

/// Raw sensor samples averaged into one RH reading
pub const RH_SAMPLES_PER_READ: usize = 5;

/// Gap between averaged raw samples
pub const RH_SAMPLE_GAP_MS: u32 = 1000;

/// Backoff between retries after a failed sensor read
pub const RH_RETRY_BACKOFF_MS: u32 = 1000;

/// Readings per block when estimating the RH trend
pub const RH_TREND_WINDOW: usize = 5;

/// Block-average delta beyond which the trend counts as rising/falling
pub const RH_TREND_DELTA: f32 = 0.2;

/// Sensors drift slightly past the 0-100 endpoints; readings inside
/// this margin are clamped rather than rejected
pub const RH_DRIFT_MARGIN: f32 = 2.0;

// --- Control loop schedule ------------------------------------------------

/// How often to read the sensor and update RH
pub const RH_UPDATE_SECS: u64 = 300;

/// How often to re-evaluate the automation (relay) state
pub const AUTOMATE_SECS: u64 = 5;

/// Delay before the first automation pass after boot
pub const AUTOMATE_STARTUP_GRACE_SECS: u64 = 5;

/// How often to refresh the status screen
pub const DISPLAY_REFRESH_SECS: u64 = 5;

/// How often to blink the heartbeat indicator
pub const HEARTBEAT_MS: Timestamp = 1000;

/// Button inactivity before a menu session self-exits
pub const MENU_IDLE_TIMEOUT_MS: Timestamp = 5000;
