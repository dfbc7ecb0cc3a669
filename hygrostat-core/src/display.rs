//! Read-Only Status for the Display Collaborator
//!
//! The core never draws anything. Once per refresh it hands the
//! display collaborator a [`StatusSnapshot`]: current RH, trend,
//! the full plot history, and per-outlet status. What the display does
//! with it (bars, arrows, a serial console) is its own business.
//!
//! Bar levels reproduce the bar colouring rules of the appliance:
//! green above the warn line, yellow below it, red when the reservoir
//! is effectively out, grey for outlets with nothing configured.

use crate::constants::{ERROR_PCT, RH_HISTORY_SLOTS, WARN_PCT};
use crate::hysteresis::Intensity;
use crate::outlet::{Outlet, PowerSetting};
use crate::time::Timestamp;
use crate::trend::Trend;

/// Display treatment for one outlet's capacity bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum BarLevel {
    /// Plenty left
    Ok = 0,
    /// Below the warn line; refill soon
    Warn = 1,
    /// Effectively out
    Error = 2,
    /// Outlet not configured
    Disabled = 3,
}

impl BarLevel {
    /// Derive the level from percent-remaining and the outlet tier
    pub fn from_remaining(remaining_pct: f32, setting: PowerSetting) -> Self {
        if setting == PowerSetting::Off {
            BarLevel::Disabled
        } else if remaining_pct < ERROR_PCT {
            BarLevel::Error
        } else if remaining_pct < WARN_PCT {
            BarLevel::Warn
        } else {
            BarLevel::Ok
        }
    }
}

/// Per-outlet slice of the snapshot
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutletStatus {
    /// Relay line number
    pub index: usize,
    /// Configured capacity tier
    pub setting: PowerSetting,
    /// Whether the relay is commanded on
    pub energized: bool,
    /// Estimated reservoir percent consumed
    pub depleted_percent: f32,
    /// Display treatment for the capacity bar
    pub bar: BarLevel,
}

impl OutletStatus {
    pub(crate) fn of(outlet: &Outlet, now: Timestamp) -> Self {
        let depleted = outlet.depleted_percent(now);
        Self {
            index: outlet.index(),
            setting: outlet.setting(),
            energized: outlet.is_energized(),
            depleted_percent: depleted,
            bar: BarLevel::from_remaining(100.0 - depleted, outlet.setting()),
        }
    }
}

/// Everything the status screen needs, captured at one instant
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusSnapshot<const N: usize> {
    /// Most recent averaged RH reading (0.0 before the first read)
    pub rh: f32,
    /// Direction of recent RH movement
    pub trend: Trend,
    /// Current humidifying intensity
    pub intensity: Intensity,
    /// Lit when the selector found no outlet to energize
    pub alert: bool,
    /// Heartbeat blink phase
    pub heartbeat: bool,
    /// Plot history, one slot per display column, oldest first;
    /// zero slots are columns without data
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_array_as_slice"))]
    pub history: [f32; RH_HISTORY_SLOTS],
    /// Per-outlet capacity and energization
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_array_as_slice"))]
    pub outlets: [OutletStatus; N],
}

// serde only provides `Serialize` impls for arrays up to length 32;
// serialize longer/const-generic arrays through the slice impl instead,
// which produces the same sequence representation.
#[cfg(feature = "serde")]
fn serialize_array_as_slice<T, S>(array: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    T: serde::Serialize,
    S: serde::Serializer,
{
    serde::Serialize::serialize(array, serializer)
}

/// The display collaborator
pub trait StatusDisplay<const N: usize> {
    /// Redraw the status screen from a snapshot
    fn render(&mut self, snapshot: &StatusSnapshot<N>);

    /// Show a fatal error message; called once, the process halts after
    fn show_error(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_levels_follow_thresholds() {
        assert_eq!(
            BarLevel::from_remaining(85.0, PowerSetting::Low),
            BarLevel::Ok
        );
        assert_eq!(
            BarLevel::from_remaining(29.9, PowerSetting::Low),
            BarLevel::Warn
        );
        assert_eq!(
            BarLevel::from_remaining(9.9, PowerSetting::High),
            BarLevel::Error
        );
        assert_eq!(
            BarLevel::from_remaining(85.0, PowerSetting::Off),
            BarLevel::Disabled
        );
    }

    #[test]
    fn boundary_values_round_down() {
        // Exactly on the line counts as the better level
        assert_eq!(
            BarLevel::from_remaining(WARN_PCT, PowerSetting::Low),
            BarLevel::Ok
        );
        assert_eq!(
            BarLevel::from_remaining(ERROR_PCT, PowerSetting::Low),
            BarLevel::Warn
        );
    }
}
