//! Humidifying Intensity State Machine
//!
//! ## Overview
//!
//! Overall humidifying intensity is decided by comparing the current
//! RH against two user thresholds: below `on_rh` the room needs some
//! humidifying (Light), below `low_rh` it needs everything available
//! (Heavy). A naive comparison would chatter relays every time a noisy
//! reading wobbles across a threshold, so each transition is guarded
//! by a hysteresis margin.
//!
//! ## Dead band
//!
//! The margin is applied asymmetrically by direction of the
//! prospective transition: to *leave* an intensity upward (toward Off)
//! RH must clear the threshold plus the margin, to *enter* a more
//! intense state RH must fall below the threshold minus the margin.
//! The result is a dead band of `2 × debounce` around each threshold
//! inside which the current state simply holds:
//!
//! ```text
//!            low_rh          on_rh
//!              |               |
//!   Heavy <──[-d|+d]── Light ──[-d|+d]──> Off
//!              dead band        dead band
//! ```
//!
//! The transition function is pure; the controller applies the
//! returned state by running outlet selection and stores it afterward.

use crate::constants::{DEFAULT_LOW_RH, DEFAULT_ON_RH, RH_DEBOUNCE};

/// Overall humidifying target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum Intensity {
    /// RH is high enough; nothing runs
    Off = 0,
    /// RH below `on_rh`; exactly one outlet runs
    Light = 1,
    /// RH below `low_rh`; every available outlet runs
    Heavy = 2,
}

impl Intensity {
    /// Human-readable name, for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Intensity::Off => "off",
            Intensity::Light => "light",
            Intensity::Heavy => "heavy",
        }
    }
}

/// The two user-adjustable RH thresholds
///
/// Invariant `low_rh < on_rh` is enforced by the configuration UI
/// ([`crate::menu::ThresholdEditor`]); the transition function assumes
/// it holds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Thresholds {
    /// Below this, light humidifying turns on
    pub on_rh: f32,
    /// Below this, heavy humidifying turns on
    pub low_rh: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            on_rh: DEFAULT_ON_RH,
            low_rh: DEFAULT_LOW_RH,
        }
    }
}

/// Compute the next intensity from the current one and the current RH
///
/// Hysteretic per current state: each arm offsets the thresholds by
/// `debounce` in the direction that resists the transition.
pub fn next_intensity(
    current: Intensity,
    rh: f32,
    thresholds: &Thresholds,
    debounce: f32,
) -> Intensity {
    let Thresholds { on_rh, low_rh } = *thresholds;

    let next = match current {
        Intensity::Off => {
            if rh > on_rh - debounce {
                Intensity::Off
            } else if rh > low_rh - debounce {
                Intensity::Light
            } else {
                Intensity::Heavy
            }
        }
        Intensity::Light => {
            if rh > on_rh + debounce {
                Intensity::Off
            } else if rh < low_rh - debounce {
                Intensity::Heavy
            } else {
                Intensity::Light
            }
        }
        Intensity::Heavy => {
            if rh > on_rh + debounce {
                Intensity::Off
            } else if rh > low_rh + debounce {
                Intensity::Light
            } else {
                Intensity::Heavy
            }
        }
    };

    if next != current {
        log_info!(
            "intensity {} -> {} at RH {:.1}% (on {:.1}, low {:.1}, debounce {:.1})",
            current.name(),
            next.name(),
            rh,
            on_rh,
            low_rh,
            debounce
        );
    }
    next
}

/// [`next_intensity`] with the product's default margin
pub fn next_intensity_default(current: Intensity, rh: f32, thresholds: &Thresholds) -> Intensity {
    next_intensity(current, rh, thresholds, RH_DEBOUNCE)
}
