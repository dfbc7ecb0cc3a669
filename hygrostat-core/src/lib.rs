//! Hygrostat Core: Humidity Automation for Relay-Switched Humidifiers
//!
//! A `no_std`-capable control core for a multi-outlet hygrostat: it
//! reads a relative-humidity sensor, tracks a rolling history, and
//! drives relay outlets through a hysteresis state machine so room RH
//! stays inside a configured band without chattering the relays.
//!
//! ## Architecture
//!
//! ```text
//! sensor ──▶ RhSampler ──▶ RhHistory ──▶ TrendEstimator
//!                │
//!                ▼
//!         next_intensity (hysteresis)
//!                │
//!                ▼
//!         OutletSelector ──▶ OutletBank ──▶ RelayDriver
//!                                 │
//!                                 ▼
//!                          StatusSnapshot ──▶ StatusDisplay
//! ```
//!
//! [`Controller`] owns all of it and schedules the work; the host
//! supplies the hardware at the trait seams ([`HumiditySensor`],
//! [`RelayDriver`], [`StatusDisplay`], [`TimeSource`], [`Pause`]).
//!
//! ## Core Principles
//!
//! - **Estimation over measurement**: reservoir levels cannot be
//!   sensed, so depletion is derived from accumulated run-time per
//!   capacity tier.
//! - **Hysteresis everywhere**: every RH threshold carries a dead
//!   band, and the outlet selector prefers keeping a healthy running
//!   outlet over re-optimizing.
//! - **No allocation**: fixed-size buffers throughout
//!   ([`heapless`], const generics), suitable for microcontrollers.
//!
//! ## Feature Flags
//!
//! - `std` (default): system clocks, thread sleeps, `serde`, `log`
//! - `embedded`: `defmt` formatting for RTT logging
//!
//! ## Quick Start
//!
//! ```rust
//! use hygrostat_core::{Controller, Task};
//! use hygrostat_core::sampler::SawtoothRh;
//! use hygrostat_core::time::{FixedClock, NoPause, TimeSource};
//!
//! let mut clock = FixedClock::new(0);
//! let mut sensor = SawtoothRh::new(60.0);
//! let mut pause = NoPause;
//! let mut controller = Controller::standard(clock.now());
//!
//! for _ in 0..100 {
//!     while let Some(task) = controller.poll(clock.now()) {
//!         match task {
//!             Task::SampleRh => {
//!                 controller.update_rh(&mut sensor, &mut pause);
//!             }
//!             Task::Automate => {
//!                 controller.automate(clock.now());
//!             }
//!             Task::RefreshDisplay | Task::Heartbeat => {}
//!         }
//!     }
//!     clock.advance(1000);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Logging shims. With the `log` feature these forward to the `log`
// crate; without it they compile to nothing. Defined before the
// modules so textual scoping makes them visible crate-wide.

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}
#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}
#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}
#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}
#[cfg(not(feature = "log"))]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

pub mod constants;
pub mod controller;
pub mod display;
pub mod errors;
pub mod history;
pub mod hysteresis;
pub mod menu;
pub mod outlet;
pub mod sampler;
pub mod selector;
pub mod time;
pub mod trend;

pub use controller::{Controller, RelayDriver, Task};
pub use display::{BarLevel, OutletStatus, StatusDisplay, StatusSnapshot};
pub use errors::{SensorError, SensorResult};
pub use history::RhHistory;
pub use hysteresis::{Intensity, Thresholds};
pub use menu::{Adjust, MenuSession, ThresholdEditor, ThresholdKind};
pub use outlet::{Outlet, OutletBank, PowerSetting};
pub use sampler::{HumiditySensor, RhSampler};
pub use selector::{OutletSelector, SelectionOutcome};
pub use time::{Pause, TimeSource, Timestamp};
pub use trend::{Trend, TrendEstimator};

/// Version of the hygrostat-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
