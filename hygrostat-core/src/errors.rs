//! Error types for the controller core
//!
//! The error system follows three rules, all inherited from the
//! product's failure model:
//!
//! 1. **Small and Copy**: error values travel through a polling loop on
//!    a microcontroller-class device; they hold `&'static str` reasons
//!    and primitives only, no heap.
//!
//! 2. **Recoverable conditions never surface as errors at the top.**
//!    Transient sensor I/O is retried inside the sampling routine
//!    (see [`crate::sampler`]); outlet exhaustion is a
//!    [`crate::selector::SelectionOutcome`] variant reported through
//!    the alert indicator, not an `Err`.
//!
//! 3. Anything that does propagate out of the control loop is fatal by
//!    contract and is handled once by the hosting binary.

use thiserror_no_std::Error;

/// Result type for sensor sampling operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Failures reported by the humidity sensor collaborator
///
/// All variants are transient from the core's point of view: the
/// sampling routine retries indefinitely with a fixed backoff.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    /// Bus or device I/O failed (wiring glitch, powered-down sensor)
    #[error("sensor I/O failed: {reason}")]
    Io {
        /// What the driver was doing when the bus failed
        reason: &'static str,
    },

    /// Sensor produced a reading that is not a plausible RH percentage
    #[error("implausible RH reading: {value}")]
    ImplausibleReading {
        /// The raw value the sensor returned
        value: f32,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Io { reason } => defmt::write!(fmt, "sensor I/O failed: {}", reason),
            Self::ImplausibleReading { value } => {
                defmt::write!(fmt, "implausible RH reading: {}", value)
            }
        }
    }
}
