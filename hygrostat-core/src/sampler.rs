//! RH Sampling
//!
//! ## Overview
//!
//! Wraps the raw humidity sensor collaborator into the single value
//! the rest of the core consumes. One "reading" is the average of
//! several raw samples taken a second apart, which irons out the
//! sensor's measurement noise; each raw sample is sanity-checked
//! before it is allowed into the average.
//!
//! ## Failure model
//!
//! Sensor I/O fails transiently (bus glitches, slow warm-up) and the
//! appliance has nothing better to do than wait: [`RhSampler::read_with_retry`]
//! retries the whole averaged read indefinitely with a fixed one-second
//! backoff, logging each failure. A sensor failure therefore never
//! escapes the sampling routine, per the controller's error contract
//! ([`crate::errors`]).
//!
//! Sampling legitimately blocks the loop (warm-up plus the gaps
//! between averaged samples); the waits go through the [`Pause`]
//! collaborator so tests and synthetic sensors can skip them.

use crate::constants::{
    RH_DRIFT_MARGIN, RH_RETRY_BACKOFF_MS, RH_SAMPLES_PER_READ, RH_SAMPLE_GAP_MS,
};
use crate::errors::{SensorError, SensorResult};
use crate::time::Pause;

/// The raw humidity sensor collaborator
///
/// One call returns one raw RH percentage. Warm-up, power cycling and
/// bus handling live behind this trait; a call may block and may fail
/// transiently.
pub trait HumiditySensor {
    /// Take one raw RH sample, as a percentage
    fn sample_relative_humidity(&mut self) -> SensorResult<f32>;
}

/// Averaging sampler over a raw humidity sensor
#[derive(Debug, Clone)]
pub struct RhSampler {
    samples_per_read: usize,
    sample_gap_ms: u32,
    retry_backoff_ms: u32,
}

impl Default for RhSampler {
    fn default() -> Self {
        Self {
            samples_per_read: RH_SAMPLES_PER_READ,
            sample_gap_ms: RH_SAMPLE_GAP_MS,
            retry_backoff_ms: RH_RETRY_BACKOFF_MS,
        }
    }
}

impl RhSampler {
    /// Sampler with explicit averaging and pacing parameters
    pub fn new(samples_per_read: usize, sample_gap_ms: u32, retry_backoff_ms: u32) -> Self {
        debug_assert!(samples_per_read > 0);
        Self {
            samples_per_read,
            sample_gap_ms,
            retry_backoff_ms,
        }
    }

    /// One averaged reading, rounded to two decimals
    ///
    /// Fails if any raw sample fails or is implausible; the caller
    /// decides whether to retry.
    pub fn read_average<S: HumiditySensor, P: Pause>(
        &self,
        sensor: &mut S,
        pause: &mut P,
    ) -> SensorResult<f32> {
        let mut total = 0.0;

        for i in 0..self.samples_per_read {
            log_debug!("reading RH sample {}", i);
            let raw = sensor.sample_relative_humidity()?;
            total += validate_sample(raw)?;

            if i + 1 < self.samples_per_read {
                pause.pause_ms(self.sample_gap_ms);
            }
        }

        let avg = total / self.samples_per_read as f32;
        let rounded = libm::roundf(avg * 100.0) / 100.0;
        log_debug!("averaged RH reading {:.2}", rounded);
        Ok(rounded)
    }

    /// One averaged reading, retried indefinitely with a fixed backoff
    ///
    /// Transient sensor failures are logged and absorbed here; this
    /// returns only once a read succeeds.
    pub fn read_with_retry<S: HumiditySensor, P: Pause>(
        &self,
        sensor: &mut S,
        pause: &mut P,
    ) -> f32 {
        loop {
            match self.read_average(sensor, pause) {
                Ok(rh) => return rh,
                Err(err) => {
                    log_warn!("RH read failed, retrying: {:?}", err);
                    pause.pause_ms(self.retry_backoff_ms);
                }
            }
        }
    }
}

/// Sanity-check one raw sample
///
/// Capacitive RH sensors drift a little past the 0-100 endpoints;
/// readings inside the drift margin are clamped, anything beyond it
/// (or non-finite) means the sample is garbage.
fn validate_sample(raw: f32) -> SensorResult<f32> {
    if !raw.is_finite() {
        return Err(SensorError::ImplausibleReading { value: raw });
    }
    if raw < -RH_DRIFT_MARGIN || raw > 100.0 + RH_DRIFT_MARGIN {
        return Err(SensorError::ImplausibleReading { value: raw });
    }
    Ok(raw.clamp(0.0, 100.0))
}

/// Synthetic RH source: a triangle wave between two bounds
///
/// Stands in for the hardware sensor on the bench and in tests. Each
/// sample steps the wave and reverses at the bounds, so the controller
/// exercises every intensity transition in a few minutes of loop time.
#[derive(Debug, Clone)]
pub struct SawtoothRh {
    value: f32,
    step: f32,
    high: f32,
    low: f32,
    ascending: bool,
}

impl SawtoothRh {
    /// Wave starting at `start`, default step 0.7 between 48 and 72
    pub fn new(start: f32) -> Self {
        Self {
            value: start,
            step: 0.7,
            high: 72.0,
            low: 48.0,
            ascending: true,
        }
    }

    /// Wave with explicit bounds and step
    pub fn with_bounds(start: f32, low: f32, high: f32, step: f32) -> Self {
        debug_assert!(low < high && step > 0.0);
        Self {
            value: start,
            step,
            high,
            low,
            ascending: true,
        }
    }
}

impl HumiditySensor for SawtoothRh {
    fn sample_relative_humidity(&mut self) -> SensorResult<f32> {
        if self.ascending {
            if self.value >= self.high {
                self.ascending = false;
                self.value -= self.step;
            } else {
                self.value += self.step;
            }
        } else if self.value <= self.low {
            self.ascending = true;
            self.value += self.step;
        } else {
            self.value -= self.step;
        }

        Ok(self.value)
    }
}
