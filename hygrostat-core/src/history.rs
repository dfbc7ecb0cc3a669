//! Fixed-Size Rolling History of RH Readings
//!
//! ## Overview
//!
//! The status screen plots one historical RH reading per display
//! column, and the trend estimator reads the tail of that same
//! history. This module provides the backing structure: a ring of `N`
//! slots, oldest reading evicted on insert, with no heap allocation.
//!
//! ## The zero-as-unset convention
//!
//! A slot holding `0.0` means "no reading yet", not a real 0% RH.
//! The convention comes from the plot itself: columns without data are
//! simply not drawn, and 0% relative humidity does not occur in any
//! room this appliance will ever see. The logical view of the buffer
//! is therefore always exactly `N` slots, oldest to newest, with
//! leading zeros while the history is still filling. Consumers that
//! average slots (the trend estimator) must skip zeros.
//!
//! ## Memory layout
//!
//! ```text
//! RhHistory<5> after pushes a, b, c (write_pos = 3, len = 3):
//!
//! physical: [ a, b, c, -, - ]
//! logical:  [ 0, 0, a, b, c ]   <- slot(0)..slot(4), zeros lead
//! ```
//!
//! Storage is `N * 4` bytes plus two counters; operations are O(1)
//! except iteration.

/// Rolling RH history with `N` logical slots, oldest first
///
/// `N` is one slot per display column. The const parameter keeps the
/// buffer allocation-free and lets the display crate size its plot at
/// compile time.
#[derive(Debug, Clone)]
pub struct RhHistory<const N: usize> {
    /// Ring storage; only the first `len` logical entries are real
    data: [f32; N],

    /// Index where the next write will occur, wraps at N
    write_pos: usize,

    /// Number of readings recorded, saturates at N
    len: usize,
}

impl<const N: usize> RhHistory<N> {
    /// Creates an empty history (all slots unset)
    pub const fn new() -> Self {
        Self {
            data: [0.0; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Records a reading, evicting the oldest when full
    pub fn record(&mut self, rh: f32) {
        self.data[self.write_pos] = rh;
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of real readings recorded (at most N)
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no reading has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most recent reading, if any
    pub fn latest(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        Some(self.data[idx])
    }

    /// Logical slot access: `0` is the oldest column, `N - 1` the
    /// newest. Slots with no reading yet read as `0.0`.
    pub fn slot(&self, index: usize) -> f32 {
        debug_assert!(index < N);

        // Leading slots are unset while the history fills
        if index < N - self.len {
            return 0.0;
        }

        let logical = index - (N - self.len);
        let physical = if self.len < N {
            logical
        } else {
            (self.write_pos + logical) % N
        };

        self.data[physical]
    }

    /// Iterate over all `N` logical slots, oldest to newest
    pub fn slots(&self) -> impl Iterator<Item = f32> + '_ {
        (0..N).map(move |i| self.slot(i))
    }

    /// Copy the logical view into an array for display snapshots
    pub fn to_slots(&self) -> [f32; N] {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.slot(i);
        }
        out
    }

    /// Drop all readings
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }
}

impl<const N: usize> Default for RhHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}
