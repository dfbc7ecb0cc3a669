//! Settings Menu Session and Threshold Editing
//!
//! The menu is modal: while a session is open the automation loop is
//! paused, and the session closes itself after a few seconds without a
//! button press so a walk-away never leaves the controller wedged.
//!
//! Threshold edits go through [`ThresholdEditor`], which works on a
//! scratch copy and enforces the ordering guard (`low_rh` can never
//! climb to meet `on_rh`, and vice versa) on every step. Nothing
//! touches the live configuration until `commit`.

use crate::constants::{MENU_IDLE_TIMEOUT_MS, RH_SETTING_MAX, RH_SETTING_MIN};
use crate::hysteresis::Thresholds;
use crate::time::Timestamp;

/// Direction of a single threshold adjustment step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    /// One point up
    Up,
    /// One point down
    Down,
}

/// Which threshold a menu page is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    /// RH at or below which humidifying turns on
    On,
    /// RH at or below which heavy humidifying kicks in
    Low,
}

/// An open menu interaction, tracked by its idle deadline
///
/// Call [`touch`](MenuSession::touch) on every button press; once
/// [`expired`](MenuSession::expired) reports true the caller should
/// drop the session and resume automation.
#[derive(Debug, Clone, Copy)]
pub struct MenuSession {
    last_input_at: Timestamp,
}

impl MenuSession {
    /// Open a session, idle clock starting now
    pub fn open(now: Timestamp) -> Self {
        log_debug!("menu session opened");
        Self { last_input_at: now }
    }

    /// Register a button press, pushing the idle deadline out
    pub fn touch(&mut self, now: Timestamp) {
        self.last_input_at = now;
    }

    /// True once the idle timeout has elapsed without input
    pub fn expired(&self, now: Timestamp) -> bool {
        now.saturating_sub(self.last_input_at) >= MENU_IDLE_TIMEOUT_MS
    }
}

/// Scratch editor for the two RH thresholds
///
/// Steps are whole percentage points. A step is refused, not clamped,
/// when it would leave the configured range or collapse the band
/// between the two thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEditor {
    draft: Thresholds,
}

impl ThresholdEditor {
    /// Start editing from the live values
    pub fn new(current: Thresholds) -> Self {
        Self { draft: current }
    }

    /// The value a page should show for `kind`
    pub fn value(&self, kind: ThresholdKind) -> f32 {
        match kind {
            ThresholdKind::On => self.draft.on_rh,
            ThresholdKind::Low => self.draft.low_rh,
        }
    }

    /// Whether a one-point step in `direction` is currently allowed
    pub fn can_adjust(&self, kind: ThresholdKind, direction: Adjust) -> bool {
        match (kind, direction) {
            (ThresholdKind::On, Adjust::Up) => self.draft.on_rh < RH_SETTING_MAX,
            (ThresholdKind::On, Adjust::Down) => {
                // Keep the heavy threshold strictly below the on threshold
                self.draft.on_rh > RH_SETTING_MIN && self.draft.on_rh > self.draft.low_rh + 1.0
            }
            (ThresholdKind::Low, Adjust::Up) => {
                self.draft.low_rh < RH_SETTING_MAX && self.draft.low_rh + 1.0 < self.draft.on_rh
            }
            (ThresholdKind::Low, Adjust::Down) => self.draft.low_rh > RH_SETTING_MIN,
        }
    }

    /// Apply a one-point step if allowed; returns whether it happened
    pub fn adjust(&mut self, kind: ThresholdKind, direction: Adjust) -> bool {
        if !self.can_adjust(kind, direction) {
            return false;
        }

        let step = match direction {
            Adjust::Up => 1.0,
            Adjust::Down => -1.0,
        };
        match kind {
            ThresholdKind::On => self.draft.on_rh += step,
            ThresholdKind::Low => self.draft.low_rh += step,
        }
        true
    }

    /// Finish editing and hand back the values to install
    pub fn commit(self) -> Thresholds {
        log_info!(
            "thresholds committed: on {} low {}",
            self.draft.on_rh,
            self.draft.low_rh
        );
        self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expires_after_idle_timeout() {
        let mut session = MenuSession::open(1_000);
        assert!(!session.expired(1_000 + MENU_IDLE_TIMEOUT_MS - 1));
        assert!(session.expired(1_000 + MENU_IDLE_TIMEOUT_MS));

        session.touch(8_000);
        assert!(!session.expired(8_000 + MENU_IDLE_TIMEOUT_MS - 1));
        assert!(session.expired(8_000 + MENU_IDLE_TIMEOUT_MS));
    }

    #[test]
    fn adjust_steps_whole_points() {
        let mut editor = ThresholdEditor::new(Thresholds::default());
        assert!(editor.adjust(ThresholdKind::On, Adjust::Up));
        assert_eq!(editor.value(ThresholdKind::On), 67.0);

        assert!(editor.adjust(ThresholdKind::Low, Adjust::Down));
        assert_eq!(editor.value(ThresholdKind::Low), 54.0);
    }

    #[test]
    fn range_limits_refuse_steps() {
        let mut editor = ThresholdEditor::new(Thresholds {
            on_rh: RH_SETTING_MAX,
            low_rh: RH_SETTING_MIN,
        });
        assert!(!editor.can_adjust(ThresholdKind::On, Adjust::Up));
        assert!(!editor.can_adjust(ThresholdKind::Low, Adjust::Down));
        assert!(!editor.adjust(ThresholdKind::On, Adjust::Up));
        assert_eq!(editor.value(ThresholdKind::On), RH_SETTING_MAX);
    }

    #[test]
    fn band_cannot_collapse() {
        // One point apart: neither side may close the gap further
        let editor = ThresholdEditor::new(Thresholds {
            on_rh: 56.0,
            low_rh: 55.0,
        });
        assert!(!editor.can_adjust(ThresholdKind::Low, Adjust::Up));
        assert!(!editor.can_adjust(ThresholdKind::On, Adjust::Down));

        // Two points apart: both directions open up again
        let editor = ThresholdEditor::new(Thresholds {
            on_rh: 57.0,
            low_rh: 55.0,
        });
        assert!(editor.can_adjust(ThresholdKind::Low, Adjust::Up));
        assert!(editor.can_adjust(ThresholdKind::On, Adjust::Down));
    }

    #[test]
    fn commit_returns_draft() {
        let mut editor = ThresholdEditor::new(Thresholds::default());
        editor.adjust(ThresholdKind::On, Adjust::Up);
        editor.adjust(ThresholdKind::On, Adjust::Up);
        let committed = editor.commit();
        assert_eq!(committed.on_rh, 68.0);
        assert_eq!(committed.low_rh, 55.0);
    }
}
