//! Transient on-screen notification ("PAUSE", "CLEAR", "ORBIT", ...).
//!
//! At most one notification exists.  A new trigger replaces the text and
//! restarts the timer immediately; nothing is queued.  The timer advances
//! at `decay_rate` timer units per second and the notification goes inert
//! once `elapsed >= duration`.
//!
//! The state machine owns only text and timer.  How it looks (fade, growth,
//! drift) is derived from [`Notification::progress`] by
//! [`crate::rendering::notification_display_system`].

use crate::config::FieldConfig;

/// The single active (or spent) notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    text: String,
    elapsed: f32,
    duration: f32,
    decay_rate: f32,
}

impl Notification {
    /// An inert notification.
    pub fn new(duration: f32, decay_rate: f32) -> Self {
        Self {
            text: String::new(),
            elapsed: duration,
            duration,
            decay_rate,
        }
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        Self::new(config.notification_duration, config.notification_decay_rate)
    }

    /// Show `text`, replacing whatever was showing, and restart the timer.
    pub fn trigger(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.elapsed = 0.0;
    }

    /// Advance the timer by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.is_active() {
            self.elapsed = (self.elapsed + self.decay_rate * dt.max(0.0)).min(self.duration);
        }
    }

    pub fn is_active(&self) -> bool {
        self.elapsed < self.duration
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// `elapsed / duration` in `[0, 1)` while active, `None` once inert.
    pub fn progress(&self) -> Option<f32> {
        self.is_active().then(|| self.elapsed / self.duration)
    }
}

impl Default for Notification {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inert() {
        let n = Notification::new(2.0, 2.0);
        assert!(!n.is_active());
        assert!(n.progress().is_none());
    }

    #[test]
    fn trigger_activates_with_zero_elapsed() {
        let mut n = Notification::new(2.0, 2.0);
        n.trigger("PAUSE");
        assert!(n.is_active());
        assert_eq!(n.text(), "PAUSE");
        assert_eq!(n.elapsed(), 0.0);
        assert_eq!(n.progress(), Some(0.0));
    }

    #[test]
    fn timer_runs_at_twice_real_time() {
        let mut n = Notification::new(2.0, 2.0);
        n.trigger("CLEAR");
        n.tick(0.25);
        assert!((n.elapsed() - 0.5).abs() < 1e-6);
        assert!((n.progress().unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn retrigger_replaces_text_and_resets_timer() {
        let mut n = Notification::new(2.0, 2.0);
        n.trigger("PAUSE");
        n.tick(0.5); // elapsed = 1.0
        assert!((n.elapsed() - 1.0).abs() < 1e-6);

        n.trigger("CLEAR");
        assert_eq!(n.text(), "CLEAR");
        assert_eq!(n.elapsed(), 0.0);
    }

    #[test]
    fn goes_inert_after_duration_and_stays_put() {
        let mut n = Notification::new(2.0, 2.0);
        n.trigger("ORBIT");
        for _ in 0..120 {
            n.tick(1.0 / 60.0);
        }
        assert!(!n.is_active());
        assert_eq!(n.elapsed(), 2.0);
        n.tick(1.0);
        assert_eq!(n.elapsed(), 2.0);
    }

    #[test]
    fn negative_dt_never_rewinds() {
        let mut n = Notification::new(2.0, 2.0);
        n.trigger("PUSH");
        n.tick(-1.0);
        assert_eq!(n.elapsed(), 0.0);
    }
}
