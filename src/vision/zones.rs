//! Hold-in-zone gestures: park the cursor at the left or right edge of the
//! frame long enough and a directional event fires once, then cools down.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::collaborators::UiMode;
use crate::config::GestureConfig;

/// Which horizontal band the cursor currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    None,
    Left,
    Right,
}

impl ZoneState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Directional gesture confirmed after a continuous hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldGesture {
    HoldLeft,
    HoldRight,
}

impl HoldGesture {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HoldLeft => "HOLD_LEFT",
            Self::HoldRight => "HOLD_RIGHT",
        }
    }

    /// UI mode a hold switches to: left brings back widgets, right shows the mirror.
    pub fn ui_mode(self) -> UiMode {
        match self {
            Self::HoldLeft => UiMode::Dashboard,
            Self::HoldRight => UiMode::Mirror,
        }
    }
}

/// Debounces zone occupancy into [`HoldGesture`]s.
///
/// Occupancy is measured from the zone entry instant, never by frame count, so
/// jittery frame rates near the threshold still fire exactly once.
#[derive(Debug, Clone)]
pub struct ZoneGestureTracker {
    left_threshold: f32,
    right_threshold: f32,
    hold: Duration,
    cooldown: Duration,
    state: ZoneState,
    entered_at: Option<Instant>,
    cooldown_until: Option<Instant>,
}

impl ZoneGestureTracker {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            left_threshold: config.left_zone,
            right_threshold: config.right_zone,
            hold: config.zone_hold,
            cooldown: config.zone_cooldown,
            state: ZoneState::None,
            entered_at: None,
            cooldown_until: None,
        }
    }

    pub fn classify(&self, x: f32) -> ZoneState {
        if x < self.left_threshold {
            ZoneState::Left
        } else if x > self.right_threshold {
            ZoneState::Right
        } else {
            ZoneState::None
        }
    }

    /// Feed this frame's smoothed cursor x (`None` when no hand is visible).
    pub fn update(&mut self, cursor_x: Option<f32>, now: Instant) -> Option<HoldGesture> {
        let zone = cursor_x.map_or(ZoneState::None, |x| self.classify(x));

        if zone == ZoneState::None {
            self.reset();
            return None;
        }

        if zone != self.state {
            debug!(zone = zone.as_str(), "cursor entered zone");
            self.state = zone;
            self.entered_at = Some(now);
            self.cooldown_until = None;
            return None;
        }

        let entered_at = *self.entered_at.get_or_insert(now);
        let cooled_down = self.cooldown_until.map_or(true, |deadline| now > deadline);
        if !cooled_down || now.saturating_duration_since(entered_at) <= self.hold {
            return None;
        }

        // Hold is re-measured from the end of the cooldown window.
        let deadline = now + self.cooldown;
        self.cooldown_until = Some(deadline);
        self.entered_at = Some(deadline);
        Some(match zone {
            ZoneState::Left => HoldGesture::HoldLeft,
            _ => HoldGesture::HoldRight,
        })
    }

    pub fn reset(&mut self) {
        self.state = ZoneState::None;
        self.entered_at = None;
        self.cooldown_until = None;
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ZoneGestureTracker {
        ZoneGestureTracker::new(&GestureConfig::default())
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn classifies_bands() {
        let tracker = tracker();
        assert_eq!(tracker.classify(0.1), ZoneState::Left);
        assert_eq!(tracker.classify(0.5), ZoneState::None);
        assert_eq!(tracker.classify(0.9), ZoneState::Right);
        assert_eq!(tracker.classify(0.2), ZoneState::None);
    }

    #[test]
    fn frames_before_hold_threshold_do_not_fire() {
        let mut tracker = tracker();
        let start = Instant::now();
        for step in 0..=20 {
            assert_eq!(tracker.update(Some(0.1), start + ms(step * 50)), None);
        }
        assert_eq!(tracker.state(), ZoneState::Left);
    }

    #[test]
    fn sustained_left_fires_exactly_once_until_cooldown_passes() {
        let mut tracker = tracker();
        let start = Instant::now();
        let mut fires = Vec::new();
        // 10 ms frames for five seconds.
        for step in 0..=500 {
            let now = start + ms(step * 10);
            if let Some(gesture) = tracker.update(Some(0.05), now) {
                fires.push((step * 10, gesture));
            }
        }
        assert_eq!(fires.first(), Some(&(1010, HoldGesture::HoldLeft)));
        // Second fire needs the 2 s cooldown plus another full hold.
        assert_eq!(fires.get(1), Some(&(4020, HoldGesture::HoldLeft)));
        assert_eq!(fires.len(), 2);
    }

    #[test]
    fn leaving_zone_resets_hold() {
        let mut tracker = tracker();
        let start = Instant::now();
        tracker.update(Some(0.9), start);
        tracker.update(Some(0.9), start + ms(900));
        tracker.update(Some(0.5), start + ms(950));
        assert_eq!(tracker.state(), ZoneState::None);
        tracker.update(Some(0.9), start + ms(1000));
        assert_eq!(tracker.update(Some(0.9), start + ms(1900)), None);
        assert_eq!(
            tracker.update(Some(0.9), start + ms(2100)),
            Some(HoldGesture::HoldRight)
        );
    }

    #[test]
    fn switching_zones_restarts_entry_without_firing() {
        let mut tracker = tracker();
        let start = Instant::now();
        tracker.update(Some(0.1), start);
        assert_eq!(tracker.update(Some(0.95), start + ms(1500)), None);
        assert_eq!(tracker.state(), ZoneState::Right);
        assert_eq!(tracker.update(Some(0.95), start + ms(2000)), None);
        assert_eq!(
            tracker.update(Some(0.95), start + ms(2600)),
            Some(HoldGesture::HoldRight)
        );
    }

    #[test]
    fn losing_the_hand_resets_to_none() {
        let mut tracker = tracker();
        let start = Instant::now();
        tracker.update(Some(0.1), start);
        assert_eq!(tracker.update(None, start + ms(1200)), None);
        assert_eq!(tracker.state(), ZoneState::None);
        assert_eq!(tracker.update(Some(0.1), start + ms(1300)), None);
    }

    #[test]
    fn exit_and_reentry_starts_a_fresh_hold_after_a_fire() {
        let mut tracker = tracker();
        let start = Instant::now();
        tracker.update(Some(0.1), start);
        assert!(tracker.update(Some(0.1), start + ms(1100)).is_some());
        tracker.update(Some(0.5), start + ms(1200));
        tracker.update(Some(0.1), start + ms(1300));
        assert_eq!(tracker.update(Some(0.1), start + ms(2200)), None);
        assert_eq!(
            tracker.update(Some(0.1), start + ms(2400)),
            Some(HoldGesture::HoldLeft)
        );
    }

    #[test]
    fn gestures_map_to_ui_modes() {
        assert_eq!(HoldGesture::HoldLeft.ui_mode(), UiMode::Dashboard);
        assert_eq!(HoldGesture::HoldRight.ui_mode(), UiMode::Mirror);
    }
}
