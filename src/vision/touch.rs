//! "Touch your lips to change the shade": hit-testing the cursor against the
//! compositor mask plus the hold-to-confirm debounce on top of it.

use image::GrayImage;
use std::time::{Duration, Instant};

use crate::config::GestureConfig;

/// Whether the normalized cursor lands on a set pixel of the raw lip mask.
///
/// False when no mask exists yet or the cursor falls outside the frame.
pub fn check_touch(
    mask: Option<&GrayImage>,
    cursor_x: f32,
    cursor_y: f32,
    frame_width: u32,
    frame_height: u32,
) -> bool {
    let Some(mask) = mask else {
        return false;
    };
    let px = (cursor_x * frame_width as f32).floor();
    let py = (cursor_y * frame_height as f32).floor();
    if !(px >= 0.0 && py >= 0.0) {
        return false;
    }
    let (px, py) = (px as u32, py as u32);
    if px >= frame_width || py >= frame_height || px >= mask.width() || py >= mask.height() {
        return false;
    }
    mask.get_pixel(px, py).0[0] > 0
}

/// Hold-to-confirm debounce for lip touches.
///
/// Contact starts a timer; contact held past `hold` fires once and pushes the
/// timer `cooldown` into the future, so continued contact must outlast the
/// cooldown and another hold before firing again. Releasing resets at once.
#[derive(Debug, Clone)]
pub struct TouchHold {
    hold: Duration,
    cooldown: Duration,
    started_at: Option<Instant>,
}

impl TouchHold {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            hold: config.touch_hold,
            cooldown: config.touch_cooldown,
            started_at: None,
        }
    }

    pub fn update(&mut self, touching: bool, now: Instant) -> bool {
        if !touching {
            self.started_at = None;
            return false;
        }
        let Some(started_at) = self.started_at else {
            self.started_at = Some(now);
            return false;
        };
        if now.saturating_duration_since(started_at) > self.hold {
            self.started_at = Some(now + self.cooldown);
            return true;
        }
        false
    }

    pub fn is_touching(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn center_dot() -> GrayImage {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(5, 5, Luma([255]));
        mask
    }

    #[test]
    fn no_mask_never_hits() {
        assert!(!check_touch(None, 0.5, 0.5, 10, 10));
    }

    #[test]
    fn scales_normalized_cursor_to_pixels() {
        let mask = center_dot();
        assert!(check_touch(Some(&mask), 0.55, 0.55, 10, 10));
        assert!(!check_touch(Some(&mask), 0.45, 0.55, 10, 10));
    }

    #[test]
    fn out_of_bounds_cursor_misses() {
        let mask = GrayImage::from_pixel(10, 10, Luma([255]));
        assert!(!check_touch(Some(&mask), 1.0, 0.5, 10, 10));
        assert!(!check_touch(Some(&mask), -0.01, 0.5, 10, 10));
        assert!(!check_touch(Some(&mask), 0.5, 1.2, 10, 10));
        assert!(!check_touch(Some(&mask), -1.0, -1.0, 10, 10));
    }

    #[test]
    fn hold_fires_once_per_qualifying_hold() {
        let mut hold = TouchHold::new(&GestureConfig::default());
        let start = Instant::now();
        let mut fired_at = Vec::new();
        for step in 0..=120 {
            let at = step * 10;
            if hold.update(true, start + ms(at)) {
                fired_at.push(at);
            }
        }
        // 300 ms hold, then 500 ms cooldown plus another 300 ms hold.
        assert_eq!(fired_at, vec![310, 1120]);
    }

    #[test]
    fn release_resets_immediately() {
        let mut hold = TouchHold::new(&GestureConfig::default());
        let start = Instant::now();
        hold.update(true, start);
        hold.update(true, start + ms(250));
        assert!(!hold.update(false, start + ms(260)));
        assert!(!hold.is_touching());
        hold.update(true, start + ms(270));
        assert!(!hold.update(true, start + ms(500)));
        assert!(hold.update(true, start + ms(580)));
    }
}
