/// Exponential low-pass filter over the raw fingertip position.
///
/// The first sample after [`CursorSmoother::reset`] passes through untouched so
/// a hand reappearing elsewhere does not drag in from its old position.
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    alpha: f32,
    prev: Option<(f32, f32)>,
}

impl CursorSmoother {
    /// `alpha` is the weight of the new sample; 1.0 disables smoothing.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            prev: None,
        }
    }

    pub fn update(&mut self, raw_x: f32, raw_y: f32) -> (f32, f32) {
        let smoothed = match self.prev {
            None => (raw_x, raw_y),
            Some((prev_x, prev_y)) => (
                self.alpha * raw_x + (1.0 - self.alpha) * prev_x,
                self.alpha * raw_y + (1.0 - self.alpha) * prev_y,
            ),
        };
        self.prev = Some(smoothed);
        smoothed
    }

    /// Forget the previous position; call whenever no hand was detected.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    /// Last smoothed position, `None` while the hand is absent.
    pub fn position(&self) -> Option<(f32, f32)> {
        self.prev
    }
}
