//! Per-frame vision pipeline: landmark contracts, cursor smoothing, zone
//! gestures, lip mask compositing, and touch hit-testing.
//!
//! Everything here is owned by the capture/processing thread, so none of it
//! locks. Landmark inference itself lives behind [`LandmarkProvider`].

pub mod compositor;
pub mod contours;
pub mod mask;
pub mod replay;
pub mod smoothing;
pub mod touch;
pub mod zones;

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

pub use compositor::{ColorStatus, MaskCompositor, PaletteEntry, PALETTE};
pub use smoothing::CursorSmoother;
pub use touch::{check_touch, TouchHold};
pub use zones::{HoldGesture, ZoneGestureTracker, ZoneState};

/// A video frame in RGB channel order.
pub type Frame = RgbImage;

/// Keypoint in normalized image coordinates (`0.0..=1.0` on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// All keypoints a detector returned for one subject, index-addressable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Landmarks {
    pub points: Vec<Landmark>,
}

impl Landmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    /// Pick an ordered contour; `None` if the detector returned too few points.
    pub fn select(&self, indices: &[usize]) -> Option<Vec<Landmark>> {
        indices.iter().map(|&idx| self.get(idx)).collect()
    }
}

/// Identifies the frame handed to a detector. `timestamp_ms` is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStamp {
    pub index: u64,
    pub timestamp_ms: u64,
}

/// Face or hand keypoint inference. Returns `Ok(None)` when no subject is visible.
pub trait LandmarkProvider: Send {
    fn detect(&mut self, frame: &Frame, stamp: FrameStamp) -> Result<Option<Landmarks>>;
}

/// Provider that never sees anyone; used when no detector is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLandmarks;

impl LandmarkProvider for NoLandmarks {
    fn detect(&mut self, _frame: &Frame, _stamp: FrameStamp) -> Result<Option<Landmarks>> {
        Ok(None)
    }
}
