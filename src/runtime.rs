//! The processing loop: one camera frame per iteration through the whole
//! perception pipeline, then at most one dispatched event.

use image::imageops;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::bridge::FrameBridge;
use crate::camera::FrameSource;
use crate::config::{CompositorConfig, GestureConfig};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::events::{Event, EventSender};
use crate::log_debug;
use crate::vision::contours::INDEX_FINGER_TIP;
use crate::vision::{
    check_touch, CursorSmoother, Frame, FrameStamp, HoldGesture, LandmarkProvider, Landmarks,
    MaskCompositor, TouchHold, ZoneGestureTracker,
};

/// Face and hand detectors, run on every frame.
pub struct Perception {
    pub face: Box<dyn LandmarkProvider>,
    pub hand: Box<dyn LandmarkProvider>,
}

/// What happened to one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub cursor: Option<(f32, f32)>,
    pub gesture: Option<HoldGesture>,
    /// New color when a lip touch fired this frame.
    pub touched: Option<&'static str>,
    pub face_found: bool,
}

pub struct MirrorRuntime {
    camera: Box<dyn FrameSource>,
    perception: Perception,
    smoother: CursorSmoother,
    zones: ZoneGestureTracker,
    touch: TouchHold,
    compositor: MaskCompositor,
    bridge: FrameBridge,
    dispatcher: Dispatcher,
    gestures: EventSender,
    started: Instant,
    frames: u64,
}

impl MirrorRuntime {
    pub fn new(
        camera: Box<dyn FrameSource>,
        perception: Perception,
        gesture_config: &GestureConfig,
        compositor_config: CompositorConfig,
        bridge: FrameBridge,
        dispatcher: Dispatcher,
    ) -> Self {
        let gestures = dispatcher.sender();
        Self {
            camera,
            perception,
            smoother: CursorSmoother::new(gesture_config.cursor_alpha),
            zones: ZoneGestureTracker::new(gesture_config),
            touch: TouchHold::new(gesture_config),
            compositor: MaskCompositor::new(compositor_config),
            bridge,
            dispatcher,
            gestures,
            started: Instant::now(),
            frames: 0,
        }
    }

    pub fn compositor(&self) -> &MaskCompositor {
        &self.compositor
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Run until `stop` is raised or `max_frames` frames went through (0 = no limit).
    pub fn run(&mut self, stop: &AtomicBool, max_frames: u64, sleep: Duration) -> u64 {
        info!(max_frames, "mirror runtime started");
        while !stop.load(Ordering::Relaxed) {
            if max_frames > 0 && self.frames >= max_frames {
                info!(frames = self.frames, "frame limit reached");
                break;
            }
            self.tick(Instant::now());
            if !sleep.is_zero() {
                thread::sleep(sleep);
            }
        }
        self.frames
    }

    /// One loop iteration: camera, vision, then one dispatched event.
    pub fn tick(&mut self, now: Instant) -> Option<DispatchOutcome> {
        match self.camera.read() {
            Ok(Some(frame)) => {
                self.process_frame(frame, now);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "camera read failed");
                log_debug(&format!("camera read failed: {err:#}"));
            }
        }
        self.dispatcher.step(&mut self.compositor)
    }

    pub fn process_frame(&mut self, mut frame: Frame, now: Instant) -> FrameReport {
        imageops::flip_horizontal_in_place(&mut frame);
        let stamp = FrameStamp {
            index: self.frames,
            timestamp_ms: now.saturating_duration_since(self.started).as_millis() as u64,
        };
        self.frames += 1;
        let mut report = FrameReport::default();

        let hand = detect(self.perception.hand.as_mut(), &frame, stamp, "hand");
        report.cursor = match hand.as_ref().and_then(|h| h.get(INDEX_FINGER_TIP)) {
            Some(tip) => Some(self.smoother.update(tip.x, tip.y)),
            None => {
                self.smoother.reset();
                None
            }
        };

        report.gesture = self.zones.update(report.cursor.map(|(x, _)| x), now);
        if let Some(gesture) = report.gesture {
            let intent = gesture.ui_mode().as_str();
            info!(gesture = gesture.as_str(), intent, "hold gesture");
            self.gestures.put(Event::gesture(intent));
        }

        let face = detect(self.perception.face.as_mut(), &frame, stamp, "face");
        report.face_found = face.is_some();
        let output = self.compositor.process(&frame, face.as_ref());
        self.bridge.publish(&output);

        let touching = report.cursor.is_some_and(|(x, y)| {
            check_touch(
                self.compositor.mask(),
                x,
                y,
                frame.width(),
                frame.height(),
            )
        });
        if self.touch.update(touching, now) {
            let color = self.compositor.cycle_color();
            info!(color, "lip touch cycled color");
            report.touched = Some(color);
        }

        self.dispatcher.forward_cursor(report.cursor);
        report
    }

    /// Release the capture device.
    pub fn shutdown(&mut self) {
        self.camera.release();
        info!(frames = self.frames, "camera released");
    }
}

fn detect(
    provider: &mut dyn LandmarkProvider,
    frame: &Frame,
    stamp: FrameStamp,
    what: &str,
) -> Option<Landmarks> {
    match provider.detect(frame, stamp) {
        Ok(found) => found,
        Err(err) => {
            debug!(subject = what, error = %err, "landmark detection failed");
            None
        }
    }
}
