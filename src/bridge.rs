use std::sync::{Arc, Mutex};

use crate::lock_or_recover;
use crate::vision::Frame;

#[derive(Default)]
struct Slot {
    frame: Option<Frame>,
    seq: u64,
}

/// Single-slot, latest-wins hand-off from the processing thread to the
/// stream publisher. Cloning yields another handle to the same slot.
#[derive(Clone, Default)]
pub struct FrameBridge {
    slot: Arc<Mutex<Slot>>,
}

impl FrameBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is pending with a copy of `frame`.
    pub fn publish(&self, frame: &Frame) {
        let mut slot = lock_or_recover(&self.slot, "FrameBridge::publish");
        slot.frame = Some(frame.clone());
        slot.seq = slot.seq.wrapping_add(1);
    }

    /// Take the pending frame; `None` if nothing new was published since the last take.
    pub fn consume(&self) -> Option<Frame> {
        lock_or_recover(&self.slot, "FrameBridge::consume").frame.take()
    }

    /// Number of publishes so far.
    pub fn sequence(&self) -> u64 {
        lock_or_recover(&self.slot, "FrameBridge::sequence").seq
    }
}
