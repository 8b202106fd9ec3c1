//! Capture devices. The runtime only sees [`FrameSource`]; a hardware camera
//! binding plugs in behind the same trait.

use anyhow::{bail, Context, Result};
use image::Rgb;
use std::fs;
use std::path::{Path, PathBuf};

use crate::log_debug;
use crate::vision::Frame;

pub trait FrameSource: Send {
    /// Next frame, or `Ok(None)` when the device has nothing this tick.
    fn read(&mut self) -> Result<Option<Frame>>;

    /// Free the device. Called once on shutdown.
    fn release(&mut self) {}
}

/// Replays still images from a directory in file-name order, looping forever.
pub struct DirectoryFrameSource {
    files: Vec<PathBuf>,
    next: usize,
}

impl DirectoryFrameSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("failed to read camera directory {}", dir.display()))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        if files.is_empty() {
            bail!("no PNG or JPEG frames found in {}", dir.display());
        }
        files.sort();
        log_debug(&format!(
            "camera: replaying {} frames from {}",
            files.len(),
            dir.display()
        ));
        Ok(Self { files, next: 0 })
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

impl FrameSource for DirectoryFrameSource {
    fn read(&mut self) -> Result<Option<Frame>> {
        if self.files.is_empty() {
            return Ok(None);
        }
        let path = &self.files[self.next];
        self.next = (self.next + 1) % self.files.len();
        let image = image::open(path)
            .with_context(|| format!("failed to decode frame {}", path.display()))?;
        Ok(Some(image.to_rgb8()))
    }

    fn release(&mut self) {
        self.files.clear();
        self.next = 0;
    }
}

/// Flat frames of a fixed size; keeps the pipeline and stream alive with no camera.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    released: bool,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            released: false,
        }
    }
}

impl FrameSource for SyntheticFrameSource {
    fn read(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }
        Ok(Some(Frame::from_pixel(self.width, self.height, Rgb([32, 32, 32]))))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("narcissus_camera_{tag}_{nanos}"));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn directory_source_loops_in_name_order() {
        let dir = scratch_dir("loop");
        Frame::from_pixel(2, 2, Rgb([10, 0, 0]))
            .save(dir.join("b.png"))
            .expect("write b");
        Frame::from_pixel(2, 2, Rgb([20, 0, 0]))
            .save(dir.join("a.png"))
            .expect("write a");
        fs::write(dir.join("notes.txt"), "skip me").expect("write txt");

        let mut source = DirectoryFrameSource::open(&dir).expect("open dir");
        assert_eq!(source.frame_count(), 2);
        let reds: Vec<u8> = (0..3)
            .map(|_| source.read().expect("read").expect("frame").get_pixel(0, 0).0[0])
            .collect();
        assert_eq!(reds, vec![20, 10, 20]);

        source.release();
        assert!(source.read().expect("read after release").is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = scratch_dir("empty");
        assert!(DirectoryFrameSource::open(&dir).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn synthetic_source_stops_after_release() {
        let mut source = SyntheticFrameSource::new(8, 6);
        let frame = source.read().expect("read").expect("frame");
        assert_eq!(frame.dimensions(), (8, 6));
        source.release();
        assert!(source.read().expect("read").is_none());
    }
}
