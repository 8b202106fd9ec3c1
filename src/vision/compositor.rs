//! Virtual lipstick: rebuilds the lip mask every frame and blends the selected
//! palette color into it.

use image::{imageops, GrayImage, Rgb, RgbImage};
use std::fmt;
use tracing::debug;

use super::contours::{LIPS_INNER, LIPS_OUTER};
use super::mask::{donut_mask, to_pixels};
use super::{Landmark, Landmarks};
use crate::config::CompositorConfig;

/// Named lipstick shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub color: Rgb<u8>,
}

/// Palette in cycling order.
pub const PALETTE: [PaletteEntry; 5] = [
    PaletteEntry {
        name: "red",
        color: Rgb([200, 0, 0]),
    },
    PaletteEntry {
        name: "nude",
        color: Rgb([220, 150, 150]),
    },
    PaletteEntry {
        name: "pink",
        color: Rgb([255, 130, 180]),
    },
    PaletteEntry {
        name: "purple",
        color: Rgb([128, 0, 128]),
    },
    PaletteEntry {
        name: "dark",
        color: Rgb([100, 30, 30]),
    },
];

/// Keyword that removes the lipstick.
pub const COLOR_OFF: &str = "off";

/// Result of a `set_color` request, rendered as the short status text tools return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorStatus {
    Removed,
    Applied(&'static str),
    NotFound(String),
}

impl fmt::Display for ColorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removed => write!(f, "Makeup removed."),
            Self::Applied(name) => write!(f, "Applying {name} lipstick."),
            Self::NotFound(name) => write!(f, "Color {name} not found."),
        }
    }
}

pub fn palette_index(name: &str) -> Option<usize> {
    let wanted = name.trim();
    PALETTE
        .iter()
        .position(|entry| entry.name.eq_ignore_ascii_case(wanted))
}

/// Owns the lip mask and the color selection. Lives on the processing thread.
#[derive(Debug)]
pub struct MaskCompositor {
    config: CompositorConfig,
    enabled: bool,
    current: Option<usize>,
    mask: Option<GrayImage>,
}

impl MaskCompositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            config,
            enabled: false,
            current: None,
            mask: None,
        }
    }

    pub fn set_color(&mut self, name: &str) -> ColorStatus {
        if name.trim().eq_ignore_ascii_case(COLOR_OFF) {
            self.enabled = false;
            self.current = None;
            return ColorStatus::Removed;
        }
        match palette_index(name) {
            Some(idx) => {
                self.current = Some(idx);
                self.enabled = true;
                ColorStatus::Applied(PALETTE[idx].name)
            }
            None => ColorStatus::NotFound(name.trim().to_string()),
        }
    }

    /// Advance to the next shade (wrapping); no selection counts as "before the first".
    pub fn cycle_color(&mut self) -> &'static str {
        let next = self.current.map_or(0, |idx| (idx + 1) % PALETTE.len());
        self.current = Some(next);
        self.enabled = true;
        PALETTE[next].name
    }

    pub fn current_color(&self) -> Option<&'static PaletteEntry> {
        self.current.map(|idx| &PALETTE[idx])
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Raw, unblurred mask from the most recent frame.
    pub fn mask(&self) -> Option<&GrayImage> {
        self.mask.as_ref()
    }

    /// Recompute the mask from this frame's face (or clear it on a miss) and render.
    pub fn process(&mut self, frame: &RgbImage, face: Option<&Landmarks>) -> RgbImage {
        let contours = face.and_then(|marks| {
            let outer = marks.select(&LIPS_OUTER)?;
            let inner = marks.select(&LIPS_INNER)?;
            Some((outer, inner))
        });
        match contours {
            Some((outer, inner)) => self.render(frame, &outer, &inner),
            None => {
                self.clear_mask(frame.width(), frame.height());
                frame.clone()
            }
        }
    }

    /// Build the donut mask from ordered contours and blend the current color into it.
    pub fn render(&mut self, frame: &RgbImage, outer: &[Landmark], inner: &[Landmark]) -> RgbImage {
        let (width, height) = frame.dimensions();
        let mask = donut_mask(
            width,
            height,
            &to_pixels(outer, width, height),
            &to_pixels(inner, width, height),
        );

        let output = match self.current_color() {
            Some(entry) if self.enabled => {
                let soft = if self.config.blur_sigma > 0.0 {
                    imageops::blur(&mask, self.config.blur_sigma)
                } else {
                    mask.clone()
                };
                blend_color(frame, &soft, entry.color, self.config.opacity)
            }
            _ => frame.clone(),
        };
        self.mask = Some(mask);
        output
    }

    /// Empty the mask so a face that left the frame cannot be touched.
    pub fn clear_mask(&mut self, width: u32, height: u32) {
        debug!("no face detected; clearing lip mask");
        self.mask = Some(GrayImage::new(width, height));
    }
}

/// `out = color * a + orig * (1 - a)` with `a = mask / 255 * opacity`, in normalized space.
pub fn blend_color(frame: &RgbImage, mask: &GrayImage, color: Rgb<u8>, opacity: f32) -> RgbImage {
    let mut output = frame.clone();
    let tint = color.0.map(|c| c as f32 / 255.0);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let coverage = mask.get_pixel(x, y).0[0];
        if coverage == 0 {
            continue;
        }
        let alpha = coverage as f32 / 255.0 * opacity;
        for (channel, tint) in pixel.0.iter_mut().zip(tint) {
            let original = *channel as f32 / 255.0;
            let mixed = tint * alpha + original * (1.0 - alpha);
            *channel = (mixed * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::touch::check_touch;

    fn ring(cx: f32, cy: f32, rx: f32, ry: f32, count: usize) -> Vec<Landmark> {
        (0..count)
            .map(|i| {
                let theta = i as f32 / count as f32 * std::f32::consts::TAU;
                Landmark::new(cx + rx * theta.cos(), cy + ry * theta.sin())
            })
            .collect()
    }

    fn lips() -> (Vec<Landmark>, Vec<Landmark>) {
        (
            ring(0.5, 0.5, 0.3, 0.2, 21),
            ring(0.5, 0.5, 0.12, 0.06, 21),
        )
    }

    fn face_with_lips() -> Landmarks {
        let (outer, inner) = lips();
        let mut points = vec![Landmark::default(); 478];
        for (slot, point) in LIPS_OUTER.iter().zip(outer) {
            points[*slot] = point;
        }
        for (slot, point) in LIPS_INNER.iter().zip(inner) {
            points[*slot] = point;
        }
        Landmarks::new(points)
    }

    fn gray_frame() -> RgbImage {
        RgbImage::from_pixel(100, 100, Rgb([90, 90, 90]))
    }

    #[test]
    fn touch_hits_lip_band_only() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        let frame = gray_frame();
        let (outer, inner) = lips();
        compositor.render(&frame, &outer, &inner);
        let mask = compositor.mask();
        assert!(!check_touch(mask, 0.5, 0.5, 100, 100), "mouth hole is punched out");
        assert!(check_touch(mask, 0.5, 0.62, 100, 100), "lip band is hit");
        assert!(check_touch(mask, 0.25, 0.5, 100, 100), "lip corner region is hit");
        assert!(!check_touch(mask, 0.1, 0.1, 100, 100), "outside the lips");
    }

    #[test]
    fn disabled_compositor_passes_frame_but_keeps_mask() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        let frame = gray_frame();
        let (outer, inner) = lips();
        let output = compositor.render(&frame, &outer, &inner);
        assert_eq!(output, frame);
        let mask = compositor.mask().expect("mask computed while disabled");
        assert_eq!(mask.dimensions(), frame.dimensions());
        assert!(mask.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn enabled_compositor_tints_only_the_lips() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        compositor.set_color("red");
        let frame = gray_frame();
        let (outer, inner) = lips();
        let output = compositor.render(&frame, &outer, &inner);
        assert_eq!(output.get_pixel(5, 5), frame.get_pixel(5, 5));
        let tinted = output.get_pixel(50, 62);
        // Half-opacity red over gray 90: (200 + 90) / 2 = 145, (0 + 90) / 2 = 45.
        assert_eq!(tinted.0, [145, 45, 45]);
    }

    #[test]
    fn missing_face_clears_mask() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        let frame = gray_frame();
        compositor.process(&frame, Some(&face_with_lips()));
        assert!(check_touch(compositor.mask(), 0.5, 0.62, 100, 100));
        let output = compositor.process(&frame, None);
        assert_eq!(output, frame);
        assert!(!check_touch(compositor.mask(), 0.5, 0.62, 100, 100));
    }

    #[test]
    fn short_landmark_set_is_treated_as_a_miss() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        let frame = gray_frame();
        let partial = Landmarks::new(vec![Landmark::new(0.5, 0.5); 10]);
        compositor.process(&frame, Some(&partial));
        let mask = compositor.mask().expect("cleared mask present");
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn cycle_from_fresh_starts_at_first_entry_and_wraps() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        assert_eq!(compositor.cycle_color(), PALETTE[0].name);
        assert!(compositor.is_enabled());
        for entry in PALETTE.iter().skip(1) {
            assert_eq!(compositor.cycle_color(), entry.name);
        }
        assert_eq!(compositor.cycle_color(), PALETTE[0].name);
    }

    #[test]
    fn cycle_continues_from_explicit_selection() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        compositor.set_color("purple");
        assert_eq!(compositor.cycle_color(), "dark");
        assert_eq!(compositor.cycle_color(), "red");
    }

    #[test]
    fn off_is_idempotent() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        assert_eq!(compositor.set_color("off"), ColorStatus::Removed);
        assert!(!compositor.is_enabled());
        compositor.set_color("pink");
        assert_eq!(compositor.set_color("OFF"), ColorStatus::Removed);
        assert!(!compositor.is_enabled());
        assert!(compositor.current_color().is_none());
    }

    #[test]
    fn unknown_color_leaves_state_alone() {
        let mut compositor = MaskCompositor::new(CompositorConfig::default());
        compositor.set_color("nude");
        let status = compositor.set_color("chartreuse");
        assert_eq!(status.to_string(), "Color chartreuse not found.");
        assert_eq!(compositor.current_color().map(|e| e.name), Some("nude"));
        assert!(compositor.is_enabled());
    }

    #[test]
    fn status_messages_match_tool_wording() {
        assert_eq!(ColorStatus::Applied("red").to_string(), "Applying red lipstick.");
        assert_eq!(ColorStatus::Removed.to_string(), "Makeup removed.");
    }
}
