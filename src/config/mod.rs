//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::*;

/// CLI options for the Narcissus mirror runtime. Validated values keep the
/// per-frame pipeline inside sane timing and geometry bounds.
#[derive(Debug, Parser, Clone)]
#[command(about = "Narcissus AR mirror runtime", author, version)]
pub struct MirrorConfig {
    /// Directory of PNG/JPEG frames to replay as the camera (looped)
    #[arg(long = "camera-dir", value_name = "DIR")]
    pub camera_dir: Option<PathBuf>,

    /// Width of synthetic frames when no camera directory is given
    #[arg(long = "frame-width", default_value_t = DEFAULT_FRAME_WIDTH)]
    pub frame_width: u32,

    /// Height of synthetic frames when no camera directory is given
    #[arg(long = "frame-height", default_value_t = DEFAULT_FRAME_HEIGHT)]
    pub frame_height: u32,

    /// JSONL file of recorded face/hand landmarks, one record per frame
    #[arg(long = "landmarks", value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Stop after this many frames (0 runs until interrupted)
    #[arg(long = "max-frames", default_value_t = 0)]
    pub max_frames: u64,

    /// Do not read voice utterances from stdin
    #[arg(long = "no-voice", default_value_t = false)]
    pub no_voice: bool,

    /// Keep voice replies off the mirror (still logged and kept in the transcript)
    #[arg(long = "no-alerts", env = "NARCISSUS_NO_ALERTS", default_value_t = false)]
    pub no_alerts: bool,

    /// Cursor smoothing factor (1.0 disables smoothing)
    #[arg(long = "cursor-alpha", default_value_t = DEFAULT_CURSOR_ALPHA)]
    pub cursor_alpha: f32,

    /// Normalized x below which the cursor is in the left zone
    #[arg(long = "left-zone", default_value_t = DEFAULT_LEFT_ZONE)]
    pub left_zone: f32,

    /// Normalized x above which the cursor is in the right zone
    #[arg(long = "right-zone", default_value_t = DEFAULT_RIGHT_ZONE)]
    pub right_zone: f32,

    /// Continuous zone occupancy required before a hold gesture fires (milliseconds)
    #[arg(long = "zone-hold-ms", default_value_t = DEFAULT_ZONE_HOLD_MS)]
    pub zone_hold_ms: u64,

    /// Quiet period after a hold gesture fires (milliseconds)
    #[arg(long = "zone-cooldown-ms", default_value_t = DEFAULT_ZONE_COOLDOWN_MS)]
    pub zone_cooldown_ms: u64,

    /// Lip contact required before the color cycles (milliseconds)
    #[arg(long = "touch-hold-ms", default_value_t = DEFAULT_TOUCH_HOLD_MS)]
    pub touch_hold_ms: u64,

    /// Quiet period after a lip touch fires (milliseconds)
    #[arg(long = "touch-cooldown-ms", default_value_t = DEFAULT_TOUCH_COOLDOWN_MS)]
    pub touch_cooldown_ms: u64,

    /// Lipstick blend opacity (0.0 - 1.0)
    #[arg(long = "lip-opacity", default_value_t = DEFAULT_LIP_OPACITY)]
    pub lip_opacity: f32,

    /// Gaussian blur sigma applied to the mask edge before blending
    #[arg(long = "lip-blur-sigma", default_value_t = DEFAULT_LIP_BLUR_SIGMA)]
    pub lip_blur_sigma: f32,

    /// Address the MJPEG stream listens on
    #[arg(long = "stream-addr", default_value = DEFAULT_STREAM_ADDR)]
    pub stream_addr: String,

    /// Minimum interval between streamed frames (milliseconds)
    #[arg(long = "stream-interval-ms", default_value_t = DEFAULT_STREAM_INTERVAL_MS)]
    pub stream_interval_ms: u64,

    /// JPEG quality for streamed frames (1 - 100)
    #[arg(long = "jpeg-quality", default_value_t = DEFAULT_JPEG_QUALITY)]
    pub jpeg_quality: u8,

    /// Disable the MJPEG stream server
    #[arg(long = "no-stream", default_value_t = false)]
    pub no_stream: bool,

    /// Base URL of the mirror UI remote-control API
    #[arg(long = "ui-url", env = "NARCISSUS_UI_URL", default_value = DEFAULT_UI_URL)]
    pub ui_url: String,

    /// Shared secret passed to the mirror UI as the apiKey parameter
    #[arg(
        long = "api-key",
        env = "NARCISSUS_API_KEY",
        default_value = DEFAULT_API_KEY,
        hide_env_values = true
    )]
    pub api_key: String,

    /// Timeout for mirror UI mode/alert calls (milliseconds)
    #[arg(long = "ui-timeout-ms", default_value_t = DEFAULT_UI_TIMEOUT_MS)]
    pub ui_timeout_ms: u64,

    /// Timeout for per-frame cursor forwarding (milliseconds)
    #[arg(long = "cursor-timeout-ms", default_value_t = DEFAULT_CURSOR_TIMEOUT_MS)]
    pub cursor_timeout_ms: u64,

    /// Base URL of the Ollama server used as command interpreter
    #[arg(long = "ollama-url", env = "NARCISSUS_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model name passed to the interpreter
    #[arg(long = "model", default_value = DEFAULT_OLLAMA_MODEL)]
    pub model: String,

    /// Interpreter request timeout (milliseconds)
    #[arg(long = "interpreter-timeout-ms", default_value_t = DEFAULT_INTERPRETER_TIMEOUT_MS)]
    pub interpreter_timeout_ms: u64,

    /// Disable the web search tool
    #[arg(long = "no-search", default_value_t = false)]
    pub no_search: bool,

    /// Web search request timeout (milliseconds)
    #[arg(long = "search-timeout-ms", default_value_t = DEFAULT_SEARCH_TIMEOUT_MS)]
    pub search_timeout_ms: u64,

    /// Sleep between runtime loop iterations (milliseconds)
    #[arg(long = "loop-sleep-ms", default_value_t = DEFAULT_LOOP_SLEEP_MS)]
    pub loop_sleep_ms: u64,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "NARCISSUS_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "NARCISSUS_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging transcripts and assistant replies (debug log only)
    #[arg(
        long = "log-content",
        env = "NARCISSUS_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Verbose console output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Timing and geometry knobs for the hand-driven gestures.
#[derive(Debug, Clone, Copy)]
pub struct GestureConfig {
    pub cursor_alpha: f32,
    pub left_zone: f32,
    pub right_zone: f32,
    pub zone_hold: Duration,
    pub zone_cooldown: Duration,
    pub touch_hold: Duration,
    pub touch_cooldown: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cursor_alpha: DEFAULT_CURSOR_ALPHA,
            left_zone: DEFAULT_LEFT_ZONE,
            right_zone: DEFAULT_RIGHT_ZONE,
            zone_hold: Duration::from_millis(DEFAULT_ZONE_HOLD_MS),
            zone_cooldown: Duration::from_millis(DEFAULT_ZONE_COOLDOWN_MS),
            touch_hold: Duration::from_millis(DEFAULT_TOUCH_HOLD_MS),
            touch_cooldown: Duration::from_millis(DEFAULT_TOUCH_COOLDOWN_MS),
        }
    }
}

/// Lipstick rendering knobs.
#[derive(Debug, Clone, Copy)]
pub struct CompositorConfig {
    pub opacity: f32,
    pub blur_sigma: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_LIP_OPACITY,
            blur_sigma: DEFAULT_LIP_BLUR_SIGMA,
        }
    }
}

/// MJPEG publisher knobs.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub addr: String,
    pub interval: Duration,
    pub jpeg_quality: u8,
}

impl MirrorConfig {
    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            cursor_alpha: self.cursor_alpha,
            left_zone: self.left_zone,
            right_zone: self.right_zone,
            zone_hold: Duration::from_millis(self.zone_hold_ms),
            zone_cooldown: Duration::from_millis(self.zone_cooldown_ms),
            touch_hold: Duration::from_millis(self.touch_hold_ms),
            touch_cooldown: Duration::from_millis(self.touch_cooldown_ms),
        }
    }

    pub fn compositor_config(&self) -> CompositorConfig {
        CompositorConfig {
            opacity: self.lip_opacity,
            blur_sigma: self.lip_blur_sigma,
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            addr: self.stream_addr.clone(),
            interval: Duration::from_millis(self.stream_interval_ms),
            jpeg_quality: self.jpeg_quality,
        }
    }

    pub fn loop_sleep(&self) -> Duration {
        Duration::from_millis(self.loop_sleep_ms)
    }
}
