pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
pub const MAX_FRAME_DIMENSION: u32 = 4096;

pub const DEFAULT_CURSOR_ALPHA: f32 = 0.5;
pub const DEFAULT_LEFT_ZONE: f32 = 0.2;
pub const DEFAULT_RIGHT_ZONE: f32 = 0.8;
pub const DEFAULT_ZONE_HOLD_MS: u64 = 1000;
pub const DEFAULT_ZONE_COOLDOWN_MS: u64 = 2000;
pub const DEFAULT_TOUCH_HOLD_MS: u64 = 300;
pub const DEFAULT_TOUCH_COOLDOWN_MS: u64 = 500;
pub const MAX_GESTURE_TIMING_MS: u64 = 10_000;

pub const DEFAULT_LIP_OPACITY: f32 = 0.5;
pub const DEFAULT_LIP_BLUR_SIGMA: f32 = 1.2;
pub const MAX_LIP_BLUR_SIGMA: f32 = 10.0;

pub const DEFAULT_STREAM_ADDR: &str = "0.0.0.0:5050";
pub const DEFAULT_STREAM_INTERVAL_MS: u64 = 16;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

pub const DEFAULT_UI_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_API_KEY: &str = "narcissus_secret";
pub const DEFAULT_UI_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_CURSOR_TIMEOUT_MS: u64 = 50;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_INTERPRETER_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 3000;

pub const DEFAULT_LOOP_SLEEP_MS: u64 = 10;
pub const MAX_LOOP_SLEEP_MS: u64 = 1000;
