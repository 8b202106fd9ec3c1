use super::defaults::{
    MAX_FRAME_DIMENSION, MAX_GESTURE_TIMING_MS, MAX_LIP_BLUR_SIGMA, MAX_LOOP_SLEEP_MS,
};
use super::MirrorConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::net::SocketAddr;

impl MirrorConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize URLs.
    pub fn validate(&mut self) -> Result<()> {
        if !(self.cursor_alpha > 0.0 && self.cursor_alpha <= 1.0) {
            bail!(
                "--cursor-alpha must be in (0.0, 1.0], got {}",
                self.cursor_alpha
            );
        }
        if !(self.left_zone > 0.0 && self.left_zone < 1.0) {
            bail!("--left-zone must be in (0.0, 1.0), got {}", self.left_zone);
        }
        if !(self.right_zone > 0.0 && self.right_zone < 1.0) {
            bail!("--right-zone must be in (0.0, 1.0), got {}", self.right_zone);
        }
        if self.left_zone >= self.right_zone {
            bail!(
                "--left-zone ({}) must be below --right-zone ({})",
                self.left_zone,
                self.right_zone
            );
        }
        for (flag, value) in [
            ("--zone-hold-ms", self.zone_hold_ms),
            ("--zone-cooldown-ms", self.zone_cooldown_ms),
            ("--touch-hold-ms", self.touch_hold_ms),
            ("--touch-cooldown-ms", self.touch_cooldown_ms),
        ] {
            if value > MAX_GESTURE_TIMING_MS {
                bail!("{flag} must be between 0 and {MAX_GESTURE_TIMING_MS} ms, got {value}");
            }
        }
        if !(0.0..=1.0).contains(&self.lip_opacity) {
            bail!(
                "--lip-opacity must be between 0.0 and 1.0, got {}",
                self.lip_opacity
            );
        }
        if !(0.0..=MAX_LIP_BLUR_SIGMA).contains(&self.lip_blur_sigma) {
            bail!(
                "--lip-blur-sigma must be between 0.0 and {MAX_LIP_BLUR_SIGMA}, got {}",
                self.lip_blur_sigma
            );
        }
        if self.frame_width == 0
            || self.frame_height == 0
            || self.frame_width > MAX_FRAME_DIMENSION
            || self.frame_height > MAX_FRAME_DIMENSION
        {
            bail!(
                "--frame-width/--frame-height must be between 1 and {MAX_FRAME_DIMENSION}, got {}x{}",
                self.frame_width,
                self.frame_height
            );
        }
        if !(1..=1000).contains(&self.stream_interval_ms) {
            bail!(
                "--stream-interval-ms must be between 1 and 1000, got {}",
                self.stream_interval_ms
            );
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            bail!(
                "--jpeg-quality must be between 1 and 100, got {}",
                self.jpeg_quality
            );
        }
        if self.loop_sleep_ms > MAX_LOOP_SLEEP_MS {
            bail!(
                "--loop-sleep-ms must be between 0 and {MAX_LOOP_SLEEP_MS}, got {}",
                self.loop_sleep_ms
            );
        }
        if self.ui_timeout_ms == 0 || self.ui_timeout_ms > 5000 {
            bail!(
                "--ui-timeout-ms must be between 1 and 5000, got {}",
                self.ui_timeout_ms
            );
        }
        if self.cursor_timeout_ms == 0 || self.cursor_timeout_ms > self.ui_timeout_ms {
            bail!(
                "--cursor-timeout-ms must be between 1 and --ui-timeout-ms ({})",
                self.ui_timeout_ms
            );
        }
        if self.interpreter_timeout_ms < 1000 || self.interpreter_timeout_ms > 120_000 {
            bail!(
                "--interpreter-timeout-ms must be between 1000 and 120000, got {}",
                self.interpreter_timeout_ms
            );
        }
        if self.search_timeout_ms == 0 || self.search_timeout_ms > 30_000 {
            bail!(
                "--search-timeout-ms must be between 1 and 30000, got {}",
                self.search_timeout_ms
            );
        }
        if self.model.trim().is_empty() {
            bail!("--model must not be empty");
        }
        if self.api_key.chars().any(|ch| ch.is_control() || ch == '&') {
            bail!("--api-key contains unsupported characters");
        }

        if !self.no_stream {
            self.stream_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("--stream-addr is not a socket address: {}", self.stream_addr))?;
        }
        self.ui_url = sanitize_base_url(&self.ui_url, "--ui-url")?;
        self.ollama_url = sanitize_base_url(&self.ollama_url, "--ollama-url")?;

        if let Some(dir) = &self.camera_dir {
            if !dir.is_dir() {
                bail!("--camera-dir must be an existing directory: {}", dir.display());
            }
        }
        if let Some(path) = &self.landmarks {
            if !path.is_file() {
                bail!("--landmarks must be an existing file: {}", path.display());
            }
        }
        Ok(())
    }
}

/// Require an http(s) URL and drop trailing slashes so endpoint paths join cleanly.
pub(super) fn sanitize_base_url(raw: &str, flag: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        bail!("{flag} must start with http:// or https://, got {trimmed:?}");
    }
    if trimmed.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        bail!("{flag} must not contain whitespace");
    }
    let normalized = trimmed.trim_end_matches('/');
    if normalized.ends_with("://") {
        bail!("{flag} is missing a host");
    }
    Ok(normalized.to_string())
}
