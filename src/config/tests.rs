use super::validation::sanitize_base_url;
use super::{MirrorConfig, DEFAULT_LEFT_ZONE, DEFAULT_RIGHT_ZONE};
use clap::Parser;
use std::time::Duration;

fn parse(args: &[&str]) -> MirrorConfig {
    let mut argv = vec!["test-app"];
    argv.extend_from_slice(args);
    MirrorConfig::parse_from(argv)
}

#[test]
fn defaults_validate() {
    let mut cfg = parse(&[]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.left_zone, DEFAULT_LEFT_ZONE);
    assert_eq!(cfg.right_zone, DEFAULT_RIGHT_ZONE);
}

#[test]
fn rejects_cursor_alpha_out_of_bounds() {
    let mut cfg = parse(&["--cursor-alpha", "0"]);
    assert!(cfg.validate().is_err());
    let mut cfg = parse(&["--cursor-alpha", "1.5"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_cursor_alpha_of_one() {
    let mut cfg = parse(&["--cursor-alpha", "1.0"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_crossed_zone_thresholds() {
    let mut cfg = parse(&["--left-zone", "0.7", "--right-zone", "0.3"]);
    assert!(cfg.validate().is_err());
    let mut cfg = parse(&["--left-zone", "0.5", "--right-zone", "0.5"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_zone_threshold_outside_unit_range() {
    let mut cfg = parse(&["--right-zone", "1.0"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_opacity_out_of_bounds() {
    let mut cfg = parse(&["--lip-opacity", "1.2"]);
    assert!(cfg.validate().is_err());
    let mut cfg = parse(&["--lip-opacity=-0.1"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_gesture_timing_over_limit() {
    let mut cfg = parse(&["--zone-cooldown-ms", "10001"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_cursor_timeout_longer_than_ui_timeout() {
    let mut cfg = parse(&["--ui-timeout-ms", "100", "--cursor-timeout-ms", "200"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_bad_stream_address_unless_disabled() {
    let mut cfg = parse(&["--stream-addr", "not-an-addr"]);
    assert!(cfg.validate().is_err());
    let mut cfg = parse(&["--stream-addr", "not-an-addr", "--no-stream"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_missing_camera_dir() {
    let mut cfg = parse(&["--camera-dir", "/definitely/not/here/narcissus"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn normalizes_trailing_slash_on_urls() {
    let mut cfg = parse(&["--ui-url", "http://mirror.local:8080/api/"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.ui_url, "http://mirror.local:8080/api");
}

#[test]
fn sanitize_base_url_rejects_other_schemes() {
    assert!(sanitize_base_url("ftp://host", "--ui-url").is_err());
    assert!(sanitize_base_url("http://", "--ui-url").is_err());
    assert!(sanitize_base_url("http://a b", "--ui-url").is_err());
}

#[test]
fn rejects_api_key_that_breaks_query() {
    let mut cfg = parse(&["--api-key", "a&b"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn gesture_config_converts_milliseconds() {
    let cfg = parse(&["--zone-hold-ms", "750", "--touch-cooldown-ms", "250"]);
    let gesture = cfg.gesture_config();
    assert_eq!(gesture.zone_hold, Duration::from_millis(750));
    assert_eq!(gesture.touch_cooldown, Duration::from_millis(250));
}
