use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

use super::{MirrorUi, UiMode};
use crate::config::MirrorConfig;

const MIRROR_MODULE: &str = "MMM-NarcissusMirror";
const ALERT_TITLE: &str = "Narcissus";
const ALERT_TIMER_MS: u32 = 5000;

#[derive(Serialize)]
struct AlertPayload<'a> {
    title: &'a str,
    message: &'a str,
    timer: u32,
}

#[derive(Serialize)]
struct CursorPayload {
    x: f32,
    y: f32,
}

/// MagicMirror remote-control API client. Every request carries the shared
/// `apiKey`; cursor updates use their own, much shorter, timeout.
pub struct HttpMirrorUi {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
    cursor_agent: ureq::Agent,
}

impl HttpMirrorUi {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration, cursor_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            cursor_agent: ureq::AgentBuilder::new().timeout(cursor_timeout).build(),
        }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(
            &config.ui_url,
            &config.api_key,
            Duration::from_millis(config.ui_timeout_ms),
            Duration::from_millis(config.cursor_timeout_ms),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn get(&self, path: &str) -> Result<()> {
        self.agent
            .get(&self.url(path))
            .query("apiKey", &self.api_key)
            .call()
            .with_context(|| format!("GET {path}"))?;
        Ok(())
    }

    fn post(&self, agent: &ureq::Agent, path: &str, body: impl Serialize) -> Result<()> {
        agent
            .post(&self.url(path))
            .query("apiKey", &self.api_key)
            .send_json(body)
            .with_context(|| format!("POST {path}"))?;
        Ok(())
    }
}

impl MirrorUi for HttpMirrorUi {
    fn set_mode(&self, mode: UiMode) -> Result<()> {
        match mode {
            UiMode::Mirror => {
                self.get("module/all/hide")?;
                self.get(&format!("module/{MIRROR_MODULE}/show"))?;
                self.get("notification/NARCISSUS_SHOW_VIDEO")
            }
            UiMode::Dashboard => {
                self.get("module/all/show")?;
                self.get("notification/NARCISSUS_HIDE_VIDEO")
            }
        }
    }

    fn show_alert(&self, message: &str) -> Result<()> {
        self.post(
            &self.agent,
            "module/alert/showalert",
            AlertPayload {
                title: ALERT_TITLE,
                message,
                timer: ALERT_TIMER_MS,
            },
        )
    }

    fn send_cursor(&self, cursor: Option<(f32, f32)>) -> Result<()> {
        let (x, y) = cursor.unwrap_or((-1.0, -1.0));
        self.post(
            &self.cursor_agent,
            "notification/NARCISSUS_CURSOR",
            CursorPayload { x, y },
        )
    }
}
