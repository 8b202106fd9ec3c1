use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use std::thread;

use super::MediaLauncher;
use crate::log_debug;

const YOUTUBE_MUSIC_SEARCH: &str = "https://music.youtube.com/search";

/// Opens a YouTube Music search in the desktop browser.
pub struct BrowserMediaLauncher {
    opener: Vec<String>,
}

impl Default for BrowserMediaLauncher {
    fn default() -> Self {
        Self {
            opener: platform_opener(),
        }
    }
}

fn platform_opener() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["open".into()]
    } else if cfg!(windows) {
        vec!["cmd".into(), "/C".into(), "start".into(), String::new()]
    } else {
        vec!["xdg-open".into()]
    }
}

/// Search URL for `query`, form-encoded.
pub fn media_search_url(query: &str) -> Result<String> {
    let url = ureq::get(YOUTUBE_MUSIC_SEARCH)
        .query("q", query)
        .request_url()
        .context("failed to build media URL")?;
    Ok(url.as_url().to_string())
}

impl BrowserMediaLauncher {
    /// Use a specific opener command; the URL is appended as the last argument.
    pub fn with_opener(opener: Vec<String>) -> Self {
        Self { opener }
    }
}

impl MediaLauncher for BrowserMediaLauncher {
    fn play(&self, query: &str) -> Result<()> {
        let url = media_search_url(query)?;
        let (program, args) = self
            .opener
            .split_first()
            .context("no browser opener configured")?;
        let mut child = Command::new(program)
            .args(args)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch {program}"))?;
        log_debug(&format!("media: opened {url}"));
        // Reap the opener off the dispatcher thread.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}
