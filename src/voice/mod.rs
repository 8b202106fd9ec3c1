//! Voice producer: a background worker that pulls recognized utterances from a
//! speech recognizer, applies the wake-word gate, and queues voice events.
//!
//! Recognition itself is external. Anything that can hand over text lines
//! plugs in as a [`SpeechSource`]; the built-in source reads stdin so the
//! mirror can be driven from a terminal or a pipe.

mod wake;

pub use wake::{extract_command, WAKE_PHRASES};

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::events::{Event, EventSender};
use crate::{log_debug, log_debug_content};

/// How long the worker waits on the source before rechecking its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// What a recognizer produced within one poll window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    Utterance(String),
    Silence,
    /// The recognizer shut down; no more utterances will arrive.
    Closed,
}

pub trait SpeechSource: Send {
    /// Wait up to `timeout` for the next recognized utterance.
    fn listen(&mut self, timeout: Duration) -> Result<Heard>;
}

/// Treats each non-empty line as one recognized utterance.
pub struct StdinSpeechSource {
    lines: Receiver<String>,
}

impl StdinSpeechSource {
    /// Read lines from stdin on a detached reader thread.
    ///
    /// The reader stays blocked in `read_line` until stdin closes, so it is
    /// not joined on shutdown.
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = unbounded();
        thread::Builder::new()
            .name("narcissus-stdin".into())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                log_debug("stdin speech reader exiting");
            })
            .context("failed to spawn stdin reader")?;
        Ok(Self { lines: rx })
    }

    /// Any producer of text lines (an external recognizer bridge, a test).
    pub fn from_receiver(lines: Receiver<String>) -> Self {
        Self { lines }
    }
}

impl SpeechSource for StdinSpeechSource {
    fn listen(&mut self, timeout: Duration) -> Result<Heard> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) if line.trim().is_empty() => Ok(Heard::Silence),
            Ok(line) => Ok(Heard::Utterance(line)),
            Err(RecvTimeoutError::Timeout) => Ok(Heard::Silence),
            Err(RecvTimeoutError::Disconnected) => Ok(Heard::Closed),
        }
    }
}

/// Gate one utterance through the wake-word filter and queue it.
/// Returns whether an event was queued.
pub fn forward_utterance(text: &str, events: &EventSender, suppress_alert: bool) -> bool {
    log_debug_content(&format!("voice heard: {text}"));
    let Some(command) = extract_command(text) else {
        debug!("utterance ignored: no wake word");
        return false;
    };
    info!(command = %command, "wake word detected");
    let event = Event::voice(command);
    let event = if suppress_alert {
        event.suppressed()
    } else {
        event
    };
    events.put(event)
}

/// Running voice worker. Dropping it stops and joins the thread.
pub struct VoiceListener {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VoiceListener {
    pub fn start(
        mut source: Box<dyn SpeechSource>,
        events: EventSender,
        suppress_alerts: bool,
    ) -> Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&stop_flag);
        let handle = thread::Builder::new()
            .name("narcissus-voice".into())
            .spawn(move || {
                while !worker_flag.load(Ordering::Relaxed) {
                    match source.listen(POLL_INTERVAL) {
                        Ok(Heard::Utterance(text)) => {
                            forward_utterance(&text, &events, suppress_alerts);
                        }
                        Ok(Heard::Silence) => {}
                        Ok(Heard::Closed) => {
                            info!("speech source closed");
                            break;
                        }
                        Err(err) => {
                            warn!(error = %err, "speech recognition failed");
                            log_debug(&format!("voice listener error: {err:#}"));
                            thread::sleep(ERROR_BACKOFF);
                        }
                    }
                }
                log_debug("voice listener exiting");
            })
            .context("failed to spawn voice listener")?;
        info!("listening for voice commands");
        Ok(Self {
            stop_flag,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Signal the worker and wait for it; returns within one poll interval.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log_debug("voice listener panicked");
            }
        }
    }
}

impl Drop for VoiceListener {
    fn drop(&mut self) {
        self.stop();
    }
}
