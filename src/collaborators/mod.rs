//! Outbound collaborators (mirror UI, web search, media playback, display
//! hardware) behind narrow traits, plus the failure policy applied to each.
//!
//! No collaborator error ever leaves this layer: every call goes through
//! [`call_with_policy`], which decides whether to retry, log, or stay silent.

mod media;
mod mirror_ui;
mod search;

pub use media::{media_search_url, BrowserMediaLauncher};
pub use mirror_ui::HttpMirrorUi;
pub use search::{format_hits, DisabledSearch, DuckDuckGoSearch, SearchHit, DUCKDUCKGO_ENDPOINT};

use anyhow::Result;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::log_debug;

/// Tool status when search is switched off.
pub const SEARCH_DISABLED: &str = "Online Search not enabled.";
/// Tool status when every search attempt came back empty or failed.
pub const SEARCH_NO_RESULTS: &str = "No results found.";

/// Layout of the mirror UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Widgets hidden, camera feed visible.
    Mirror,
    /// Widgets visible, camera feed hidden.
    Dashboard,
}

impl UiMode {
    /// Intent string used by gesture events and the `control_hardware` tool.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mirror => "mirror_mode",
            Self::Dashboard => "dashboard_mode",
        }
    }

    pub fn from_intent(intent: &str) -> Option<Self> {
        match intent.trim() {
            "mirror_mode" => Some(Self::Mirror),
            "dashboard_mode" => Some(Self::Dashboard),
            _ => None,
        }
    }

    /// Status text handed back to the interpreter after a switch.
    pub fn status(self) -> &'static str {
        match self {
            Self::Mirror => "UI: Mirror Mode (Camera Visible)",
            Self::Dashboard => "UI: Dashboard Mode",
        }
    }
}

/// The remote mirror display (MagicMirror remote-control API or similar).
pub trait MirrorUi: Send {
    fn set_mode(&self, mode: UiMode) -> Result<()>;
    fn show_alert(&self, message: &str) -> Result<()>;
    /// `None` tells the UI the hand left the frame.
    fn send_cursor(&self, cursor: Option<(f32, f32)>) -> Result<()>;
}

pub trait WebSearch: Send {
    fn enabled(&self) -> bool {
        true
    }
    fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

pub trait MediaLauncher: Send {
    fn play(&self, query: &str) -> Result<()>;
}

/// Which outbound call is being made; selects the failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    UiMode,
    UiAlert,
    UiCursor,
    Search,
    Interpreter,
    Media,
}

impl Collaborator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UiMode => "ui_mode",
            Self::UiAlert => "ui_alert",
            Self::UiCursor => "ui_cursor",
            Self::Search => "search",
            Self::Interpreter => "interpreter",
            Self::Media => "media",
        }
    }
}

/// What to do when a collaborator call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorPolicy {
    /// Drop silently (per-frame calls that would flood the logs).
    Ignore,
    /// Log and continue with a fallback.
    Log,
    /// Try up to `attempts` times, sleeping `pause` between tries.
    Retry { attempts: u32, pause: Duration },
}

/// Per-collaborator policies. `Default` is the production table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyTable {
    pub ui_mode: CollaboratorPolicy,
    pub ui_alert: CollaboratorPolicy,
    pub ui_cursor: CollaboratorPolicy,
    pub search: CollaboratorPolicy,
    pub interpreter: CollaboratorPolicy,
    pub media: CollaboratorPolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            ui_mode: CollaboratorPolicy::Log,
            ui_alert: CollaboratorPolicy::Log,
            ui_cursor: CollaboratorPolicy::Ignore,
            search: CollaboratorPolicy::Retry {
                attempts: 3,
                pause: Duration::from_secs(1),
            },
            interpreter: CollaboratorPolicy::Log,
            media: CollaboratorPolicy::Log,
        }
    }
}

impl PolicyTable {
    pub fn policy(&self, who: Collaborator) -> CollaboratorPolicy {
        match who {
            Collaborator::UiMode => self.ui_mode,
            Collaborator::UiAlert => self.ui_alert,
            Collaborator::UiCursor => self.ui_cursor,
            Collaborator::Search => self.search,
            Collaborator::Interpreter => self.interpreter,
            Collaborator::Media => self.media,
        }
    }
}

pub fn policy_for(who: Collaborator) -> CollaboratorPolicy {
    PolicyTable::default().policy(who)
}

/// Run `op` under `policy`. `None` means every attempt failed.
pub fn call_with_policy<T>(
    who: Collaborator,
    policy: CollaboratorPolicy,
    mut op: impl FnMut() -> Result<T>,
) -> Option<T> {
    let attempts = match policy {
        CollaboratorPolicy::Retry { attempts, .. } => attempts.max(1),
        _ => 1,
    };
    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Some(value),
            Err(err) => match policy {
                CollaboratorPolicy::Ignore => {}
                CollaboratorPolicy::Log => {
                    warn!(collaborator = who.as_str(), error = %err, "collaborator call failed");
                    log_debug(&format!("{} failed: {err:#}", who.as_str()));
                }
                CollaboratorPolicy::Retry { pause, .. } => {
                    warn!(
                        collaborator = who.as_str(),
                        attempt,
                        attempts,
                        error = %err,
                        "collaborator call failed"
                    );
                    if attempt < attempts {
                        thread::sleep(pause);
                    }
                }
            },
        }
    }
    None
}

/// Clamp to 0-100 and report. The panel itself is driven by the display host.
pub fn set_brightness(level: i64) -> String {
    let level = level.clamp(0, 100);
    info!(level, "brightness set");
    log_debug(&format!("brightness set to {level}%"));
    format!("Brightness set to {level}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::Cell;

    #[test]
    fn ui_mode_round_trips_through_intent_strings() {
        for mode in [UiMode::Mirror, UiMode::Dashboard] {
            assert_eq!(UiMode::from_intent(mode.as_str()), Some(mode));
        }
        assert_eq!(UiMode::from_intent("party_mode"), None);
    }

    #[test]
    fn production_table_matches_call_sites() {
        assert_eq!(policy_for(Collaborator::UiCursor), CollaboratorPolicy::Ignore);
        assert_eq!(policy_for(Collaborator::UiAlert), CollaboratorPolicy::Log);
        assert!(matches!(
            policy_for(Collaborator::Search),
            CollaboratorPolicy::Retry { attempts: 3, .. }
        ));
    }

    #[test]
    fn retry_stops_at_first_success() {
        let calls = Cell::new(0);
        let policy = CollaboratorPolicy::Retry {
            attempts: 3,
            pause: Duration::ZERO,
        };
        let result = call_with_policy(Collaborator::Search, policy, || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Err(anyhow!("flaky"))
            } else {
                Ok("hit")
            }
        });
        assert_eq!(result, Some("hit"));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn log_policy_tries_once() {
        let calls = Cell::new(0);
        let result: Option<()> = call_with_policy(Collaborator::UiMode, CollaboratorPolicy::Log, || {
            calls.set(calls.get() + 1);
            Err(anyhow!("ui offline"))
        });
        assert!(result.is_none());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn brightness_is_clamped() {
        assert_eq!(set_brightness(150), "Brightness set to 100%");
        assert_eq!(set_brightness(-4), "Brightness set to 0%");
        assert_eq!(set_brightness(42), "Brightness set to 42%");
    }
}
