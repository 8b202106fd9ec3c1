//! Single consumer of the event bus. Runs inline on the processing thread, so
//! a slow collaborator (search, interpreter) stalls video for its duration;
//! this is the one serialization point between perception and actions.
//!
//! Gesture events switch the UI directly and never reach the interpreter.
//! Voice events go through the interpreter, its tool calls run here, and the
//! reply is shown as a mirror alert unless it was a makeup change, too short,
//! or the event asked to stay quiet.


use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::collaborators::{
    call_with_policy, format_hits, set_brightness, Collaborator, MediaLauncher, MirrorUi,
    PolicyTable, UiMode, WebSearch, SEARCH_DISABLED, SEARCH_NO_RESULTS,
};
use crate::events::{Event, EventBus, EventKind, EventSender};
use crate::interpreter::{
    ChatMessage, CommandInterpreter, HardwareSetting, InterpreterReply, Role, ToolCall,
    SYSTEM_PROMPT,
};
use crate::vision::MaskCompositor;
use crate::{log_debug, log_debug_content};

/// Replies this short (in characters) or shorter are not worth an alert.
const MIN_ALERT_CHARS: usize = 5;

/// Transcript cap, system prompt included. Oldest whole turns go first.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 41;

/// Where an event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Received,
    Interpreting,
    ExecutingTools,
    ResponseReady,
    Displayed,
    Suppressed,
    Dropped,
}

impl DispatchStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Interpreting => "interpreting",
            Self::ExecutingTools => "executing_tools",
            Self::ResponseReady => "response_ready",
            Self::Displayed => "displayed",
            Self::Suppressed => "suppressed",
            Self::Dropped => "dropped",
        }
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub kind: EventKind,
    pub stage: DispatchStage,
    /// Cleaned reply text for voice events.
    pub reply: Option<String>,
    /// Names of the tools that ran, in order.
    pub tools: Vec<String>,
}

impl DispatchOutcome {
    fn new(kind: EventKind, stage: DispatchStage) -> Self {
        Self {
            kind,
            stage,
            reply: None,
            tools: Vec::new(),
        }
    }
}

/// Everything the dispatcher calls out to.
pub struct Collaborators {
    pub interpreter: Box<dyn CommandInterpreter>,
    pub ui: Box<dyn MirrorUi>,
    pub search: Box<dyn WebSearch>,
    pub media: Box<dyn MediaLauncher>,
}

pub struct Dispatcher {
    events: EventBus,
    collaborators: Collaborators,
    policies: PolicyTable,
    transcript: Vec<ChatMessage>,
    mode: UiMode,
}

impl Dispatcher {
    pub fn new(events: EventBus, collaborators: Collaborators) -> Self {
        Self {
            events,
            collaborators,
            policies: PolicyTable::default(),
            transcript: vec![ChatMessage::system(SYSTEM_PROMPT)],
            mode: UiMode::Dashboard,
        }
    }

    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Producer handle for gesture and voice sources.
    pub fn sender(&self) -> EventSender {
        self.events.sender()
    }

    pub fn put(&self, event: Event) {
        self.events.put(event);
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Handle at most one queued event; `None` when the bus was empty.
    pub fn step(&mut self, compositor: &mut MaskCompositor) -> Option<DispatchOutcome> {
        let event = self.events.try_get()?;
        Some(self.handle(event, compositor))
    }

    pub fn handle(&mut self, event: Event, compositor: &mut MaskCompositor) -> DispatchOutcome {
        debug!(
            kind = event.kind.as_str(),
            stage = DispatchStage::Received.as_str(),
            "event received"
        );
        let outcome = match event.kind {
            EventKind::Gesture => self.handle_gesture(&event.payload),
            EventKind::Voice => self.handle_voice(&event, compositor),
        };
        info!(
            kind = outcome.kind.as_str(),
            stage = outcome.stage.as_str(),
            tools = outcome.tools.len(),
            "event handled"
        );
        outcome
    }

    /// Best-effort cursor forwarding; failures are ignored.
    pub fn forward_cursor(&self, cursor: Option<(f32, f32)>) {
        let ui = &self.collaborators.ui;
        call_with_policy(
            Collaborator::UiCursor,
            self.policies.policy(Collaborator::UiCursor),
            || ui.send_cursor(cursor),
        );
    }

    fn handle_gesture(&mut self, payload: &str) -> DispatchOutcome {
        let Some(mode) = UiMode::from_intent(payload) else {
            warn!(payload, "unknown gesture intent dropped");
            return DispatchOutcome::new(EventKind::Gesture, DispatchStage::Dropped);
        };
        self.apply_mode(mode);
        info!(mode = mode.as_str(), "gesture switched mode");
        DispatchOutcome::new(EventKind::Gesture, DispatchStage::Displayed)
    }

    fn apply_mode(&mut self, mode: UiMode) -> bool {
        self.mode = mode;
        let ui = &self.collaborators.ui;
        call_with_policy(
            Collaborator::UiMode,
            self.policies.policy(Collaborator::UiMode),
            || ui.set_mode(mode),
        )
        .is_some()
    }

    fn interpret(&self, offer_tools: bool) -> Option<InterpreterReply> {
        let interpreter = &self.collaborators.interpreter;
        let transcript = &self.transcript;
        call_with_policy(
            Collaborator::Interpreter,
            self.policies.policy(Collaborator::Interpreter),
            || interpreter.chat(transcript, offer_tools),
        )
    }

    fn handle_voice(&mut self, event: &Event, compositor: &mut MaskCompositor) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::new(EventKind::Voice, DispatchStage::Interpreting);
        log_debug_content(&format!("voice command: {}", event.payload));
        self.transcript.push(ChatMessage::user(event.payload.as_str()));

        let Some(reply) = self.interpret(true) else {
            // Keep the unanswered turn out of later requests.
            self.transcript.pop();
            log_debug("interpreter unavailable; voice event dropped");
            outcome.stage = DispatchStage::Dropped;
            return outcome;
        };

        let mut content = reply.content;
        let mut makeup_changed = false;
        if !reply.tool_calls.is_empty() {
            outcome.stage = DispatchStage::ExecutingTools;
            for call in &reply.tool_calls {
                info!(tool = call.name(), "executing tool");
                let status = self.execute_tool(call, compositor);
                match call {
                    ToolCall::PlayMedia { query } => content = format!("Playing {query}..."),
                    ToolCall::ControlMakeup { .. } => makeup_changed = true,
                    _ => {}
                }
                self.transcript.push(ChatMessage::tool(status));
                outcome.tools.push(call.name().to_string());
            }
            if content.trim().is_empty() {
                content = self
                    .interpret(false)
                    .map(|follow_up| follow_up.content)
                    .unwrap_or_default();
            }
        }
        self.transcript.push(ChatMessage::assistant(content.as_str()));
        self.trim_transcript();

        outcome.stage = DispatchStage::ResponseReady;
        let text = unwrap_alert(&content).to_string();
        log_debug_content(&format!("reply: {text}"));

        let worth_showing = text.chars().count() > MIN_ALERT_CHARS;
        outcome.stage = if worth_showing && !makeup_changed && !event.suppress_alert {
            let ui = &self.collaborators.ui;
            call_with_policy(
                Collaborator::UiAlert,
                self.policies.policy(Collaborator::UiAlert),
                || ui.show_alert(&text),
            );
            DispatchStage::Displayed
        } else {
            DispatchStage::Suppressed
        };
        outcome.reply = Some(text);
        outcome
    }

    /// Drop the oldest user turns (and their tool and assistant messages)
    /// until the transcript fits. The system prompt always stays first, and
    /// the newest turn is kept whole even if it alone exceeds the cap.
    fn trim_transcript(&mut self) {
        while self.transcript.len() > MAX_TRANSCRIPT_MESSAGES {
            let next_turn = self
                .transcript
                .iter()
                .skip(2)
                .position(|message| message.role == Role::User)
                .map(|offset| offset + 2);
            let Some(end) = next_turn else {
                break;
            };
            let dropped = self.transcript.drain(1..end).count();
            debug!(dropped, kept = self.transcript.len(), "transcript trimmed");
        }
    }

    /// Run one tool and return the status string fed back to the interpreter.
    fn execute_tool(&mut self, call: &ToolCall, compositor: &mut MaskCompositor) -> String {
        match call {
            ToolCall::ControlHardware {
                setting: HardwareSetting::Mode(mode),
                ..
            } => {
                if self.apply_mode(*mode) {
                    mode.status().to_string()
                } else {
                    "UI Control Error: mirror UI unreachable".to_string()
                }
            }
            ToolCall::ControlHardware {
                setting: HardwareSetting::Brightness,
                value,
            } => match value {
                Some(level) => set_brightness(*level),
                None => "Brightness Error: no level given".to_string(),
            },
            ToolCall::SearchWeb { query } => self.search(query),
            ToolCall::PlayMedia { query } => {
                let media = &self.collaborators.media;
                match call_with_policy(
                    Collaborator::Media,
                    self.policies.policy(Collaborator::Media),
                    || media.play(query),
                ) {
                    Some(()) => format!("Opened YouTube Music for: {query}"),
                    None => format!("Could not open YouTube Music for: {query}"),
                }
            }
            ToolCall::ControlMakeup { color } => {
                let status = compositor.set_color(color);
                info!(%status, "makeup changed by voice");
                status.to_string()
            }
            ToolCall::Unknown { name } => {
                warn!(tool = %name, "ignoring unknown tool");
                format!("Unknown tool {name}.")
            }
        }
    }

    fn search(&self, query: &str) -> String {
        let search = &self.collaborators.search;
        if !search.enabled() {
            return SEARCH_DISABLED.to_string();
        }
        call_with_policy(
            Collaborator::Search,
            self.policies.policy(Collaborator::Search),
            || {
                let hits = search.search(query)?;
                anyhow::ensure!(!hits.is_empty(), "no results for {query:?}");
                Ok(hits)
            },
        )
        .map(|hits| format_hits(&hits))
        .unwrap_or_else(|| SEARCH_NO_RESULTS.to_string())
    }
}

/// Strip an `alert('...')` wrapper some models put around their reply.
pub fn unwrap_alert(reply: &str) -> &str {
    static ALERT_RE: OnceLock<Regex> = OnceLock::new();
    let re = ALERT_RE.get_or_init(|| {
        Regex::new(r#"(?s)alert\s*\(\s*['"](.*?)['"]\s*\)"#).expect("alert regex should compile")
    });
    re.captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str())
        .unwrap_or(reply)
}
