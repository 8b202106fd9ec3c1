//! Natural-language command interpretation. The dispatcher talks to a
//! [`CommandInterpreter`]; the built-in one is a local Ollama server.

mod ollama;
mod tools;

pub use ollama::OllamaInterpreter;
pub use tools::{tool_declarations, HardwareSetting, ToolCall};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Persona prompt that opens every conversation transcript.
pub const SYSTEM_PROMPT: &str = "You are Narcissus, a smart mirror. \
Output ONLY the text you want to display/speak. \
Do NOT use code. Use tools provided. \
If the user says they switched modes, just acknowledge it. \
Do NOT call control_hardware to switch modes unless the user explicitly ASKS you to switch it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// One interpreter turn: reply text (may be empty) and requested tool calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpreterReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl InterpreterReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

pub trait CommandInterpreter: Send {
    /// Send the whole transcript. With `offer_tools` the tool declarations are
    /// attached and the reply may carry tool calls.
    fn chat(&self, messages: &[ChatMessage], offer_tools: bool) -> Result<InterpreterReply>;
}
