use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{tool_declarations, ChatMessage, CommandInterpreter, InterpreterReply, ToolCall};
use crate::config::MirrorConfig;
use crate::log_debug_content;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<ResponseToolCall>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Non-streaming client for Ollama's `/api/chat`.
pub struct OllamaInterpreter {
    endpoint: String,
    model: String,
    agent: ureq::Agent,
}

impl OllamaInterpreter {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(
            &config.ollama_url,
            &config.model,
            Duration::from_millis(config.interpreter_timeout_ms),
        )
    }
}

impl CommandInterpreter for OllamaInterpreter {
    fn chat(&self, messages: &[ChatMessage], offer_tools: bool) -> Result<InterpreterReply> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            tools: offer_tools.then(tool_declarations),
        };
        let response: ChatResponse = self
            .agent
            .post(&self.endpoint)
            .send_json(&request)
            .with_context(|| format!("interpreter request to {} failed", self.endpoint))?
            .into_json()
            .context("invalid interpreter response")?;

        let message = response.message;
        log_debug_content(&format!("interpreter reply: {}", message.content));
        Ok(InterpreterReply {
            content: message.content,
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| ToolCall::from_parts(&call.function.name, &call.function.arguments))
                .collect(),
        })
    }
}
