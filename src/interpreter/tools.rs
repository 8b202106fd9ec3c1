//! The tool vocabulary offered to the interpreter, and parsing of its calls.

use serde_json::{json, Value};
use tracing::debug;

use crate::collaborators::UiMode;
use crate::vision::compositor::{COLOR_OFF, PALETTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareSetting {
    Brightness,
    Mode(UiMode),
}

/// Every tool the dispatcher knows how to run. Anything else lands in
/// `Unknown` and is answered without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ControlHardware {
        setting: HardwareSetting,
        value: Option<i64>,
    },
    SearchWeb {
        query: String,
    },
    PlayMedia {
        query: String,
    },
    ControlMakeup {
        color: String,
    },
    Unknown {
        name: String,
    },
}

impl ToolCall {
    /// Build a call from the function name and its JSON arguments. Arguments
    /// may arrive as an object or as a JSON-encoded string.
    pub fn from_parts(name: &str, arguments: &Value) -> Self {
        let decoded;
        let args = match arguments {
            Value::String(raw) => {
                decoded = serde_json::from_str::<Value>(raw).unwrap_or(Value::Null);
                &decoded
            }
            other => other,
        };
        let parsed = match name {
            "control_hardware" => parse_hardware(args),
            "search_web" => string_arg(args, "query").map(|query| Self::SearchWeb { query }),
            "play_media" | "play_youtube_music" => {
                string_arg(args, "query").map(|query| Self::PlayMedia { query })
            }
            "control_makeup" => string_arg(args, "color").map(|color| Self::ControlMakeup { color }),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            debug!(tool = name, "unrecognized tool call");
            Self::Unknown {
                name: name.to_string(),
            }
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ControlHardware { .. } => "control_hardware",
            Self::SearchWeb { .. } => "search_web",
            Self::PlayMedia { .. } => "play_media",
            Self::ControlMakeup { .. } => "control_makeup",
            Self::Unknown { name } => name,
        }
    }
}

fn string_arg(args: &Value, key: &str) -> Option<String> {
    let value = args.get(key)?.as_str()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn int_arg(args: &Value, key: &str) -> Option<i64> {
    match args.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn parse_hardware(args: &Value) -> Option<ToolCall> {
    let setting = match string_arg(args, "setting")?.as_str() {
        "brightness" => HardwareSetting::Brightness,
        other => HardwareSetting::Mode(UiMode::from_intent(other)?),
    };
    Some(ToolCall::ControlHardware {
        setting,
        value: int_arg(args, "value"),
    })
}

/// Tool schemas in the function-calling format Ollama and OpenAI share.
pub fn tool_declarations() -> Value {
    let colors: Vec<&str> = PALETTE
        .iter()
        .map(|entry| entry.name)
        .chain(std::iter::once(COLOR_OFF))
        .collect();
    json!([
        {
            "type": "function",
            "function": {
                "name": "control_hardware",
                "description": "Control the smart mirror hardware (brightness, mode)",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "setting": {
                            "type": "string",
                            "enum": ["brightness", UiMode::Mirror.as_str(), UiMode::Dashboard.as_str()],
                            "description": "The setting to adjust"
                        },
                        "value": {
                            "type": "integer",
                            "description": "Value for brightness (0-100)"
                        }
                    },
                    "required": ["setting"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": "search_web",
                "description": "Search the internet for real-time information.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "The search query"}
                    },
                    "required": ["query"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": "play_media",
                "description": "Play music on YouTube Music.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Song or Artist name"}
                    },
                    "required": ["query"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": "control_makeup",
                "description": "Apply virtual lipstick colors.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "color": {
                            "type": "string",
                            "enum": colors,
                            "description": "The lipstick color to apply"
                        }
                    },
                    "required": ["color"]
                }
            }
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_switch() {
        let call = ToolCall::from_parts("control_hardware", &json!({"setting": "mirror_mode"}));
        assert_eq!(
            call,
            ToolCall::ControlHardware {
                setting: HardwareSetting::Mode(UiMode::Mirror),
                value: None
            }
        );
    }

    #[test]
    fn brightness_value_accepts_numbers_and_strings() {
        let from_number =
            ToolCall::from_parts("control_hardware", &json!({"setting": "brightness", "value": 70}));
        let from_string = ToolCall::from_parts(
            "control_hardware",
            &json!({"setting": "brightness", "value": "70%"}),
        );
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn string_encoded_arguments_are_decoded() {
        let call = ToolCall::from_parts("search_web", &json!("{\"query\": \"weather in Oslo\"}"));
        assert_eq!(
            call,
            ToolCall::SearchWeb {
                query: "weather in Oslo".into()
            }
        );
    }

    #[test]
    fn youtube_music_alias_is_accepted() {
        let call = ToolCall::from_parts("play_youtube_music", &json!({"query": "daft punk"}));
        assert_eq!(call.name(), "play_media");
    }

    #[test]
    fn unknown_or_malformed_calls_become_unknown() {
        assert_eq!(
            ToolCall::from_parts("launch_rocket", &json!({})),
            ToolCall::Unknown {
                name: "launch_rocket".into()
            }
        );
        assert!(matches!(
            ToolCall::from_parts("control_makeup", &json!({})),
            ToolCall::Unknown { .. }
        ));
        assert!(matches!(
            ToolCall::from_parts("control_hardware", &json!({"setting": "volume"})),
            ToolCall::Unknown { .. }
        ));
    }

    #[test]
    fn declarations_list_palette_colors() {
        let tools = tool_declarations();
        let names: Vec<&str> = tools
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|tool| tool["function"]["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec!["control_hardware", "search_web", "play_media", "control_makeup"]
        );
        let colors = &tools[3]["function"]["parameters"]["properties"]["color"]["enum"];
        assert_eq!(colors[0], "red");
        assert_eq!(colors[5], "off");
    }
}
