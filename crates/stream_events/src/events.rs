use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{null_as_default, string_or_blocks, ContentBlock, Usage};
use crate::error::ParseError;

/// One decoded line of the stream.
#[derive(Debug)]
pub enum Event {
    System(SystemEvent),
    Assistant(AssistantEvent),
    User(UserEvent),
    Stream(StreamEvent),
    Result(ResultEvent),
    ParseError(ParseError),
}

impl Event {
    /// The `type` discriminator this event was decoded from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::Assistant(_) => "assistant",
            Self::User(_) => "user",
            Self::Stream(_) => "stream_event",
            Self::Result(_) => "result",
            Self::ParseError(_) => "parse_error",
        }
    }

    /// Id of the sub-agent tool invocation this event belongs to, if any.
    pub fn parent_tool_use_id(&self) -> Option<&str> {
        let parent = match self {
            Self::System(event) => event.parent_tool_use_id.as_deref(),
            Self::Assistant(event) => event.parent_tool_use_id.as_deref(),
            Self::User(event) => event.parent_tool_use_id.as_deref(),
            Self::Stream(event) => event.parent_tool_use_id.as_deref(),
            Self::Result(event) => event.parent_tool_use_id.as_deref(),
            Self::ParseError(_) => None,
        };
        parent.filter(|id| !id.is_empty())
    }

    pub fn session_id(&self) -> Option<&str> {
        let session_id = match self {
            Self::System(event) => &event.session_id,
            Self::Assistant(event) => &event.session_id,
            Self::User(event) => &event.session_id,
            Self::Stream(event) => &event.session_id,
            Self::Result(event) => &event.session_id,
            Self::ParseError(_) => return None,
        };
        (!session_id.is_empty()).then_some(session_id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtype: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cwd: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(
        rename = "permissionMode",
        default,
        deserialize_with = "null_as_default"
    )]
    pub permission_mode: String,
    #[serde(
        rename = "claude_code_version",
        default,
        deserialize_with = "null_as_default"
    )]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mcp_servers: Vec<McpServer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slash_commands: Vec<String>,
    #[serde(rename = "apiKeySource", default, deserialize_with = "null_as_default")]
    pub api_key_source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_style: String,
}

impl SystemEvent {
    pub fn is_init(&self) -> bool {
        self.subtype == "init"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantEvent {
    pub message: AssistantMessage,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    /// Set when the turn failed upstream (auth, rate limit, ...).
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub message: UserMessage,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    /// Structured tool output side channel (stdout/stderr, file contents, ...).
    #[serde(default)]
    pub tool_use_result: Option<Value>,
}

impl UserEvent {
    /// A user event carrying text under a parent tool is the prompt handed to a sub-agent.
    pub fn is_subagent_prompt(&self) -> bool {
        self.parent_tool_use_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
            && self.message.content.iter().any(ContentBlock::is_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "string_or_blocks")]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event: StreamDelta,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
}

/// Incremental API event wrapped by a `stream_event` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamDelta {
    MessageStart {},
    ContentBlockStart {
        #[serde(default)]
        index: usize,
        content_block: StreamBlock,
    },
    ContentBlockDelta {
        #[serde(default)]
        index: usize,
        delta: BlockDelta,
    },
    ContentBlockStop {
        #[serde(default)]
        index: usize,
    },
    MessageDelta {
        #[serde(default)]
        delta: Option<MessageDeltaInfo>,
        #[serde(default)]
        usage: Option<Usage>,
    },
    MessageStop {},
    #[serde(other)]
    Other,
}

/// Header of a content block as announced by `content_block_start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDelta {
    TextDelta {
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
    },
    InputJsonDelta {
        #[serde(default, deserialize_with = "null_as_default")]
        partial_json: String,
    },
    ThinkingDelta {
        #[serde(default, deserialize_with = "null_as_default")]
        thinking: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeltaInfo {
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtype: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_error: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_turns: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cost_usd: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_ms: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_api_ms: u64,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// Final assistant text for successful runs.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permission_denials: Vec<PermissionDenial>,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
}

impl ResultEvent {
    pub fn is_success(&self) -> bool {
        !self.is_error && (self.subtype.is_empty() || self.subtype == "success")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDenial {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_use_id: String,
}
