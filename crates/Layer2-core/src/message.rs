//! Message types
//!
//! `IncomingMessage` is what the agent loop hands over; `Message` is what the
//! store keeps after id/timestamp back-fill. Tool messages carrying tool-call
//! data also produce a `ToolCallRecord`.

use keel_foundation::{
    Error, Result, Tokenizer, ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_TOOL, ROLE_USER,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

// ============================================================================
// Role
// ============================================================================

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => ROLE_SYSTEM,
            Self::User => ROLE_USER,
            Self::Assistant => ROLE_ASSISTANT,
            Self::Tool => ROLE_TOOL,
        }
    }

    /// System messages survive every compaction
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            ROLE_SYSTEM => Ok(Self::System),
            ROLE_USER => Ok(Self::User),
            ROLE_ASSISTANT => Ok(Self::Assistant),
            ROLE_TOOL => Ok(Self::Tool),
            other => Err(Error::invalid_message(format!("unknown role '{}'", other))),
        }
    }
}

// ============================================================================
// Tool Call
// ============================================================================

/// Tool-call data attached to an incoming message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallPayload {
    /// Call id from the model provider, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tool name
    pub name: String,

    /// Arguments (JSON)
    #[serde(default)]
    pub arguments: Value,

    /// Tool output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Whether the tool reported a failure
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallPayload {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
            output: None,
            is_error: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn failed(mut self) -> Self {
        self.is_error = true;
        self
    }
}

/// Derived, append-only record of a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    /// Record id (provider call id, or generated)
    pub id: String,
    /// Id of the originating tool message
    pub message_id: String,
    pub name: String,
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub is_error: bool,
    /// Logical timestamp of the originating message
    pub timestamp: u64,
}

// ============================================================================
// Incoming Message
// ============================================================================

/// A message as supplied by the agent loop
///
/// `id` and `timestamp` are optional; the store fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub role: String,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallPayload>,
}

impl IncomingMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: role.into(),
            content: content.into(),
            timestamp: None,
            tool_call: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ROLE_USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ROLE_ASSISTANT, content)
    }

    pub fn tool(content: impl Into<String>, call: ToolCallPayload) -> Self {
        Self::new(ROLE_TOOL, content).with_tool_call(call)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_tool_call(mut self, call: ToolCallPayload) -> Self {
        self.tool_call = Some(call);
        self
    }

    /// Checks everything that can be checked without store state.
    pub fn validate(&self) -> Result<MessageRole> {
        let role: MessageRole = self.role.parse()?;

        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err(Error::invalid_message("message id must not be blank"));
            }
        }

        if let Some(call) = &self.tool_call {
            if call.name.trim().is_empty() {
                return Err(Error::invalid_message("tool call name is required"));
            }
        } else if self.content.trim().is_empty() {
            return Err(Error::invalid_message(format!(
                "{} message has no content",
                role
            )));
        }

        Ok(role)
    }
}

// ============================================================================
// Stored Message
// ============================================================================

/// A stored message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Logical timestamp (monotonically non-decreasing)
    pub timestamp: u64,
    /// Associated tool call id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn is_protected(&self) -> bool {
        self.role.is_protected()
    }

    /// Estimated cost of this message's content
    pub fn cost(&self, tokenizer: &dyn Tokenizer) -> usize {
        tokenizer.count(&self.content).total
    }
}

/// Sum of estimated costs, recomputed from scratch
pub fn total_cost(messages: &[Message], tokenizer: &dyn Tokenizer) -> usize {
    messages.iter().map(|m| m.cost(tokenizer)).sum()
}
