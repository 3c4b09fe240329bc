//! Conversation Context - 외부로 내보내는 스냅샷
//!
//! `ConversationContext`는 에이전트 루프가 다음 프롬프트를 만들 때 쓰는
//! 독립 소유 복사본이고, `ObservabilityContext`는 텔레메트리용 요약입니다.

use chrono::{DateTime, Utc};
use keel_foundation::ThresholdFlags;
use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageRole, ToolCallRecord};
use crate::summary::ConversationSummary;

// ============================================================================
// Conversation Context
// ============================================================================

/// Independently owned copy of session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub running_cost: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ConversationSummary>,
}

impl ConversationContext {
    /// Context with no messages
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
            tool_calls: Vec::new(),
            running_cost: 0,
            summary: None,
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// First user message
    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == MessageRole::User)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn messages_by_role(&self, role: MessageRole) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.role == role)
    }
}

// ============================================================================
// Observability Context
// ============================================================================

/// Structured telemetry record for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityContext {
    pub session_id: String,
    pub message_count: usize,
    pub token_count: usize,
    /// One flag per watermark at or below `token_count`
    pub thresholds: ThresholdFlags,
}

impl ObservabilityContext {
    /// Tracing span carrying the telemetry fields
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "context",
            session_id = %self.session_id,
            message_count = self.message_count,
            token_count = self.token_count,
            compaction = self.thresholds.compaction,
            summarization = self.thresholds.summarization,
            rot = self.thresholds.rot,
            hard = self.thresholds.hard,
        )
    }
}
