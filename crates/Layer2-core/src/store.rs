//! Message / ToolCall Store
//!
//! 순서가 보장되는 append-only 메시지 로그와 파생된 도구 호출 기록.
//! 논리 시계는 단조 증가하며, id는 세션 내에서 유일합니다.

use keel_foundation::{Error, Result};
use std::collections::HashSet;

use crate::message::{IncomingMessage, Message, MessageRole, ToolCallRecord};

/// Prefix for generated message ids
pub const MESSAGE_ID_PREFIX: &str = "msg";
/// Prefix for generated tool call ids
pub const TOOL_CALL_ID_PREFIX: &str = "call";

fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

// ============================================================================
// MessageStore
// ============================================================================

/// Append-only message and tool call log
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    tool_calls: Vec<ToolCallRecord>,
    /// Ids ever issued in this session (removed messages included)
    ids: HashSet<String>,
    /// Last assigned logical timestamp
    clock: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Validate and append a message.
    ///
    /// Nothing is mutated when an error is returned.
    pub fn append(&mut self, incoming: IncomingMessage) -> Result<Message> {
        let role = incoming.validate()?;

        let id = match incoming.id {
            Some(id) => {
                if self.ids.contains(&id) {
                    return Err(Error::invalid_message(format!(
                        "duplicate message id '{}'",
                        id
                    )));
                }
                id
            }
            None => self.fresh_id(MESSAGE_ID_PREFIX),
        };

        let timestamp = match incoming.timestamp {
            Some(ts) if ts < self.clock => {
                return Err(Error::invalid_message(format!(
                    "timestamp {} is earlier than the session clock {}",
                    ts, self.clock
                )));
            }
            Some(ts) => ts,
            None => self
                .clock
                .checked_add(1)
                .ok_or_else(|| Error::invalid_message("logical clock exhausted"))?,
        };

        // 도구 메시지만 기록을 만들고, 다른 역할은 참조 id만 유지
        let mut tool_call_id = incoming.tool_call.as_ref().and_then(|call| call.id.clone());
        let record = match (role, incoming.tool_call) {
            (MessageRole::Tool, Some(call)) => {
                let record_id = call
                    .id
                    .unwrap_or_else(|| generate_id(TOOL_CALL_ID_PREFIX));
                tool_call_id = Some(record_id.clone());
                Some(ToolCallRecord {
                    id: record_id,
                    message_id: id.clone(),
                    name: call.name,
                    arguments: call.arguments,
                    output: call.output,
                    is_error: call.is_error,
                    timestamp,
                })
            }
            _ => None,
        };

        let message = Message {
            id,
            role,
            content: incoming.content,
            timestamp,
            tool_call_id,
        };

        self.clock = timestamp;
        self.ids.insert(message.id.clone());
        if let Some(record) = record {
            self.tool_calls.push(record);
        }
        self.messages.push(message.clone());

        Ok(message)
    }

    /// Keep only messages for which `keep` returns true, preserving order.
    ///
    /// Returns the number of removed messages. Tool call records are untouched.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(usize, &Message) -> bool,
    {
        let before = self.messages.len();
        let mut index = 0;
        self.messages.retain(|msg| {
            let kept = keep(index, msg);
            index += 1;
            kept
        });
        before - self.messages.len()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        loop {
            let id = generate_id(prefix);
            if !self.ids.contains(&id) {
                return id;
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Last `n` messages in original order
    pub fn recent_messages(&self, n: usize) -> Vec<Message> {
        tail(&self.messages, n).to_vec()
    }

    /// Last `n` tool call records in original order
    pub fn recent_tool_calls(&self, n: usize) -> Vec<ToolCallRecord> {
        tail(&self.tool_calls, n).to_vec()
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCallPayload;
    use serde_json::json;

    #[test]
    fn test_append_assigns_id_and_clock() {
        let mut store = MessageStore::new();
        let first = store.append(IncomingMessage::user("hello")).unwrap();
        let second = store.append(IncomingMessage::assistant("hi")).unwrap();

        assert!(first.id.starts_with("msg-"));
        assert_ne!(first.id, second.id);
        assert_eq!(first.timestamp, 1);
        assert_eq!(second.timestamp, 2);
        assert_eq!(store.clock(), 2);
    }

    #[test]
    fn test_caller_timestamp_may_repeat_but_not_regress() {
        let mut store = MessageStore::new();
        store
            .append(IncomingMessage::user("a").with_timestamp(10))
            .unwrap();
        let same = store
            .append(IncomingMessage::user("b").with_timestamp(10))
            .unwrap();
        assert_eq!(same.timestamp, 10);

        let next = store.append(IncomingMessage::user("c")).unwrap();
        assert_eq!(next.timestamp, 11);

        let err = store
            .append(IncomingMessage::user("d").with_timestamp(3))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
        assert_eq!(store.len(), 3);
        assert_eq!(store.clock(), 11);
    }

    #[test]
    fn test_exhausted_clock_rejects_without_mutation() {
        let mut store = MessageStore::new();
        store
            .append(IncomingMessage::user("first").with_timestamp(u64::MAX))
            .unwrap();

        let err = store.append(IncomingMessage::user("second")).unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.clock(), u64::MAX);

        // 명시적 타임스탬프는 여전히 허용
        let same = store
            .append(IncomingMessage::user("third").with_timestamp(u64::MAX))
            .unwrap();
        assert_eq!(same.timestamp, u64::MAX);
    }

    #[test]
    fn test_duplicate_id_rejected_without_mutation() {
        let mut store = MessageStore::new();
        store
            .append(IncomingMessage::user("one").with_id("m1"))
            .unwrap();

        let err = store
            .append(IncomingMessage::user("two").with_id("m1"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_removed_id_is_not_reissued() {
        let mut store = MessageStore::new();
        store
            .append(IncomingMessage::user("one").with_id("m1"))
            .unwrap();
        store.retain(|_, _| false);

        assert!(store
            .append(IncomingMessage::user("again").with_id("m1"))
            .is_err());
    }

    #[test]
    fn test_tool_message_creates_record() {
        let mut store = MessageStore::new();
        let call = ToolCallPayload::new("write", json!({"path": "src/lib.rs"})).with_id("call_1");
        let msg = store.append(IncomingMessage::tool("written", call)).unwrap();

        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(store.tool_calls().len(), 1);

        let record = &store.tool_calls()[0];
        assert_eq!(record.message_id, msg.id);
        assert_eq!(record.name, "write");
        assert_eq!(record.timestamp, msg.timestamp);
    }

    #[test]
    fn test_assistant_tool_call_keeps_reference_only() {
        let mut store = MessageStore::new();
        let call = ToolCallPayload::new("bash", json!({})).with_id("call_9");
        let msg = store
            .append(IncomingMessage::assistant("running").with_tool_call(call))
            .unwrap();

        assert_eq!(msg.tool_call_id.as_deref(), Some("call_9"));
        assert!(store.tool_calls().is_empty());
    }

    #[test]
    fn test_recent_messages_bounds() {
        let mut store = MessageStore::new();
        for i in 0..5 {
            store
                .append(IncomingMessage::user(format!("m{}", i)))
                .unwrap();
        }

        assert!(store.recent_messages(0).is_empty());
        let last_two: Vec<_> = store
            .recent_messages(2)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(last_two, vec!["m3", "m4"]);
        assert_eq!(store.recent_messages(50).len(), 5);
    }

    #[test]
    fn test_retain_preserves_order() {
        let mut store = MessageStore::new();
        for i in 0..6 {
            store
                .append(IncomingMessage::user(format!("m{}", i)))
                .unwrap();
        }

        let removed = store.retain(|idx, _| idx % 2 == 0);
        assert_eq!(removed, 3);
        let contents: Vec<_> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m2", "m4"]);
    }
}
