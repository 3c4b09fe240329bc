//! Built-in observers

use keel_foundation::{CompactionStrategy, Result, ThresholdLevel};
use parking_lot::Mutex;
use serde::Serialize;

use super::types::{ContextObserver, HookEventType};
use crate::message::Message;
use crate::summary::ConversationSummary;

// ============================================================================
// LoggingObserver
// ============================================================================

/// Logs every lifecycle event through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver;

impl ContextObserver for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_message_added(&self, message: &Message) -> Result<()> {
        tracing::debug!(id = %message.id, role = %message.role, timestamp = message.timestamp, "Message added");
        Ok(())
    }

    fn before_compaction(&self, strategy: CompactionStrategy, message_count: usize) -> Result<()> {
        tracing::info!(strategy = %strategy, message_count, "Compaction starting");
        Ok(())
    }

    fn after_compaction(&self, strategy: CompactionStrategy, removed: usize) -> Result<()> {
        tracing::info!(strategy = %strategy, removed, "Compaction finished");
        Ok(())
    }

    fn on_summarization_complete(&self, summary: &ConversationSummary) -> Result<()> {
        tracing::info!(
            modified_files = summary.modified_files.len(),
            key_decisions = summary.key_decisions.len(),
            unresolved_issues = summary.unresolved_issues.len(),
            next_steps = summary.next_steps.len(),
            "Summary updated"
        );
        Ok(())
    }

    fn on_threshold_crossed(&self, level: ThresholdLevel, cost: usize) -> Result<()> {
        tracing::info!(level = %level, cost, "Threshold event");
        Ok(())
    }
}

// ============================================================================
// EventRecorder
// ============================================================================

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    pub event: HookEventType,
    pub detail: String,
}

/// Keeps an in-memory log of every event
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<RecordedEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Events of one kind
    pub fn of_type(&self, event: HookEventType) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event == event)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: HookEventType, detail: String) -> Result<()> {
        self.events.lock().push(RecordedEvent { event, detail });
        Ok(())
    }
}

impl ContextObserver for EventRecorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_message_added(&self, message: &Message) -> Result<()> {
        self.record(HookEventType::MessageAdded, message.id.clone())
    }

    fn before_compaction(&self, strategy: CompactionStrategy, message_count: usize) -> Result<()> {
        self.record(
            HookEventType::BeforeCompaction,
            format!("{} {}", strategy, message_count),
        )
    }

    fn after_compaction(&self, strategy: CompactionStrategy, removed: usize) -> Result<()> {
        self.record(
            HookEventType::AfterCompaction,
            format!("{} {}", strategy, removed),
        )
    }

    fn on_summarization_complete(&self, summary: &ConversationSummary) -> Result<()> {
        self.record(
            HookEventType::SummarizationComplete,
            summary.user_goal.clone(),
        )
    }

    fn on_threshold_crossed(&self, level: ThresholdLevel, cost: usize) -> Result<()> {
        self.record(HookEventType::ThresholdCrossed, format!("{} {}", level, cost))
    }
}
