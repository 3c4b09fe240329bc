//! Hook 타입 정의
//!
//! 관찰자는 동기식으로 호출되며, 모든 콜백은 기본 no-op 구현을 가집니다.

use keel_foundation::{CompactionStrategy, Result, ThresholdLevel};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::summary::ConversationSummary;

// ============================================================================
// HookEventType - 이벤트 타입
// ============================================================================

/// Lifecycle event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEventType {
    /// 메시지 추가 후
    MessageAdded,

    /// 압축 전
    BeforeCompaction,

    /// 압축 후 (제거 수 포함)
    AfterCompaction,

    /// 요약 완료
    SummarizationComplete,

    /// 임계값 초과
    ThresholdCrossed,
}

impl HookEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageAdded => "message_added",
            Self::BeforeCompaction => "before_compaction",
            Self::AfterCompaction => "after_compaction",
            Self::SummarizationComplete => "summarization_complete",
            Self::ThresholdCrossed => "threshold_crossed",
        }
    }
}

impl std::fmt::Display for HookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// HookEvent - 이벤트 데이터
// ============================================================================

/// Event payload handed to observers
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    MessageAdded(&'a Message),
    BeforeCompaction {
        strategy: CompactionStrategy,
        message_count: usize,
    },
    AfterCompaction {
        strategy: CompactionStrategy,
        removed: usize,
    },
    SummarizationComplete(&'a ConversationSummary),
    ThresholdCrossed {
        level: ThresholdLevel,
        cost: usize,
    },
}

impl HookEvent<'_> {
    pub fn event_type(&self) -> HookEventType {
        match self {
            Self::MessageAdded(_) => HookEventType::MessageAdded,
            Self::BeforeCompaction { .. } => HookEventType::BeforeCompaction,
            Self::AfterCompaction { .. } => HookEventType::AfterCompaction,
            Self::SummarizationComplete(_) => HookEventType::SummarizationComplete,
            Self::ThresholdCrossed { .. } => HookEventType::ThresholdCrossed,
        }
    }
}

// ============================================================================
// ContextObserver Trait
// ============================================================================

/// Lifecycle observer
///
/// 필요한 콜백만 오버라이드하면 됩니다. 에러를 반환해도 다른 관찰자와
/// 이미 적용된 상태 변경에는 영향이 없습니다.
pub trait ContextObserver: Send + Sync {
    /// Observer name (logging / failure reports)
    fn name(&self) -> &str {
        "unnamed-observer"
    }

    fn on_message_added(&self, _message: &Message) -> Result<()> {
        Ok(())
    }

    fn before_compaction(&self, _strategy: CompactionStrategy, _message_count: usize) -> Result<()> {
        Ok(())
    }

    fn after_compaction(&self, _strategy: CompactionStrategy, _removed: usize) -> Result<()> {
        Ok(())
    }

    fn on_summarization_complete(&self, _summary: &ConversationSummary) -> Result<()> {
        Ok(())
    }

    fn on_threshold_crossed(&self, _level: ThresholdLevel, _cost: usize) -> Result<()> {
        Ok(())
    }

    /// Route an event to the matching callback
    fn handle(&self, event: &HookEvent<'_>) -> Result<()> {
        match *event {
            HookEvent::MessageAdded(message) => self.on_message_added(message),
            HookEvent::BeforeCompaction {
                strategy,
                message_count,
            } => self.before_compaction(strategy, message_count),
            HookEvent::AfterCompaction { strategy, removed } => {
                self.after_compaction(strategy, removed)
            }
            HookEvent::SummarizationComplete(summary) => self.on_summarization_complete(summary),
            HookEvent::ThresholdCrossed { level, cost } => self.on_threshold_crossed(level, cost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_foundation::Error;

    struct OnlyThresholds;

    impl ContextObserver for OnlyThresholds {
        fn on_threshold_crossed(&self, level: ThresholdLevel, _cost: usize) -> Result<()> {
            Err(Error::Internal(format!("saw {}", level)))
        }
    }

    #[test]
    fn test_event_type_names() {
        let event = HookEvent::AfterCompaction {
            strategy: CompactionStrategy::Balanced,
            removed: 3,
        };
        assert_eq!(event.event_type(), HookEventType::AfterCompaction);
        assert_eq!(event.event_type().to_string(), "after_compaction");
    }

    #[test]
    fn test_default_callbacks_are_noop() {
        let observer = OnlyThresholds;
        assert_eq!(observer.name(), "unnamed-observer");

        let summary = ConversationSummary::default();
        assert!(observer
            .handle(&HookEvent::SummarizationComplete(&summary))
            .is_ok());
        assert!(observer
            .handle(&HookEvent::ThresholdCrossed {
                level: ThresholdLevel::Rot,
                cost: 10
            })
            .is_err());
    }
}
