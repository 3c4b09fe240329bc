//! keel-core: Session Context Manager
//!
//! Layer2 - 에이전트 세션의 대화 상태를 비용 예산 안에서 유지하는 레이어
//!
//! # 주요 모듈
//!
//! - `message`: 메시지 / 도구 호출 타입
//! - `store`: append-only 메시지 로그 (id, 논리 시계)
//! - `monitor`: 네 단계 워터마크 평가
//! - `compaction`: 보호 메시지 + 최근 윈도우 유지 압축
//! - `summary`: 스키마 기반 구조화 요약 (교체 가능한 전략)
//! - `hook`: 수명주기 관찰자
//! - `manager`: 위 구성요소를 조합한 `ContextManager`
//!
//! # 사용 예시
//!
//! ```ignore
//! use keel_core::{ContextManager, IncomingMessage, SummarySchema};
//! use keel_foundation::{CompactionStrategy, ContextConfig};
//!
//! let manager = ContextManager::from_config(&ContextConfig::load()?)?;
//! manager.register_observer(LoggingObserver);
//!
//! let stored = manager.append(IncomingMessage::user("Add retry logic"))?;
//! if !stored.is_clean() {
//!     // observer failures, state already updated
//! }
//!
//! manager.compact(CompactionStrategy::Balanced);
//! let summary = manager.summarize(&SummarySchema::all()).await?;
//! let ctx = manager.get_context();
//! ```

pub mod compaction;
pub mod context;
pub mod hook;
pub mod manager;
pub mod message;
pub mod monitor;
pub mod outcome;
pub mod store;
pub mod summary;

// Re-exports: Manager
pub use manager::{ContextManagement, ContextManager, ContextManagerBuilder, MaintenanceReport};

// Re-exports: Messages
pub use message::{IncomingMessage, Message, MessageRole, ToolCallPayload, ToolCallRecord};
pub use store::MessageStore;

// Re-exports: Context snapshots
pub use context::{ConversationContext, ObservabilityContext};
pub use outcome::Outcome;

// Re-exports: Engines
pub use compaction::{CompactionEngine, CompactionReport, CompactionStats};
pub use monitor::ThresholdMonitor;
pub use summary::{
    ConversationSummary, HeuristicSummarizer, PromptSummarizer, SummarizationEngine,
    SummaryBackend, SummarySchema, SummaryStrategy,
};

// Re-exports: Hooks
pub use hook::{
    ContextObserver, EventRecorder, HookDispatcher, HookEvent, HookEventType, LoggingObserver,
    RecordedEvent,
};
