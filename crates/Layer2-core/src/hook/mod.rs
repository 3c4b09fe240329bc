//! # Hook System
//!
//! Context Manager 수명주기 이벤트를 등록된 관찰자에게 알립니다.
//!
//! ## 이벤트 타입
//!
//! - `message_added`: 메시지 추가 후
//! - `before_compaction` / `after_compaction`: 압축 전후 (제거 수 포함)
//! - `summarization_complete`: 요약 교체 후
//! - `threshold_crossed`: 변경 후 가장 높은 워터마크
//!
//! Hook은 알림 전용입니다. 관찰자가 없어도 모든 상태 전이는 수행됩니다.

mod builtin;
mod dispatcher;
mod types;

pub use builtin::{EventRecorder, LoggingObserver, RecordedEvent};
pub use dispatcher::HookDispatcher;
pub use types::{ContextObserver, HookEvent, HookEventType};
