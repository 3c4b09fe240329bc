//! Config - 통합 설정 관리
//!
//! - `thresholds.rs` - 토큰 워터마크와 임계 수준
//! - `compaction.rs` - 압축 전략별 유지 윈도우
//! - `context.rs` - ContextConfig 통합 설정 및 로드

mod compaction;
mod context;
mod thresholds;

pub use compaction::{CompactionStrategy, CompactionWindows};
pub use context::{ContextConfig, SummaryConfig, CONTEXT_CONFIG_FILE};
pub use thresholds::{ContextThresholds, ThresholdFlags, ThresholdLevel};
