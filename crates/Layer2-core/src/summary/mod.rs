//! Summarization
//!
//! - `schema`: 요청 필드 플래그와 고정 형태의 요약 구조
//! - `engine`: 교체 가능한 `SummaryStrategy` 트레이트와 엔진
//! - `heuristic`: LLM 없이 로그에서 추출하는 기본 전략
//! - `prompt`: 외부 completion 백엔드를 쓰는 전략

mod engine;
mod heuristic;
mod prompt;
mod schema;

pub use engine::{SummarizationEngine, SummaryStrategy};
pub use heuristic::{HeuristicSummarizer, DEFAULT_PREVIEW_LENGTH};
pub use prompt::{PromptSummarizer, SummaryBackend, DEFAULT_MESSAGE_BUDGET};
pub use schema::{ConversationSummary, SummarySchema};
