//! # keel-foundation
//!
//! Foundation layer for Keel:
//! - Error: 에러 분류 (InvalidMessage, SummarizationFailed, ObserverFailure)
//! - Tokenizer: 교체 가능한 토큰 비용 추정기
//! - Config: 임계값, 압축 윈도우, 요약 설정 (JSON/TOML 로드)
//! - Storage: JSON 설정 파일 로더
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  keel-core (Context Manager)                            │
//! │    store → monitor → compaction / summarization         │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  keel-foundation                                        │
//! │    Tokenizer      ContextConfig      Error              │
//! │    (estimate)     (thresholds)       (taxonomy)         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod storage;
pub mod strings;
pub mod tokenizer;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    // Compaction
    CompactionStrategy,
    CompactionWindows,
    // Context (통합 설정)
    ContextConfig,
    // Thresholds
    ContextThresholds,
    SummaryConfig,
    ThresholdFlags,
    ThresholdLevel,
    CONTEXT_CONFIG_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Tokenizer (토큰 추정)
// ============================================================================
pub use tokenizer::{
    // Estimators
    CharEstimator,
    FnTokenizer,
    LanguageAwareEstimator,
    // Types
    TokenCount,
    TokenDistribution,
    // Trait
    Tokenizer,
    // Factory
    TokenizerFactory,
    TokenizerType,
};

// ============================================================================
// Strings
// ============================================================================
pub use strings::{preview, ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_TOOL, ROLE_USER};
