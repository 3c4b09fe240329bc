//! Error types for Keel
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Keel 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 메시지 관련
    // ========================================================================
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    // ========================================================================
    // 요약 관련
    // ========================================================================
    #[error("Summarization failed ({strategy}): {source}")]
    SummarizationFailed {
        strategy: String,
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // Observer 관련
    // ========================================================================
    #[error("Observer '{observer}' failed on {event}: {source}")]
    ObserverFailure {
        observer: String,
        event: String,
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// InvalidMessage 생성 헬퍼
    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Error::InvalidMessage(reason.into())
    }

    /// SummarizationFailed 생성 헬퍼
    pub fn summarization_failed(strategy: impl Into<String>, source: Error) -> Self {
        Error::SummarizationFailed {
            strategy: strategy.into(),
            source: Box::new(source),
        }
    }

    /// ObserverFailure 생성 헬퍼
    pub fn observer_failure(
        observer: impl Into<String>,
        event: impl Into<String>,
        source: Error,
    ) -> Self {
        Error::ObserverFailure {
            observer: observer.into(),
            event: event.into(),
            source: Box::new(source),
        }
    }

    /// Observer 실패인지 확인
    pub fn is_observer_failure(&self) -> bool {
        matches!(self, Error::ObserverFailure { .. })
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidMessage(_) | Error::SummarizationFailed { .. } | Error::Config(_)
        )
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
