//! Threshold Configuration - 토큰 워터마크 설정
//!
//! 네 개의 워터마크(compaction < summarization < rot < hard)와
//! 최근 tool call 보존 개수를 정의합니다.

use serde::{Deserialize, Serialize};

/// 임계 수준
///
/// `None < Compaction < Summarization < Rot < Hard` 순서로 심각해집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdLevel {
    None,
    Compaction,
    Summarization,
    Rot,
    Hard,
}

impl Default for ThresholdLevel {
    fn default() -> Self {
        Self::None
    }
}

impl ThresholdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Compaction => "compaction",
            Self::Summarization => "summarization",
            Self::Rot => "rot",
            Self::Hard => "hard",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for ThresholdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 워터마크별 초과 여부
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdFlags {
    pub compaction: bool,
    pub summarization: bool,
    pub rot: bool,
    pub hard: bool,
}

/// 컨텍스트 임계값 설정
///
/// 값은 호출자가 제공하며 순서를 강제하지 않습니다 (관례상 증가).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextThresholds {
    /// 압축 워터마크 (토큰)
    #[serde(default = "default_compaction")]
    pub compaction: usize,

    /// 요약 워터마크 (토큰)
    #[serde(default = "default_summarization")]
    pub summarization: usize,

    /// 컨텍스트 품질 저하(rot) 워터마크 (토큰)
    #[serde(default = "default_rot")]
    pub rot: usize,

    /// 하드 리밋 (토큰)
    #[serde(default = "default_hard")]
    pub hard: usize,

    /// `recent_tool_calls` 기본 개수
    #[serde(default = "default_preserve_recent_tool_calls")]
    pub preserve_recent_tool_calls: usize,
}

fn default_compaction() -> usize {
    64_000
}

fn default_summarization() -> usize {
    96_000
}

fn default_rot() -> usize {
    128_000
}

fn default_hard() -> usize {
    160_000
}

fn default_preserve_recent_tool_calls() -> usize {
    10
}

impl Default for ContextThresholds {
    fn default() -> Self {
        Self {
            compaction: default_compaction(),
            summarization: default_summarization(),
            rot: default_rot(),
            hard: default_hard(),
            preserve_recent_tool_calls: default_preserve_recent_tool_calls(),
        }
    }
}

impl ContextThresholds {
    /// 네 워터마크를 한 번에 지정
    pub fn new(compaction: usize, summarization: usize, rot: usize, hard: usize) -> Self {
        Self {
            compaction,
            summarization,
            rot,
            hard,
            preserve_recent_tool_calls: default_preserve_recent_tool_calls(),
        }
    }

    /// 최대 컨텍스트 크기 비율로 생성 (50% / 75% / 90% / 100%)
    pub fn for_context_window(context_window: usize) -> Self {
        Self::new(
            context_window / 2,
            context_window * 3 / 4,
            context_window * 9 / 10,
            context_window,
        )
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    pub fn with_compaction(mut self, tokens: usize) -> Self {
        self.compaction = tokens;
        self
    }

    pub fn with_summarization(mut self, tokens: usize) -> Self {
        self.summarization = tokens;
        self
    }

    pub fn with_rot(mut self, tokens: usize) -> Self {
        self.rot = tokens;
        self
    }

    pub fn with_hard_limit(mut self, tokens: usize) -> Self {
        self.hard = tokens;
        self
    }

    pub fn with_preserve_recent_tool_calls(mut self, count: usize) -> Self {
        self.preserve_recent_tool_calls = count;
        self
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// 비용 이하인 가장 높은 워터마크
    pub fn level_for(&self, cost: usize) -> ThresholdLevel {
        if cost >= self.hard {
            ThresholdLevel::Hard
        } else if cost >= self.rot {
            ThresholdLevel::Rot
        } else if cost >= self.summarization {
            ThresholdLevel::Summarization
        } else if cost >= self.compaction {
            ThresholdLevel::Compaction
        } else {
            ThresholdLevel::None
        }
    }

    /// 워터마크별 초과 여부
    pub fn crossed(&self, cost: usize) -> ThresholdFlags {
        ThresholdFlags {
            compaction: cost >= self.compaction,
            summarization: cost >= self.summarization,
            rot: cost >= self.rot,
            hard: cost >= self.hard,
        }
    }

    /// 관례적인 증가 순서인지 확인
    pub fn is_ordered(&self) -> bool {
        self.compaction <= self.summarization
            && self.summarization <= self.rot
            && self.rot <= self.hard
    }
}
