//! Context Config - 통합 설정
//!
//! 세션 생성 시 Context Manager에 전달되는 설정 묶음

use crate::storage::JsonStore;
use crate::tokenizer::TokenizerType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::{CompactionWindows, ContextThresholds};

/// 설정 파일명
pub const CONTEXT_CONFIG_FILE: &str = "context.json";

// ============================================================================
// Context Config (통합)
// ============================================================================

/// Keel 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    /// 토큰 워터마크
    #[serde(default)]
    pub thresholds: ContextThresholds,

    /// 압축 전략별 윈도우
    #[serde(default)]
    pub compaction: CompactionWindows,

    /// 요약 설정
    #[serde(default)]
    pub summary: SummaryConfig,

    /// 토큰 추정기
    #[serde(default)]
    pub tokenizer: TokenizerType,
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::current_project().ok();
        Self::load_layered(global.as_ref(), project.as_ref())
    }

    /// 주어진 저장소들을 순서대로 병합 (뒤쪽이 우선)
    pub fn load_layered(global: Option<&JsonStore>, project: Option<&JsonStore>) -> Result<Self> {
        let mut merged = Value::Object(Default::default());

        for store in [global, project].into_iter().flatten() {
            if let Some(layer) = store.load_optional::<Value>(CONTEXT_CONFIG_FILE)? {
                tracing::debug!(path = %store.file_path(CONTEXT_CONFIG_FILE).display(), "Loaded context config layer");
                merge_json(&mut merged, layer);
            }
        }

        let config: Self = serde_json::from_value(merged)
            .map_err(|e| Error::Config(format!("Invalid context config: {}", e)))?;
        config.warn_if_unordered();
        Ok(config)
    }

    /// 명시적 파일 로드 (`.toml` 또는 `.json`)
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.warn_if_unordered();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.warn_if_unordered();
        Ok(config)
    }

    fn warn_if_unordered(&self) {
        if !self.thresholds.is_ordered() {
            tracing::warn!(
                compaction = self.thresholds.compaction,
                summarization = self.thresholds.summarization,
                rot = self.thresholds.rot,
                hard = self.thresholds.hard,
                "Context thresholds are not increasing"
            );
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_thresholds(mut self, thresholds: ContextThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_compaction_windows(mut self, windows: CompactionWindows) -> Self {
        self.compaction = windows;
        self
    }

    pub fn with_preview_length(mut self, chars: usize) -> Self {
        self.summary.preview_length = chars;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerType) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

// ============================================================================
// Summary Config
// ============================================================================

/// 요약 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryConfig {
    /// 미리보기 최대 길이 (문자)
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

fn default_preview_length() -> usize {
    200
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            preview_length: default_preview_length(),
        }
    }
}

/// 객체는 키 단위로 재귀 병합, 나머지는 overlay가 덮어씀
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
