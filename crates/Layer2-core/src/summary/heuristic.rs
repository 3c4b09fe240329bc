//! Heuristic summary strategy
//!
//! LLM 호출 없이 메시지 로그에서 필드를 추출합니다:
//! - 목표: 첫 번째 user 메시지
//! - 중단 지점: 마지막 메시지
//! - 결정/이슈/다음 단계: `Decision:`, `Issue:`, `Blocked:`, `Next:`, `TODO:` 마커 라인
//! - 수정 파일: write/edit 계열 도구 호출의 경로 인자
//! - 실패한 도구 호출은 미해결 이슈로 추가

use async_trait::async_trait;
use keel_foundation::strings::{is_file_mutating_tool, PATH_ARGUMENT_KEYS};
use keel_foundation::{preview, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::engine::SummaryStrategy;
use super::schema::{ConversationSummary, SummarySchema};
use crate::context::ConversationContext;
use crate::message::{MessageRole, ToolCallRecord};

/// Default preview length (chars)
pub const DEFAULT_PREVIEW_LENGTH: usize = 200;

const MARKER_REGEX: &str =
    r"(?im)^\s*(?:[-*]\s+)?(decision|decided|issue|blocked|blocker|next|todo)\s*:\s*(.+?)\s*$";

static MARKER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn marker_pattern() -> &'static Regex {
    MARKER_PATTERN.get_or_init(|| Regex::new(MARKER_REGEX).expect("marker pattern is a valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Decision,
    Issue,
    Next,
}

impl Marker {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "decision" | "decided" => Some(Self::Decision),
            "issue" | "blocked" | "blocker" => Some(Self::Issue),
            "next" | "todo" => Some(Self::Next),
            _ => None,
        }
    }
}

// ============================================================================
// HeuristicSummarizer
// ============================================================================

/// Deterministic extraction-based summarizer
#[derive(Debug, Clone)]
pub struct HeuristicSummarizer {
    preview_length: usize,
}

impl HeuristicSummarizer {
    pub fn new() -> Self {
        Self {
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }

    pub fn with_preview_length(mut self, chars: usize) -> Self {
        self.preview_length = chars;
        self
    }

    pub fn preview_length(&self) -> usize {
        self.preview_length
    }

    /// Extract a summary synchronously
    pub fn extract(&self, context: &ConversationContext, schema: &SummarySchema) -> ConversationSummary {
        let mut summary = ConversationSummary::default();

        if schema.user_goal {
            if let Some(first) = context.first_user_message() {
                summary.user_goal = preview(&first.content, self.preview_length);
            }
        }

        if schema.last_stop_point {
            if let Some(last) = context.last_message() {
                summary.last_stop_point = preview(&last.content, self.preview_length);
            }
        }

        if schema.modified_files {
            summary.modified_files = modified_files(&context.tool_calls);
        }

        if schema.key_decisions || schema.unresolved_issues || schema.next_steps {
            self.collect_markers(context, &mut summary, schema);
        }

        if schema.unresolved_issues {
            for call in context.tool_calls.iter().filter(|c| c.is_error) {
                let detail = call
                    .output
                    .as_deref()
                    .map(|out| preview(out, self.preview_length))
                    .unwrap_or_default();
                let issue = if detail.is_empty() {
                    format!("{} failed", call.name)
                } else {
                    format!("{} failed: {}", call.name, detail)
                };
                push_unique(&mut summary.unresolved_issues, issue);
            }
        }

        summary
    }

    fn collect_markers(
        &self,
        context: &ConversationContext,
        summary: &mut ConversationSummary,
        schema: &SummarySchema,
    ) {
        let pattern = marker_pattern();

        // system 지시문은 대화 내용이 아니므로 제외
        for message in context
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
        {
            for caps in pattern.captures_iter(&message.content) {
                let (Some(keyword), Some(text)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let item = preview(text.as_str(), self.preview_length);
                match Marker::from_keyword(keyword.as_str()) {
                    Some(Marker::Decision) if schema.key_decisions => {
                        push_unique(&mut summary.key_decisions, item)
                    }
                    Some(Marker::Issue) if schema.unresolved_issues => {
                        push_unique(&mut summary.unresolved_issues, item)
                    }
                    Some(Marker::Next) if schema.next_steps => {
                        push_unique(&mut summary.next_steps, item)
                    }
                    _ => {}
                }
            }
        }
    }
}

impl Default for HeuristicSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryStrategy for HeuristicSummarizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn generate(
        &self,
        context: &ConversationContext,
        schema: &SummarySchema,
    ) -> Result<ConversationSummary> {
        Ok(self.extract(context, schema))
    }
}

/// Paths touched by file-mutating tool calls, first occurrence order
fn modified_files(tool_calls: &[ToolCallRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    tool_calls
        .iter()
        .filter(|call| is_file_mutating_tool(&call.name))
        .filter_map(|call| {
            PATH_ARGUMENT_KEYS
                .iter()
                .find_map(|key| call.arguments.get(*key).and_then(|v| v.as_str()))
        })
        .filter(|path| !path.is_empty() && seen.insert(path.to_string()))
        .map(str::to_string)
        .collect()
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !item.is_empty() && !items.contains(&item) {
        items.push(item);
    }
}
