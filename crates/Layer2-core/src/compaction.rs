//! Compaction Engine
//!
//! 보호 메시지(system)와 최근 윈도우만 남기고 나머지를 제거합니다.
//! 제거 후 비용은 남은 메시지 전체에 대해 다시 계산합니다.

use keel_foundation::{CompactionStrategy, CompactionWindows, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::message::total_cost;
use crate::store::MessageStore;

// ============================================================================
// Compaction Report
// ============================================================================

/// 압축 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionReport {
    pub strategy: CompactionStrategy,

    /// 제거된 메시지 수
    pub removed: usize,

    /// 압축 전 비용
    pub tokens_before: usize,

    /// 압축 후 비용 (전체 재계산)
    pub tokens_after: usize,
}

impl CompactionReport {
    pub fn tokens_saved(&self) -> usize {
        self.tokens_before.saturating_sub(self.tokens_after)
    }

    pub fn is_noop(&self) -> bool {
        self.removed == 0
    }
}

/// 누적 압축 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionStats {
    pub compaction_count: u64,
    pub total_messages_removed: u64,
    pub total_tokens_saved: u64,
}

// ============================================================================
// Compaction Engine
// ============================================================================

/// Window-based compactor
#[derive(Debug, Default)]
pub struct CompactionEngine {
    windows: CompactionWindows,

    compaction_count: AtomicU64,
    total_messages_removed: AtomicU64,
    total_tokens_saved: AtomicU64,
}

impl CompactionEngine {
    pub fn new(windows: CompactionWindows) -> Self {
        Self {
            windows,
            compaction_count: AtomicU64::new(0),
            total_messages_removed: AtomicU64::new(0),
            total_tokens_saved: AtomicU64::new(0),
        }
    }

    pub fn windows(&self) -> &CompactionWindows {
        &self.windows
    }

    /// Indices of the messages a strategy would keep, in original order
    pub fn plan(&self, store: &MessageStore, strategy: CompactionStrategy) -> Vec<usize> {
        let messages = store.messages();
        let window = self.windows.window_for(strategy);
        let window_start = messages.len().saturating_sub(window);

        // 보호 메시지가 윈도우 안에도 있으면 id 기준으로 한 번만 유지
        let mut seen = HashSet::new();
        messages
            .iter()
            .enumerate()
            .filter(|(idx, msg)| msg.is_protected() || *idx >= window_start)
            .filter(|(_, msg)| seen.insert(msg.id.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Apply a strategy to the store.
    ///
    /// `tokens_before` is the caller's running cost; `tokens_after` is always
    /// recomputed over the kept messages.
    pub fn compact(
        &self,
        store: &mut MessageStore,
        tokenizer: &dyn Tokenizer,
        strategy: CompactionStrategy,
        tokens_before: usize,
    ) -> CompactionReport {
        let keep: HashSet<usize> = self.plan(store, strategy).into_iter().collect();
        let removed = store.retain(|idx, _| keep.contains(&idx));
        let tokens_after = total_cost(store.messages(), tokenizer);

        let report = CompactionReport {
            strategy,
            removed,
            tokens_before,
            tokens_after,
        };

        if !report.is_noop() {
            self.compaction_count.fetch_add(1, Ordering::Relaxed);
            self.total_messages_removed
                .fetch_add(removed as u64, Ordering::Relaxed);
            self.total_tokens_saved
                .fetch_add(report.tokens_saved() as u64, Ordering::Relaxed);
        }

        tracing::info!(
            strategy = %strategy,
            removed,
            tokens_before,
            tokens_after,
            remaining = store.len(),
            "Context compacted"
        );

        report
    }

    pub fn stats(&self) -> CompactionStats {
        CompactionStats {
            compaction_count: self.compaction_count.load(Ordering::Relaxed),
            total_messages_removed: self.total_messages_removed.load(Ordering::Relaxed),
            total_tokens_saved: self.total_tokens_saved.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{IncomingMessage, MessageRole};
    use keel_foundation::CharEstimator;

    fn store_with(roles: &[&str]) -> MessageStore {
        let mut store = MessageStore::new();
        for (i, role) in roles.iter().enumerate() {
            store
                .append(IncomingMessage::new(*role, format!("message number {}", i)))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_aggressive_keeps_window() {
        let mut store = store_with(&["user"; 30]);
        let engine = CompactionEngine::default();
        let tokenizer = CharEstimator::new();
        let before = total_cost(store.messages(), &tokenizer);

        let report = engine.compact(&mut store, &tokenizer, CompactionStrategy::Aggressive, before);

        assert_eq!(report.removed, 25);
        assert_eq!(store.len(), 5);
        assert_eq!(store.messages()[0].content, "message number 25");
        assert_eq!(report.tokens_after, total_cost(store.messages(), &tokenizer));
        assert!(report.tokens_saved() > 0);
    }

    #[test]
    fn test_system_messages_survive_any_position() {
        let mut roles = vec!["user"; 20];
        roles[0] = "system";
        roles[7] = "system";
        roles[19] = "system";

        for strategy in [
            CompactionStrategy::Aggressive,
            CompactionStrategy::Balanced,
            CompactionStrategy::Conservative,
        ] {
            let mut store = store_with(&roles);
            let engine = CompactionEngine::new(CompactionWindows::new(2, 4, 8));
            engine.compact(&mut store, &CharEstimator::new(), strategy, 0);

            let systems = store
                .messages()
                .iter()
                .filter(|m| m.role == MessageRole::System)
                .count();
            assert_eq!(systems, 3, "strategy {}", strategy);
        }
    }

    #[test]
    fn test_protected_inside_window_kept_once() {
        let mut store = store_with(&["user", "user", "user", "system", "user"]);
        let engine = CompactionEngine::new(CompactionWindows::new(2, 2, 2));

        let plan = engine.plan(&store, CompactionStrategy::Aggressive);
        assert_eq!(plan, vec![3, 4]);

        let report = engine.compact(&mut store, &CharEstimator::new(), CompactionStrategy::Aggressive, 0);
        assert_eq!(report.removed, 3);
    }

    #[test]
    fn test_order_preserved() {
        let mut store = store_with(&["user", "system", "user", "user", "user", "user"]);
        let engine = CompactionEngine::new(CompactionWindows::new(2, 2, 2));
        engine.compact(&mut store, &CharEstimator::new(), CompactionStrategy::Balanced, 0);

        let stamps: Vec<u64> = store.messages().iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![2, 5, 6]);
    }

    #[test]
    fn test_empty_and_minimal_store_noop() {
        let engine = CompactionEngine::default();
        let tokenizer = CharEstimator::new();

        let mut empty = MessageStore::new();
        let report = engine.compact(&mut empty, &tokenizer, CompactionStrategy::Aggressive, 0);
        assert!(report.is_noop());

        let mut small = store_with(&["user", "assistant"]);
        let report = engine.compact(&mut small, &tokenizer, CompactionStrategy::Aggressive, 0);
        assert_eq!(report.removed, 0);
        assert_eq!(engine.stats().compaction_count, 0);
    }

    #[test]
    fn test_tool_records_survive_compaction() {
        use crate::message::ToolCallPayload;
        use serde_json::json;

        let mut store = MessageStore::new();
        for i in 0..4 {
            store
                .append(IncomingMessage::tool(
                    format!("out {}", i),
                    ToolCallPayload::new("bash", json!({"n": i})),
                ))
                .unwrap();
        }

        let engine = CompactionEngine::new(CompactionWindows::new(1, 1, 1));
        engine.compact(&mut store, &CharEstimator::new(), CompactionStrategy::Aggressive, 0);

        assert_eq!(store.len(), 1);
        assert_eq!(store.tool_calls().len(), 4);
    }

    #[test]
    fn test_stats_accumulate() {
        let engine = CompactionEngine::new(CompactionWindows::new(1, 1, 1));
        let tokenizer = CharEstimator::new();

        let mut store = store_with(&["user"; 4]);
        let before = total_cost(store.messages(), &tokenizer);
        engine.compact(&mut store, &tokenizer, CompactionStrategy::Aggressive, before);

        let mut store = store_with(&["user"; 3]);
        engine.compact(&mut store, &tokenizer, CompactionStrategy::Aggressive, 0);

        let stats = engine.stats();
        assert_eq!(stats.compaction_count, 2);
        assert_eq!(stats.total_messages_removed, 5);
    }
}
