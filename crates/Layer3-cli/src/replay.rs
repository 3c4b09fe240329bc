//! Transcript replay
//!
//! JSONL 트랜스크립트를 한 줄씩 ContextManager에 넣고 최종 상태를 보고합니다.

use anyhow::Context;
use keel_core::{
    CompactionReport, CompactionStats, ContextManager, ConversationSummary, EventRecorder,
    HookEventType, IncomingMessage, LoggingObserver, MaintenanceReport, ObservabilityContext,
    RecordedEvent, SummarySchema,
};
use keel_foundation::{CompactionStrategy, ContextConfig, TokenDistribution};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

/// Replay switches from the command line
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub session_id: Option<String>,
    pub strategy: Option<CompactionStrategy>,
    pub auto: bool,
    pub summarize: bool,
}

/// Printed result of a replay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub messages_replayed: usize,
    pub observability: ObservabilityContext,
    pub token_distribution: TokenDistribution,
    pub compaction_stats: CompactionStats,
    pub threshold_events: Vec<RecordedEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub maintenance: Vec<MaintenanceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_compaction: Option<CompactionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ConversationSummary>,
    pub observer_failures: usize,
}

pub struct Replayer {
    manager: ContextManager,
    recorder: Arc<EventRecorder>,
    options: ReplayOptions,
}

impl Replayer {
    pub fn new(config: &ContextConfig, options: ReplayOptions) -> anyhow::Result<Self> {
        let mut builder = ContextManager::builder().config(config.clone());
        if let Some(id) = &options.session_id {
            builder = builder.session_id(id.clone());
        }
        let manager = builder.build().context("Failed to create context manager")?;

        let recorder = Arc::new(EventRecorder::new());
        manager.register_observer(LoggingObserver);
        manager.register_observer_arc(recorder.clone());

        Ok(Self {
            manager,
            recorder,
            options,
        })
    }

    pub async fn run_file(self, path: &Path) -> anyhow::Result<ReplayReport> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.run_str(&content).await
    }

    pub async fn run_str(self, transcript: &str) -> anyhow::Result<ReplayReport> {
        let span = self.manager.observability().span();
        self.replay(transcript).instrument(span).await
    }

    async fn replay(&self, transcript: &str) -> anyhow::Result<ReplayReport> {
        let mut replayed = 0;
        let mut failures = 0;
        let mut maintenance = Vec::new();

        for (idx, line) in transcript.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let incoming: IncomingMessage = serde_json::from_str(line)
                .with_context(|| format!("line {}: not a message record", line_no))?;
            let outcome = self
                .manager
                .append(incoming)
                .with_context(|| format!("line {}: message rejected", line_no))?;
            failures += outcome.observer_failures.len();
            replayed += 1;

            if self.options.auto {
                let outcome = self
                    .manager
                    .maintain()
                    .await
                    .with_context(|| format!("line {}: maintenance failed", line_no))?;
                failures += outcome.observer_failures.len();
                if outcome.value.compaction.is_some() {
                    maintenance.push(outcome.into_value());
                }
            }
        }

        let final_compaction = self.options.strategy.map(|strategy| {
            let outcome = self.manager.compact(strategy);
            failures += outcome.observer_failures.len();
            outcome.into_value()
        });

        if self.options.summarize {
            let outcome = self
                .manager
                .summarize(&SummarySchema::all())
                .await
                .context("Final summarization failed")?;
            failures += outcome.observer_failures.len();
        }

        tracing::info!(messages = replayed, "Replay finished");

        Ok(ReplayReport {
            messages_replayed: replayed,
            observability: self.manager.observability(),
            token_distribution: self.manager.token_distribution(),
            compaction_stats: self.manager.compaction_stats(),
            threshold_events: self.recorder.of_type(HookEventType::ThresholdCrossed),
            maintenance,
            final_compaction,
            summary: self.manager.summary(),
            observer_failures: failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_foundation::{CompactionWindows, ContextThresholds};

    const TRANSCRIPT: &str = r#"
{"role": "system", "content": "You are a coding agent."}
{"role": "user", "content": "Add a --verbose flag to the CLI"}
{"role": "assistant", "content": "Decision: use clap's ArgAction::Count\nNext: update the help text"}
{"role": "tool", "content": "ok", "toolCall": {"name": "edit", "arguments": {"path": "src/main.rs"}}}
{"role": "assistant", "content": "Flag added."}
"#;

    fn small_config() -> ContextConfig {
        ContextConfig::default()
            .with_thresholds(ContextThresholds::new(5, 10, 15, 20))
            .with_compaction_windows(CompactionWindows::new(1, 2, 3))
    }

    #[tokio::test]
    async fn test_replay_with_summary() {
        let options = ReplayOptions {
            session_id: Some("replay-1".into()),
            summarize: true,
            ..Default::default()
        };
        let report = Replayer::new(&ContextConfig::default(), options)
            .unwrap()
            .run_str(TRANSCRIPT)
            .await
            .unwrap();

        assert_eq!(report.messages_replayed, 5);
        assert_eq!(report.observability.session_id, "replay-1");
        assert!(report.threshold_events.is_empty());

        let summary = report.summary.unwrap();
        assert_eq!(summary.user_goal, "Add a --verbose flag to the CLI");
        assert_eq!(summary.modified_files, vec!["src/main.rs"]);
        assert_eq!(summary.next_steps, vec!["update the help text"]);
    }

    #[tokio::test]
    async fn test_replay_final_strategy() {
        let options = ReplayOptions {
            strategy: Some(CompactionStrategy::Aggressive),
            ..Default::default()
        };
        let report = Replayer::new(&small_config(), options)
            .unwrap()
            .run_str(TRANSCRIPT)
            .await
            .unwrap();

        // system message + last message
        assert_eq!(report.final_compaction.unwrap().removed, 3);
        assert_eq!(report.observability.message_count, 2);
        assert!(!report.threshold_events.is_empty());
    }

    #[tokio::test]
    async fn test_replay_auto_keeps_cost_down() {
        let options = ReplayOptions {
            auto: true,
            ..Default::default()
        };
        let report = Replayer::new(&small_config(), options)
            .unwrap()
            .run_str(TRANSCRIPT)
            .await
            .unwrap();

        assert!(!report.maintenance.is_empty());
        assert!(report.compaction_stats.compaction_count > 0);
        assert!(report.summary.is_some());
    }

    #[tokio::test]
    async fn test_replay_reports_bad_line() {
        let err = Replayer::new(&ContextConfig::default(), ReplayOptions::default())
            .unwrap()
            .run_str("{\"role\": \"user\", \"content\": \"hi\"}\n{\"role\": \"wizard\", \"content\": \"x\"}\n")
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[tokio::test]
    async fn test_replay_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, TRANSCRIPT).unwrap();

        let report = Replayer::new(&ContextConfig::default(), ReplayOptions::default())
            .unwrap()
            .run_file(&path)
            .await
            .unwrap();
        assert_eq!(report.messages_replayed, 5);
    }
}
