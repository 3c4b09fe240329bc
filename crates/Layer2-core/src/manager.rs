//! Context Manager
//!
//! 세션 하나의 상태(메시지, 도구 호출, 누적 비용, 요약)를 소유하고
//! append / compact / summarize / get_context 를 제공합니다.
//!
//! ## 흐름
//!
//! ```text
//! append ─▶ MessageStore ─▶ cost += estimate ─▶ ThresholdMonitor
//!                                                    │
//!                        HookDispatcher ◀────────────┘ (lock 해제 후)
//! ```
//!
//! 상태는 `RwLock`으로 보호되며, 관찰자 호출과 요약 생성(await)은 lock을
//! 잡지 않은 상태에서 수행됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keel_foundation::{
    CharEstimator, CompactionStrategy, ContextConfig, ContextThresholds, Error, Result,
    ThresholdLevel, TokenDistribution, Tokenizer, TokenizerFactory,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::compaction::{CompactionEngine, CompactionReport, CompactionStats};
use crate::context::{ConversationContext, ObservabilityContext};
use crate::hook::{ContextObserver, HookDispatcher, HookEvent};
use crate::message::{IncomingMessage, Message, ToolCallRecord};
use crate::monitor::ThresholdMonitor;
use crate::outcome::Outcome;
use crate::store::MessageStore;
use crate::summary::{
    ConversationSummary, HeuristicSummarizer, SummarizationEngine, SummarySchema, SummaryStrategy,
};

// ============================================================================
// ContextManagement Trait
// ============================================================================

/// Core context operations
#[async_trait]
pub trait ContextManagement: Send + Sync {
    /// Validate, store and account for a message
    fn append(&self, message: IncomingMessage) -> Result<Outcome<Message>>;

    /// Remove everything outside the protected set and the strategy's window
    fn compact(&self, strategy: CompactionStrategy) -> Outcome<CompactionReport>;

    /// Replace the current summary with a freshly generated one
    async fn summarize(&self, schema: &SummarySchema) -> Result<Outcome<ConversationSummary>>;

    /// Independently owned snapshot of the session
    fn get_context(&self) -> ConversationContext;
}

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Default)]
struct SessionState {
    store: MessageStore,
    /// Always the sum of estimated costs of `store.messages()`
    running_cost: usize,
    summary: Option<ConversationSummary>,
}

/// Result of [`ContextManager::maintain`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    /// Level that drove the maintenance
    pub level: ThresholdLevel,
    pub summarized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compaction: Option<CompactionReport>,
}

// ============================================================================
// ContextManager
// ============================================================================

/// Reference context manager for one session
pub struct ContextManager {
    session_id: String,
    created_at: DateTime<Utc>,
    state: RwLock<SessionState>,
    tokenizer: Arc<dyn Tokenizer>,
    monitor: ThresholdMonitor,
    compaction: CompactionEngine,
    summarizer: SummarizationEngine,
    hooks: HookDispatcher,
}

impl ContextManager {
    /// Manager with default config and the character estimator
    pub fn new() -> Self {
        Self::assemble(
            new_session_id(),
            &ContextConfig::default(),
            Arc::new(CharEstimator::new()),
            None,
        )
    }

    /// Manager built from a loaded config
    pub fn from_config(config: &ContextConfig) -> Result<Self> {
        ContextManagerBuilder::new().config(config.clone()).build()
    }

    pub fn builder() -> ContextManagerBuilder {
        ContextManagerBuilder::new()
    }

    fn assemble(
        session_id: String,
        config: &ContextConfig,
        tokenizer: Arc<dyn Tokenizer>,
        strategy: Option<Arc<dyn SummaryStrategy>>,
    ) -> Self {
        let strategy = strategy.unwrap_or_else(|| {
            Arc::new(
                HeuristicSummarizer::new().with_preview_length(config.summary.preview_length),
            )
        });

        tracing::debug!(
            session_id = %session_id,
            tokenizer = %tokenizer.tokenizer_type(),
            strategy = strategy.name(),
            hard = config.thresholds.hard,
            "Context manager created"
        );

        Self {
            session_id,
            created_at: Utc::now(),
            state: RwLock::new(SessionState::default()),
            tokenizer,
            monitor: ThresholdMonitor::new(config.thresholds.clone()),
            compaction: CompactionEngine::new(config.compaction.clone()),
            summarizer: SummarizationEngine::new(strategy),
            hooks: HookDispatcher::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn thresholds(&self) -> &ContextThresholds {
        self.monitor.thresholds()
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    pub fn hooks(&self) -> &HookDispatcher {
        &self.hooks
    }

    pub fn register_observer<O: ContextObserver + 'static>(&self, observer: O) {
        self.hooks.register(observer);
    }

    pub fn register_observer_arc(&self, observer: Arc<dyn ContextObserver>) {
        self.hooks.register_arc(observer);
    }

    pub fn running_cost(&self) -> usize {
        self.state.read().running_cost
    }

    pub fn message_count(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn summary(&self) -> Option<ConversationSummary> {
        self.state.read().summary.clone()
    }

    /// Level for the current running cost
    pub fn current_level(&self) -> ThresholdLevel {
        self.monitor.level(self.running_cost())
    }

    pub fn compaction_stats(&self) -> CompactionStats {
        self.compaction.stats()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Last `n` messages in original order
    pub fn recent_messages(&self, n: usize) -> Vec<Message> {
        self.state.read().store.recent_messages(n)
    }

    /// Last `n` tool call records; `None` uses `preserve_recent_tool_calls`
    pub fn recent_tool_calls(&self, n: Option<usize>) -> Vec<ToolCallRecord> {
        let n = n.unwrap_or(self.monitor.thresholds().preserve_recent_tool_calls);
        self.state.read().store.recent_tool_calls(n)
    }

    /// Copy of the session state
    pub fn snapshot(&self) -> ConversationContext {
        let state = self.state.read();
        ConversationContext {
            session_id: self.session_id.clone(),
            created_at: self.created_at,
            messages: state.store.messages().to_vec(),
            tool_calls: state.store.tool_calls().to_vec(),
            running_cost: state.running_cost,
            summary: state.summary.clone(),
        }
    }

    /// Telemetry record
    pub fn observability(&self) -> ObservabilityContext {
        let (message_count, token_count) = {
            let state = self.state.read();
            (state.store.len(), state.running_cost)
        };
        ObservabilityContext {
            session_id: self.session_id.clone(),
            message_count,
            token_count,
            thresholds: self.monitor.flags(token_count),
        }
    }

    /// Per-role token totals
    pub fn token_distribution(&self) -> TokenDistribution {
        let state = self.state.read();
        let mut dist = TokenDistribution::new();
        for msg in state.store.messages() {
            dist.record(msg.role.as_str(), msg.cost(self.tokenizer.as_ref()));
        }
        dist
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// See [`ContextManagement::append`]
    pub fn append(&self, incoming: IncomingMessage) -> Result<Outcome<Message>> {
        let (message, delta, cost) = {
            let mut state = self.state.write();
            let message = state.store.append(incoming)?;
            let delta = message.cost(self.tokenizer.as_ref());
            state.running_cost += delta;
            (message, delta, state.running_cost)
        };

        tracing::debug!(
            id = %message.id,
            role = %message.role,
            delta,
            running_cost = cost,
            "Message appended"
        );

        let failures = self.hooks.dispatch(&HookEvent::MessageAdded(&message));
        let mut outcome = Outcome::with_failures(message, failures);
        outcome.absorb(self.notify_threshold(cost));
        Ok(outcome)
    }

    /// See [`ContextManagement::compact`]
    pub fn compact(&self, strategy: CompactionStrategy) -> Outcome<CompactionReport> {
        let message_count = self.message_count();
        let mut failures = self.hooks.dispatch(&HookEvent::BeforeCompaction {
            strategy,
            message_count,
        });

        let report = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let report = self.compaction.compact(
                &mut state.store,
                self.tokenizer.as_ref(),
                strategy,
                state.running_cost,
            );
            state.running_cost = report.tokens_after;
            report
        };

        failures.extend(self.hooks.dispatch(&HookEvent::AfterCompaction {
            strategy,
            removed: report.removed,
        }));
        failures.extend(self.notify_threshold(report.tokens_after));

        Outcome::with_failures(report, failures)
    }

    /// See [`ContextManagement::summarize`]
    pub async fn summarize(&self, schema: &SummarySchema) -> Result<Outcome<ConversationSummary>> {
        let strategy = Arc::clone(self.summarizer.strategy());
        self.summarize_with(strategy.as_ref(), schema).await
    }

    /// Summarize with a one-off strategy instead of the configured one
    pub async fn summarize_with(
        &self,
        strategy: &dyn SummaryStrategy,
        schema: &SummarySchema,
    ) -> Result<Outcome<ConversationSummary>> {
        let snapshot = self.snapshot();

        let summary = match SummarizationEngine::run(strategy, &snapshot, schema).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(strategy = strategy.name(), error = %e, "Summarization failed, keeping previous summary");
                return Err(e);
            }
        };

        self.state.write().summary = Some(summary.clone());
        tracing::info!(
            strategy = strategy.name(),
            messages = snapshot.message_count(),
            "Summary replaced"
        );

        let failures = self
            .hooks
            .dispatch(&HookEvent::SummarizationComplete(&summary));
        Ok(Outcome::with_failures(summary, failures))
    }

    /// Apply the escalation policy for the current level.
    ///
    /// `Compaction` → balanced compaction; `Summarization` → full summary
    /// then balanced compaction; `Rot` / `Hard` → full summary then aggressive
    /// compaction. A failed summary aborts before anything is removed.
    pub async fn maintain(&self) -> Result<Outcome<MaintenanceReport>> {
        let level = self.current_level();
        let mut outcome = Outcome::new(MaintenanceReport {
            level,
            summarized: false,
            compaction: None,
        });

        let strategy = match level {
            ThresholdLevel::None => return Ok(outcome),
            ThresholdLevel::Compaction => CompactionStrategy::Balanced,
            ThresholdLevel::Summarization => CompactionStrategy::Balanced,
            ThresholdLevel::Rot | ThresholdLevel::Hard => CompactionStrategy::Aggressive,
        };

        if level >= ThresholdLevel::Summarization {
            let summarized = self.summarize(&SummarySchema::all()).await?;
            outcome.absorb(summarized.observer_failures);
            outcome.value.summarized = true;
        }

        let compacted = self.compact(strategy);
        outcome.absorb(compacted.observer_failures);
        outcome.value.compaction = Some(compacted.value);

        tracing::info!(level = %level, strategy = %strategy, "Context maintenance applied");
        Ok(outcome)
    }

    fn notify_threshold(&self, cost: usize) -> Vec<Error> {
        match self.monitor.evaluate(cost) {
            Some(level) => self
                .hooks
                .dispatch(&HookEvent::ThresholdCrossed { level, cost }),
            None => Vec::new(),
        }
    }
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextManager")
            .field("session_id", &self.session_id)
            .field("tokenizer", &self.tokenizer.tokenizer_type())
            .field("summarizer", &self.summarizer)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[async_trait]
impl ContextManagement for ContextManager {
    fn append(&self, message: IncomingMessage) -> Result<Outcome<Message>> {
        ContextManager::append(self, message)
    }

    fn compact(&self, strategy: CompactionStrategy) -> Outcome<CompactionReport> {
        ContextManager::compact(self, strategy)
    }

    async fn summarize(&self, schema: &SummarySchema) -> Result<Outcome<ConversationSummary>> {
        ContextManager::summarize(self, schema).await
    }

    fn get_context(&self) -> ConversationContext {
        self.snapshot()
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ContextManager`]
#[derive(Default)]
pub struct ContextManagerBuilder {
    session_id: Option<String>,
    config: ContextConfig,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    strategy: Option<Arc<dyn SummaryStrategy>>,
    observers: Vec<Arc<dyn ContextObserver>>,
}

impl ContextManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn thresholds(mut self, thresholds: ContextThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Explicit tokenizer; overrides `config.tokenizer`
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn summary_strategy(mut self, strategy: Arc<dyn SummaryStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ContextObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Result<ContextManager> {
        let tokenizer = match self.tokenizer {
            Some(tokenizer) => tokenizer,
            None => TokenizerFactory::create(self.config.tokenizer)?,
        };

        let manager = ContextManager::assemble(
            self.session_id.unwrap_or_else(new_session_id),
            &self.config,
            tokenizer,
            self.strategy,
        );
        for observer in self.observers {
            manager.register_observer_arc(observer);
        }
        Ok(manager)
    }
}
