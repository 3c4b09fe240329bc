//! Summarization Engine
//!
//! 생성 로직은 `SummaryStrategy`로 교체 가능하며, 엔진은 스키마 마스킹과
//! 에러 분류만 담당합니다. 저장소는 읽기 전용 스냅샷으로만 전달됩니다.

use async_trait::async_trait;
use keel_foundation::{Error, Result};
use std::sync::Arc;

use super::schema::{ConversationSummary, SummarySchema};
use crate::context::ConversationContext;

// ============================================================================
// SummaryStrategy Trait
// ============================================================================

/// Pluggable summary generation
///
/// Implementations must be deterministic for the same context and schema.
#[async_trait]
pub trait SummaryStrategy: Send + Sync {
    /// Strategy name (logging / error reporting)
    fn name(&self) -> &str;

    /// Produce a summary of `context`
    async fn generate(
        &self,
        context: &ConversationContext,
        schema: &SummarySchema,
    ) -> Result<ConversationSummary>;
}

// ============================================================================
// SummarizationEngine
// ============================================================================

/// Runs a strategy and normalizes its output
#[derive(Clone)]
pub struct SummarizationEngine {
    strategy: Arc<dyn SummaryStrategy>,
}

impl SummarizationEngine {
    pub fn new(strategy: Arc<dyn SummaryStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &Arc<dyn SummaryStrategy> {
        &self.strategy
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Generate a summary with the configured strategy
    pub async fn summarize(
        &self,
        context: &ConversationContext,
        schema: &SummarySchema,
    ) -> Result<ConversationSummary> {
        Self::run(self.strategy.as_ref(), context, schema).await
    }

    /// Generate with an arbitrary strategy.
    ///
    /// Failures are reported as `SummarizationFailed`; unrequested fields are
    /// cleared even if the strategy filled them.
    pub async fn run(
        strategy: &dyn SummaryStrategy,
        context: &ConversationContext,
        schema: &SummarySchema,
    ) -> Result<ConversationSummary> {
        match strategy.generate(context, schema).await {
            Ok(summary) => Ok(summary.masked(schema)),
            Err(e @ Error::SummarizationFailed { .. }) => Err(e),
            Err(e) => Err(Error::summarization_failed(strategy.name(), e)),
        }
    }
}

impl std::fmt::Debug for SummarizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizationEngine")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
