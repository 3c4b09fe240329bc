//! Threshold Monitor
//!
//! 누적 비용을 네 개의 워터마크와 비교하여 가장 높은 단계 하나만 보고합니다.
//! "이미 알림" 상태를 두지 않으므로 선 위에 머무는 동안 매 변경마다 다시 발생합니다.

use keel_foundation::{ContextThresholds, ThresholdFlags, ThresholdLevel};

/// Stateless watermark evaluator
#[derive(Debug, Clone, Default)]
pub struct ThresholdMonitor {
    thresholds: ContextThresholds,
}

impl ThresholdMonitor {
    pub fn new(thresholds: ContextThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ContextThresholds {
        &self.thresholds
    }

    /// Current level for a cost, `None` included
    pub fn level(&self, cost: usize) -> ThresholdLevel {
        self.thresholds.level_for(cost)
    }

    pub fn flags(&self, cost: usize) -> ThresholdFlags {
        self.thresholds.crossed(cost)
    }

    /// Evaluate after a cost-affecting mutation.
    ///
    /// Returns the single highest level crossed, or `None` when below every
    /// watermark.
    pub fn evaluate(&self, cost: usize) -> Option<ThresholdLevel> {
        let level = self.level(cost);
        match level {
            ThresholdLevel::None => None,
            ThresholdLevel::Compaction | ThresholdLevel::Summarization => {
                tracing::info!(level = %level, cost, "Context threshold crossed");
                Some(level)
            }
            ThresholdLevel::Rot => {
                tracing::warn!(level = %level, cost, rot = self.thresholds.rot, "Context rot threshold crossed");
                Some(level)
            }
            ThresholdLevel::Hard => {
                tracing::error!(level = %level, cost, hard = self.thresholds.hard, "Context hard limit reached");
                Some(level)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> ThresholdMonitor {
        ThresholdMonitor::new(ContextThresholds::new(10, 20, 30, 40))
    }

    #[test]
    fn test_below_all_watermarks() {
        assert_eq!(monitor().evaluate(9), None);
    }

    #[test]
    fn test_reports_highest_only() {
        let m = monitor();
        assert_eq!(m.evaluate(10), Some(ThresholdLevel::Compaction));
        assert_eq!(m.evaluate(29), Some(ThresholdLevel::Summarization));
        assert_eq!(m.evaluate(30), Some(ThresholdLevel::Rot));
        assert_eq!(m.evaluate(1_000), Some(ThresholdLevel::Hard));
    }

    #[test]
    fn test_refires_without_memory() {
        let m = monitor();
        assert_eq!(m.evaluate(15), Some(ThresholdLevel::Compaction));
        assert_eq!(m.evaluate(15), Some(ThresholdLevel::Compaction));
    }

    #[test]
    fn test_unordered_watermarks_pick_highest_named() {
        // hard below rot: hard still wins
        let m = ThresholdMonitor::new(ContextThresholds::new(10, 20, 50, 30));
        assert_eq!(m.evaluate(35), Some(ThresholdLevel::Hard));
    }

    #[test]
    fn test_flags() {
        let flags = monitor().flags(25);
        assert!(flags.compaction && flags.summarization);
        assert!(!flags.rot && !flags.hard);
    }
}
