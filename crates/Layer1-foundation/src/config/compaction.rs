//! Compaction Configuration - 압축 전략과 유지 윈도우

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 압축 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactionStrategy {
    /// 가장 작은 윈도우
    Aggressive,
    /// 중간 윈도우
    Balanced,
    /// 가장 큰 윈도우
    Conservative,
}

impl Default for CompactionStrategy {
    fn default() -> Self {
        Self::Balanced
    }
}

impl CompactionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Balanced => "balanced",
            Self::Conservative => "conservative",
        }
    }
}

impl std::fmt::Display for CompactionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompactionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aggressive" => Ok(Self::Aggressive),
            "balanced" => Ok(Self::Balanced),
            "conservative" => Ok(Self::Conservative),
            other => Err(Error::Config(format!(
                "Unknown compaction strategy: {}",
                other
            ))),
        }
    }
}

/// 전략별 유지할 최근 메시지 수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionWindows {
    #[serde(default = "default_aggressive")]
    pub aggressive: usize,

    #[serde(default = "default_balanced")]
    pub balanced: usize,

    #[serde(default = "default_conservative")]
    pub conservative: usize,
}

fn default_aggressive() -> usize {
    5
}

fn default_balanced() -> usize {
    10
}

fn default_conservative() -> usize {
    20
}

impl Default for CompactionWindows {
    fn default() -> Self {
        Self {
            aggressive: default_aggressive(),
            balanced: default_balanced(),
            conservative: default_conservative(),
        }
    }
}

impl CompactionWindows {
    pub fn new(aggressive: usize, balanced: usize, conservative: usize) -> Self {
        Self {
            aggressive,
            balanced,
            conservative,
        }
    }

    /// 전략의 유지 윈도우 크기
    pub fn window_for(&self, strategy: CompactionStrategy) -> usize {
        match strategy {
            CompactionStrategy::Aggressive => self.aggressive,
            CompactionStrategy::Balanced => self.balanced,
            CompactionStrategy::Conservative => self.conservative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows_increase() {
        let w = CompactionWindows::default();
        assert!(w.window_for(CompactionStrategy::Aggressive) < w.window_for(CompactionStrategy::Balanced));
        assert!(
            w.window_for(CompactionStrategy::Balanced)
                < w.window_for(CompactionStrategy::Conservative)
        );
    }

    #[test]
    fn test_strategy_parse_and_display() {
        let s: CompactionStrategy = " Aggressive ".parse().unwrap();
        assert_eq!(s, CompactionStrategy::Aggressive);
        assert_eq!(s.to_string(), "aggressive");
        assert!("lossless".parse::<CompactionStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&CompactionStrategy::Conservative).unwrap();
        assert_eq!(json, "\"conservative\"");
    }
}
