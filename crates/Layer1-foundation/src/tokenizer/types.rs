//! Token count and distribution types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::strings::{ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_TOOL, ROLE_USER};
use crate::Error;

/// Which estimator produced a count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerType {
    /// `ceil(chars / 4)`
    #[default]
    Characters,
    /// ASCII / CJK / other unicode ratios
    LanguageAware,
    /// Caller-supplied function
    Custom,
}

impl TokenizerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::LanguageAware => "language_aware",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for TokenizerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "characters" | "chars" | "char" => Ok(Self::Characters),
            "language_aware" | "language-aware" | "multilingual" => Ok(Self::LanguageAware),
            "custom" => Ok(Self::Custom),
            other => Err(Error::Config(format!("Unknown tokenizer type: {}", other))),
        }
    }
}

/// Estimated cost of one text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCount {
    pub total: usize,
    /// false면 추정치
    pub is_exact: bool,
    pub char_count: usize,
    pub tokenizer_type: TokenizerType,
}

impl TokenCount {
    /// Heuristic count over `text`
    pub fn estimated(total: usize, tokenizer_type: TokenizerType, text: &str) -> Self {
        Self {
            total,
            is_exact: false,
            char_count: text.chars().count(),
            tokenizer_type,
        }
    }

    pub fn exact(mut self, is_exact: bool) -> Self {
        self.is_exact = is_exact;
        self
    }
}

// ============================================================================
// Per-role distribution
// ============================================================================

/// Token totals per message role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDistribution {
    pub system: usize,
    pub user: usize,
    pub assistant: usize,
    pub tool: usize,
    pub total: usize,
}

impl TokenDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tokens` under a role name (`system`, `user`, `assistant`, `tool`)
    ///
    /// Unknown roles still count toward `total`.
    pub fn record(&mut self, role: &str, tokens: usize) {
        if let Some(slot) = self.slot_mut(role) {
            *slot += tokens;
        }
        self.total += tokens;
    }

    pub fn tokens_for(&self, role: &str) -> usize {
        match role {
            ROLE_SYSTEM => self.system,
            ROLE_USER => self.user,
            ROLE_ASSISTANT => self.assistant,
            ROLE_TOOL => self.tool,
            _ => 0,
        }
    }

    /// Percentage of `total` spent on `role` (0.0 when empty)
    pub fn share(&self, role: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.tokens_for(role) as f64 * 100.0 / self.total as f64
    }

    fn slot_mut(&mut self, role: &str) -> Option<&mut usize> {
        match role {
            ROLE_SYSTEM => Some(&mut self.system),
            ROLE_USER => Some(&mut self.user),
            ROLE_ASSISTANT => Some(&mut self.assistant),
            ROLE_TOOL => Some(&mut self.tool),
            _ => None,
        }
    }
}
