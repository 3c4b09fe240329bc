//! Token Estimators
//!
//! - CharEstimator: 문자 수 기반 기본 추정 (기본값)
//! - LanguageAwareEstimator: 언어별 비율 추정
//! - FnTokenizer: 호출자가 제공한 함수로 계산

use super::traits::Tokenizer;
use super::types::{TokenCount, TokenizerType};

const DEFAULT_CHARS_PER_TOKEN: f32 = 4.0;
const CJK_CHARS_PER_TOKEN: f32 = 1.5;
const OTHER_CHARS_PER_TOKEN: f32 = 2.0;

// ============================================================================
// 기본 추정 토크나이저
// ============================================================================

/// 문자 기반 추정 토크나이저
///
/// `ceil(chars / chars_per_token)`. 기본 비율은 4자당 1토큰입니다.
#[derive(Debug, Clone)]
pub struct CharEstimator {
    chars_per_token: f32,
}

impl CharEstimator {
    pub fn new() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }

    /// 비율 지정 (0 이하 값은 1.0으로 보정)
    pub fn with_ratio(chars_per_token: f32) -> Self {
        let chars_per_token = if chars_per_token > 0.0 {
            chars_per_token
        } else {
            1.0
        };
        Self { chars_per_token }
    }

    pub fn chars_per_token(&self) -> f32 {
        self.chars_per_token
    }

    fn estimate(&self, chars: usize) -> usize {
        // 정수 비율은 f32 정밀도 한계(약 1600만 자) 없이 계산
        if self.chars_per_token.fract() == 0.0 {
            chars.div_ceil(self.chars_per_token as usize)
        } else {
            (chars as f64 / f64::from(self.chars_per_token)).ceil() as usize
        }
    }
}

impl Default for CharEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for CharEstimator {
    fn tokenizer_type(&self) -> TokenizerType {
        TokenizerType::Characters
    }

    fn count(&self, text: &str) -> TokenCount {
        let total = self.estimate(text.chars().count());
        TokenCount::estimated(total, TokenizerType::Characters, text)
    }
}

// ============================================================================
// 언어별 추정 토크나이저
// ============================================================================

/// 텍스트의 언어 특성을 분석하는 추정 토크나이저
///
/// ASCII, CJK, 기타 유니코드에 각각 다른 비율을 적용합니다.
#[derive(Debug, Clone, Default)]
pub struct LanguageAwareEstimator;

impl LanguageAwareEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Single-pass character analysis (no allocation)
    #[inline]
    fn estimate_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        let mut ascii_count = 0u32;
        let mut cjk_count = 0u32;
        let mut other_count = 0u32;

        for c in text.chars() {
            if c.is_ascii() {
                ascii_count += 1;
            } else if is_cjk(c) {
                cjk_count += 1;
            } else {
                other_count += 1;
            }
        }

        let ascii_tokens = ascii_count as f32 / DEFAULT_CHARS_PER_TOKEN;
        let cjk_tokens = cjk_count as f32 / CJK_CHARS_PER_TOKEN;
        let other_tokens = other_count as f32 / OTHER_CHARS_PER_TOKEN;

        (ascii_tokens + cjk_tokens + other_tokens).ceil() as usize
    }
}

impl Tokenizer for LanguageAwareEstimator {
    fn tokenizer_type(&self) -> TokenizerType {
        TokenizerType::LanguageAware
    }

    fn count(&self, text: &str) -> TokenCount {
        let total = self.estimate_tokens(text);
        TokenCount::estimated(total, TokenizerType::LanguageAware, text)
    }
}

#[inline]
fn is_cjk(c: char) -> bool {
    let code = c as u32;

    if code < 0x1100 {
        return false;
    }

    // Korean syllables
    if (0xAC00..=0xD7AF).contains(&code) {
        return true;
    }

    // CJK Unified Ideographs
    if (0x4E00..=0x9FFF).contains(&code) {
        return true;
    }

    // Japanese Hiragana/Katakana
    if (0x3040..=0x30FF).contains(&code) {
        return true;
    }

    // Korean Jamo, compatibility
    (0x1100..=0x11FF).contains(&code) || (0x3130..=0x318F).contains(&code)
}

// ============================================================================
// 함수 기반 토크나이저
// ============================================================================

/// 클로저로 토큰 수를 계산하는 토크나이저
///
/// ```ignore
/// let words = FnTokenizer::new(|text| text.split_whitespace().count());
/// ```
pub struct FnTokenizer<F>
where
    F: Fn(&str) -> usize + Send + Sync,
{
    count_fn: F,
    exact: bool,
}

impl<F> FnTokenizer<F>
where
    F: Fn(&str) -> usize + Send + Sync,
{
    pub fn new(count_fn: F) -> Self {
        Self {
            count_fn,
            exact: false,
        }
    }

    /// 정확한 토큰 수를 반환하는 함수로 표시
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }
}

impl<F> Tokenizer for FnTokenizer<F>
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn tokenizer_type(&self) -> TokenizerType {
        TokenizerType::Custom
    }

    fn count(&self, text: &str) -> TokenCount {
        TokenCount::estimated((self.count_fn)(text), TokenizerType::Custom, text)
            .exact(self.exact)
    }

    fn is_exact(&self) -> bool {
        self.exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_estimator_four_chars_per_token() {
        let tokenizer = CharEstimator::new();

        assert_eq!(tokenizer.count("").total, 0);
        assert_eq!(tokenizer.count("test").total, 1);
        assert_eq!(tokenizer.count("hello").total, 2);
        assert_eq!(tokenizer.count(&"x".repeat(100)).total, 25);
        assert!(!tokenizer.count("hello").is_exact);
    }

    #[test]
    fn test_char_estimator_counts_chars_not_bytes() {
        let tokenizer = CharEstimator::new();
        // 4 chars, 12 bytes
        assert_eq!(tokenizer.count("안녕하세").total, 1);
    }

    #[test]
    fn test_char_estimator_exact_for_large_text() {
        let tokenizer = CharEstimator::new();
        // 2^24 + 1 chars: f32 division would round down to 4_194_304
        let text = "x".repeat((1 << 24) + 1);
        assert_eq!(tokenizer.count(&text).total, (1 << 22) + 1);
    }

    #[test]
    fn test_char_estimator_custom_ratio() {
        assert_eq!(CharEstimator::with_ratio(2.5).count("abcdef").total, 3);
        assert_eq!(CharEstimator::with_ratio(2.0).count("abcd").total, 2);
        assert_eq!(CharEstimator::with_ratio(0.0).chars_per_token(), 1.0);
    }

    #[test]
    fn test_language_aware_estimator() {
        let tokenizer = LanguageAwareEstimator::new();

        let en = tokenizer.count("Hello, this is a test.");
        assert!(en.total > 0);

        // 한국어는 문자당 토큰이 더 많음
        let ko = tokenizer.count("안녕하세요 테스트입니다");
        let en_same_len = tokenizer.count("abcdefghijk");
        assert!(ko.total > en_same_len.total);
        assert_eq!(tokenizer.count("").total, 0);
    }

    #[test]
    fn test_fn_tokenizer() {
        let words = FnTokenizer::new(|text: &str| text.split_whitespace().count()).exact();
        let count = words.count("one two three");

        assert_eq!(count.total, 3);
        assert!(count.is_exact);
        assert_eq!(count.tokenizer_type, TokenizerType::Custom);
    }
}
