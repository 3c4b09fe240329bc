//! Tokenizer Trait 정의

use super::types::{TokenCount, TokenizerType};

/// 토큰 추정기 인터페이스
///
/// `count`는 같은 입력에 대해 항상 같은 값을 반환해야 합니다.
/// 컨텍스트 비용은 이 값의 합으로 계산됩니다.
pub trait Tokenizer: Send + Sync {
    fn tokenizer_type(&self) -> TokenizerType;

    fn count(&self, text: &str) -> TokenCount;

    /// 정확한 토큰 계산 지원 여부
    fn is_exact(&self) -> bool {
        false
    }

    /// `budget` 토큰 안에 들어가는 가장 긴 앞부분
    ///
    /// 문자 경계에서만 자릅니다. 추정치가 접두사 길이에 대해 단조 증가한다고 가정합니다.
    fn fit<'a>(&self, text: &'a str, budget: usize) -> &'a str {
        if self.count(text).total <= budget {
            return text;
        }

        let boundaries: Vec<usize> = text.char_indices().map(|(at, _)| at).collect();

        // boundaries[fits] 이전까지는 예산 안
        let (mut fits, mut over) = (0, boundaries.len());
        while over - fits > 1 {
            let mid = fits + (over - fits) / 2;
            if self.count(&text[..boundaries[mid]]).total <= budget {
                fits = mid;
            } else {
                over = mid;
            }
        }

        let end = match boundaries.get(fits) {
            Some(&at) if self.count(&text[..at]).total <= budget => at,
            _ => 0,
        };
        &text[..end]
    }
}
