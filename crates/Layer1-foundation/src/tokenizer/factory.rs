//! Tokenizer Factory - 설정 이름으로 토크나이저 생성

use super::estimator::{CharEstimator, LanguageAwareEstimator};
use super::traits::Tokenizer;
use super::types::TokenizerType;
use crate::{Error, Result};
use std::sync::Arc;

/// 토크나이저 팩토리
///
/// 설정 파일의 `tokenizer` 값을 구현체로 변환합니다.
/// `Custom`은 호출자가 직접 `FnTokenizer` 등을 넘겨야 하므로 만들 수 없습니다.
pub struct TokenizerFactory;

impl TokenizerFactory {
    /// 타입으로 토크나이저 생성
    pub fn create(tokenizer_type: TokenizerType) -> Result<Arc<dyn Tokenizer>> {
        match tokenizer_type {
            TokenizerType::Characters => Ok(Arc::new(CharEstimator::new())),
            TokenizerType::LanguageAware => Ok(Arc::new(LanguageAwareEstimator::new())),
            TokenizerType::Custom => Err(Error::Config(
                "custom tokenizers must be supplied by the caller".to_string(),
            )),
        }
    }

    /// 이름으로 토크나이저 생성
    pub fn from_name(name: &str) -> Result<Arc<dyn Tokenizer>> {
        Self::create(name.parse()?)
    }

    /// 기본 토크나이저 (문자 기반)
    pub fn default_tokenizer() -> Arc<dyn Tokenizer> {
        Arc::new(CharEstimator::new())
    }
}
