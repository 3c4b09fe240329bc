//! Tokenizer Module - 토큰 비용 추정
//!
//! 컨텍스트 비용은 근사치로 충분합니다. 추정기는 교체 가능하며
//! 기본값은 문자 수 기반 휴리스틱(4자 = 1토큰)입니다.
//!
//! | 구현체 | 방식 |
//! |--------|------|
//! | `CharEstimator` | `ceil(chars / 4)` |
//! | `LanguageAwareEstimator` | ASCII / CJK / 기타 유니코드 비율 |
//! | `FnTokenizer` | 호출자 제공 클로저 |
//!
//! ## 사용법
//!
//! ```ignore
//! use keel_foundation::tokenizer::{CharEstimator, Tokenizer};
//!
//! let tokenizer = CharEstimator::new();
//! assert_eq!(tokenizer.count(&"x".repeat(100)).total, 25);
//! ```

mod estimator;
mod factory;
mod traits;
mod types;

pub use estimator::{CharEstimator, FnTokenizer, LanguageAwareEstimator};
pub use factory::TokenizerFactory;
pub use traits::Tokenizer;
pub use types::{TokenCount, TokenDistribution, TokenizerType};
