//! Storage module for Keel
//!
//! - `json`: JSON - 설정 파일 로드 (세션 상태는 저장하지 않음)

mod json;

pub use json::JsonStore;
