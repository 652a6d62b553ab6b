//! 운영 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 데이터베이스 스키마 초기화
//! - 사용자 등록 및 비밀번호 변경
//! - 토큰 발급/검증

pub mod commands;
