//! 서비스 공통 에러 타입.
//!
//! 시작 단계(설정, 로깅, 사용자 저장소 연결, 정적 파일 루트)에서 발생하는 에러를 정의합니다.
//! 요청 단위 에러는 각 모듈(`jif-api`의 auth, repository 등)이 따로 정의합니다.

use thiserror::Error;

/// 서비스 시작 에러.
#[derive(Debug, Error)]
pub enum JifError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 에러
    #[error("로깅 에러: {0}")]
    Logging(String),

    /// 데이터베이스 연결 또는 스키마 초기화 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 정적 파일 루트 에러
    #[error("정적 파일 에러: {0}")]
    StaticFiles(String),
}

/// 공통 Result 타입.
pub type JifResult<T> = Result<T, JifError>;

impl From<config::ConfigError> for JifError {
    fn from(err: config::ConfigError) -> Self {
        JifError::Config(err.to_string())
    }
}
