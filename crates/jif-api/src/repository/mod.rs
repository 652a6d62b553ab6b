//! Repository 패턴을 사용한 데이터베이스 연산.
//!
//! 인증 계층이 의존하는 외부 협력자(사용자 조회)를 트레이트로 분리합니다.

pub mod users;

pub use users::{
    change_password, register_user, InMemoryUserRepository, NewUser, PgUserRepository, User,
    UserError, UserRepository,
};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),
    #[error("저장소를 사용할 수 없습니다: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for jif_core::JifError {
    fn from(err: RepositoryError) -> Self {
        jif_core::JifError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jif_core::JifError;

    #[test]
    fn test_repository_error_is_database_startup_error() {
        let err: JifError = RepositoryError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(err, JifError::Database(ref msg) if msg.contains("connection refused")));
    }
}
