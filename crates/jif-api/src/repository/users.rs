//! Users Repository
//!
//! 사용자(자격증명) 레코드 조회와 등록, 비밀번호 변경을 담당합니다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use validator::Validate;

use jif_core::DatabaseConfig;

use super::RepositoryError;
use crate::auth::password::{hash_with_policy, verify_password, PasswordError};

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 레코드.
///
/// `password_hash`는 [`User::set_password`]로만 만들어지며 원본 비밀번호는 저장하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// 복잡도를 검증한 뒤 비밀번호를 해싱해 저장합니다.
    ///
    /// 실패하면 기존 해시는 그대로 남습니다.
    pub fn set_password(&mut self, raw_password: &str) -> Result<(), PasswordError> {
        self.password_hash = hash_with_policy(raw_password)?;
        Ok(())
    }

    /// 평문 비밀번호를 저장된 해시와 비교합니다.
    pub fn check_password(&self, raw_password: &str) -> bool {
        verify_password(raw_password, &self.password_hash)
    }
}

/// 새 사용자 입력
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 64, message = "사용자 이름은 1-64자여야 합니다"))]
    pub username: String,
    #[validate(email(message = "올바른 이메일 주소가 아닙니다"))]
    pub email: String,
}

/// 사용자 등록/변경 에러.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("입력 검증 실패: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("사용자를 찾을 수 없습니다: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ================================================================================================
// Repository trait
// ================================================================================================

/// 사용자 저장소.
///
/// 인증 경로에서는 요청당 [`UserRepository::find_user_by_id`]만 한 번 호출됩니다.
/// 각 호출은 자체 연결을 획득하고 반환합니다.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 기본 키로 사용자 조회. 없으면 `Ok(None)`.
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;

    /// 해시가 이미 계산된 사용자 레코드 저장.
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    /// 비밀번호 해시 교체. 대상이 없으면 `false`.
    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, RepositoryError>;

    /// 연결 상태 확인.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// 저장소 종류 (헬스 체크 표시용)
    fn backend(&self) -> &'static str;
}

/// 사용자 등록.
///
/// 입력과 비밀번호 복잡도를 검증하고 해싱한 뒤 저장합니다.
pub async fn register_user(
    repo: &dyn UserRepository,
    input: NewUser,
    raw_password: &str,
) -> Result<User, UserError> {
    input.validate()?;
    let password_hash = hash_with_policy(raw_password)?;

    let user = repo
        .insert_user(&input.username, &input.email, &password_hash)
        .await?;

    info!(user_id = user.id, "User registered");
    Ok(user)
}

/// 비밀번호 변경.
pub async fn change_password(
    repo: &dyn UserRepository,
    id: i64,
    raw_password: &str,
) -> Result<User, UserError> {
    let mut user = repo
        .find_user_by_id(id)
        .await?
        .ok_or(UserError::NotFound(id))?;

    user.set_password(raw_password)?;

    if !repo.update_password_hash(id, &user.password_hash).await? {
        return Err(UserError::NotFound(id));
    }

    info!(user_id = id, "Password changed");
    Ok(user)
}

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// PostgreSQL 사용자 저장소
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 설정으로 연결 풀을 만들고 연결을 확인합니다.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await?;

        let repo = Self::new(pool);
        repo.ping().await?;
        Ok(repo)
    }

    /// `users` 테이블이 없으면 생성합니다.
    pub async fn init_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ================================================================================================
// In-memory
// ================================================================================================

/// 메모리 사용자 저장소.
///
/// 데이터베이스 없이 개발하거나 테스트할 때 사용합니다. 프로세스 종료 시 내용이 사라집니다.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<i64, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        let id = users.keys().max().copied().unwrap_or(0) + 1;

        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
