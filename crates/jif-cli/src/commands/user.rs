//! 사용자 관리 명령어.
//!
//! 사용자 등록은 HTTP로 노출하지 않고 이 명령어로만 수행합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! jif user create --username alice --email alice@example.com --password 'Str0ng!Pass'
//! JIF_USER_PASSWORD='N3w!Secret' jif user set-password --id 1
//! ```

use anyhow::Result;
use tracing::info;

use jif_api::repository::{change_password, register_user, NewUser, User, UserRepository};

/// 새 사용자를 등록합니다.
pub async fn create_user(
    repo: &dyn UserRepository,
    username: String,
    email: String,
    password: &str,
) -> Result<User> {
    let user = register_user(repo, NewUser { username, email }, password).await?;
    info!(user_id = user.id, username = %user.username, "User created");
    Ok(user)
}

/// 기존 사용자의 비밀번호를 바꿉니다.
pub async fn set_password(repo: &dyn UserRepository, id: i64, password: &str) -> Result<User> {
    let user = change_password(repo, id, password).await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jif_api::repository::{InMemoryUserRepository, UserError};
    use jif_api::auth::PasswordError;

    #[tokio::test]
    async fn test_create_user_and_set_password() {
        let repo = InMemoryUserRepository::new();

        let user = create_user(
            &repo,
            "alice".to_string(),
            "alice@example.com".to_string(),
            "Str0ng!Pass",
        )
        .await
        .unwrap();
        assert_eq!(user.id, 1);
        assert!(user.check_password("Str0ng!Pass"));

        let updated = set_password(&repo, user.id, "N3w!Secret").await.unwrap();
        assert!(updated.check_password("N3w!Secret"));
        assert!(!updated.check_password("Str0ng!Pass"));
    }

    #[tokio::test]
    async fn test_create_user_rejects_weak_password() {
        let repo = InMemoryUserRepository::new();

        let err = create_user(
            &repo,
            "bob".to_string(),
            "bob@example.com".to_string(),
            "weakpass",
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<UserError>(),
            Some(UserError::Password(PasswordError::Policy(_)))
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_password_for_unknown_user() {
        let repo = InMemoryUserRepository::new();

        let err = set_password(&repo, 42, "Str0ng!Pass").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UserError>(),
            Some(UserError::NotFound(42))
        ));
    }
}
