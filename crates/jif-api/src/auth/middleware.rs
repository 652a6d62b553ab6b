//! Axum용 인증 게이트 미들웨어.
//!
//! 요청마다 다음 순서로 진행합니다:
//!
//! 1. `Authorization` 헤더 추출
//! 2. `<스킴> <토큰>` 형식과 스킴 확인
//! 3. 토큰 서명/만료 검증
//! 4. `sub` 클레임 확인
//! 5. 저장소에서 사용자 조회
//! 6. [`RequestIdentity`]를 요청 extensions에 첨부
//!
//! 어느 단계에서 실패하든 외부에는 동일한 401 응답만 보입니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ApiErrorResponse;
use crate::repository::{RepositoryError, User};
use crate::state::AppState;

/// 요청 단위 인증 정보.
///
/// 인증 게이트가 만들고 요청이 끝나면 버려집니다. 저장되지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    /// 토큰 주체에 해당하는 사용자
    pub user: Option<User>,
    /// 토큰에 담긴 스코프 (순서 유지)
    pub scopes: Vec<String>,
}

/// 인증 실패 사유.
///
/// 사유는 로그에만 남고 응답은 모두 같은 401입니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization 헤더가 없습니다")]
    MissingHeader,
    #[error("잘못된 Authorization 헤더 형식")]
    MalformedHeader,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("토큰에 주체가 없습니다")]
    MissingSubject,
    #[error("주체에 해당하는 사용자가 없습니다")]
    UnknownUser,
    #[error("사용자 조회 실패: {0}")]
    Lookup(#[source] RepositoryError),
    #[error("인증 게이트를 거치지 않은 요청")]
    MissingIdentity,
}

impl AuthError {
    /// 로그용 사유 코드.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::MissingSubject => "missing_subject",
            AuthError::UnknownUser => "unknown_user",
            AuthError::Lookup(_) => "lookup_failed",
            AuthError::MissingIdentity => "missing_identity",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiErrorResponse::new("UNAUTHENTICATED", "Unauthorized")
            .into_response_with(StatusCode::UNAUTHORIZED)
    }
}

/// 헤더에서 토큰 문자열 추출.
///
/// 첫 번째 단어가 `scheme`과 정확히 일치해야 하며, 두 번째 단어를 토큰으로 사용합니다.
/// 스킴이 일치하지 않으면 거부합니다.
pub fn extract_token<'a>(
    header: Option<&'a HeaderValue>,
    scheme: &str,
) -> Result<&'a str, AuthError> {
    let value = header
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(found), Some(token)) if found == scheme => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// 요청 헤더로 인증을 수행하고 [`RequestIdentity`]를 만듭니다.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<RequestIdentity, AuthError> {
    let token = extract_token(headers.get(AUTHORIZATION), &state.bearer_scheme)?;

    let claims = state.tokens.verify(token).ok_or(AuthError::InvalidToken)?;

    let subject = claims
        .sub
        .as_ref()
        .filter(|sub| sub.is_present())
        .ok_or(AuthError::MissingSubject)?;

    let user_id = subject.user_id().ok_or(AuthError::UnknownUser)?;

    let user = state
        .users
        .find_user_by_id(user_id)
        .await
        .map_err(AuthError::Lookup)?
        .ok_or(AuthError::UnknownUser)?;

    Ok(RequestIdentity {
        user: Some(user),
        scopes: claims.scopes.unwrap_or_default(),
    })
}

/// 인증 게이트 미들웨어 함수.
///
/// 보호할 라우트 그룹에 `route_layer`로 적용합니다.
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/scopes", get(get_scopes))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_gate));
/// ```
pub async fn auth_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = authenticate(&state, request.headers()).await;

    match result {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            debug!(
                reason = e.reason(),
                error = %e,
                path = %request.uri().path(),
                "Request rejected by auth gate"
            );
            e.into_response()
        }
    }
}

/// 인증된 요청 정보 추출기.
///
/// [`auth_gate`]가 첨부한 [`RequestIdentity`]를 꺼냅니다.
///
/// ```rust,ignore
/// async fn protected_handler(Identity(identity): Identity) -> impl IntoResponse {
///     Json(identity.scopes)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub RequestIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .map(Identity)
            .ok_or(AuthError::MissingIdentity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use secrecy::SecretString;

    use crate::auth::{Claims, TokenCodec};
    use crate::repository::{InMemoryUserRepository, UserRepository};

    const TEST_SECRET: &str = "middleware-test-secret-key-minimum-32-chars";

    struct FailingRepository;

    #[async_trait]
    impl UserRepository for FailingRepository {
        async fn find_user_by_id(&self, _id: i64) -> Result<Option<User>, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn insert_user(
            &self,
            _username: &str,
            _email: &str,
            _password_hash: &str,
        ) -> Result<User, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn update_password_hash(
            &self,
            _id: i64,
            _password_hash: &str,
        ) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(
            &SecretString::from(TEST_SECRET),
            "Jif-Tube-API/test",
            Duration::minutes(30),
            Duration::minutes(60),
        )
    }

    async fn state_with_user() -> (AppState, i64) {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .insert_user("alice", "alice@example.com", "$argon2id$placeholder")
            .await
            .unwrap();
        (AppState::new(codec(), Arc::new(repo)), user.id)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_accepts_bearer_header() {
        // 스킴이 일치해야 통과
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(extract_token(Some(&value), "Bearer").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_rejects_other_schemes() {
        for raw in ["Basic abc.def.ghi", "bearer abc.def.ghi", "Token abc"] {
            let value = HeaderValue::from_str(raw).unwrap();
            assert!(matches!(
                extract_token(Some(&value), "Bearer"),
                Err(AuthError::MalformedHeader)
            ));
        }
    }

    #[test]
    fn test_extract_token_requires_credential() {
        let value = HeaderValue::from_static("Bearer");
        assert!(matches!(
            extract_token(Some(&value), "Bearer"),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            extract_token(None, "Bearer"),
            Err(AuthError::MissingHeader)
        ));
    }

    #[test]
    fn test_extract_token_custom_scheme() {
        let value = HeaderValue::from_static("JWT abc.def.ghi");
        assert_eq!(extract_token(Some(&value), "JWT").unwrap(), "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (state, user_id) = state_with_user().await;
        let token = state
            .tokens
            .issue(
                Claims::for_subject(user_id, vec!["read".to_string(), "write".to_string()]),
                false,
            )
            .unwrap();

        let identity = authenticate(&state, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap();

        assert_eq!(identity.user.unwrap().id, user_id);
        assert_eq!(identity.scopes, vec!["read", "write"]);
    }

    #[tokio::test]
    async fn test_authenticate_string_subject() {
        let (state, user_id) = state_with_user().await;
        let token = state
            .tokens
            .issue(Claims::for_subject(user_id.to_string(), vec![]), false)
            .unwrap();

        let identity = authenticate(&state, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap();
        assert_eq!(identity.user.unwrap().id, user_id);
    }

    #[tokio::test]
    async fn test_authenticate_missing_scopes_default_to_empty() {
        let (state, user_id) = state_with_user().await;
        let claims = Claims {
            sub: Some(user_id.into()),
            ..Default::default()
        };
        let token = state.tokens.issue(claims, false).unwrap();

        let identity = authenticate(&state, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap();
        assert!(identity.scopes.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_rejections() {
        let (state, _) = state_with_user().await;

        let no_sub = state.tokens.issue(Claims::default(), false).unwrap();
        let zero_sub = state
            .tokens
            .issue(Claims::for_subject(0_i64, vec![]), false)
            .unwrap();
        let unknown = state
            .tokens
            .issue(Claims::for_subject(999_i64, vec![]), false)
            .unwrap();
        let name_sub = state
            .tokens
            .issue(Claims::for_subject("alice", vec![]), false)
            .unwrap();

        let cases = [
            (HeaderMap::new(), "missing_header"),
            (headers_with("Bearer not-a-token"), "invalid_token"),
            (headers_with(&format!("Bearer {}", no_sub)), "missing_subject"),
            (headers_with(&format!("Bearer {}", zero_sub)), "missing_subject"),
            (headers_with(&format!("Bearer {}", unknown)), "unknown_user"),
            (headers_with(&format!("Bearer {}", name_sub)), "unknown_user"),
        ];

        for (headers, reason) in cases {
            let err = authenticate(&state, &headers).await.unwrap_err();
            assert_eq!(err.reason(), reason);
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_maps_to_unauthenticated() {
        let state = AppState::new(codec(), Arc::new(FailingRepository));
        let token = state
            .tokens
            .issue(Claims::for_subject(1_i64, vec![]), false)
            .unwrap();

        let err = authenticate(&state, &headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Lookup(_)));
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_all_rejections_share_status() {
        let errors = vec![
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
            AuthError::InvalidToken,
            AuthError::MissingSubject,
            AuthError::UnknownUser,
            AuthError::Lookup(RepositoryError::Unavailable("down".to_string())),
            AuthError::MissingIdentity,
        ];

        for error in errors {
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
