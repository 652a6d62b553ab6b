//! Jif-Tube REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (`/api`)
//! - JWT 발급/검증과 요청별 인증 게이트
//! - 비밀번호 복잡도 정책과 해싱
//! - SPA 정적 번들 호스팅
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증과 비밀번호 정책
//! - [`repository`]: 사용자 저장소
//! - [`spa`]: 정적 번들과 클라이언트 라우팅

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod spa;
pub mod state;

pub use auth::{
    auth_gate, hash_password, verify_password, AuthError, Claims, Identity, RequestIdentity,
    Subject, TokenCodec, TokenError,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use repository::{
    InMemoryUserRepository, PgUserRepository, RepositoryError, User, UserRepository,
};
pub use routes::*;
pub use spa::{SpaAssets, SpaError};
pub use state::AppState;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

/// 전체 애플리케이션 라우터 생성.
///
/// `/api` 아래는 API 라우터가, 나머지 경로는 SPA 미들웨어가 처리합니다.
pub fn create_app(state: Arc<AppState>, assets: SpaAssets) -> Router {
    Router::new()
        .nest(routes::API_PREFIX, routes::create_api_router(state))
        .fallback(routes::api_not_found)
        .layer(middleware::from_fn_with_state(
            Arc::new(assets),
            spa::spa_fallback,
        ))
        .layer(TraceLayer::new_for_http())
}
