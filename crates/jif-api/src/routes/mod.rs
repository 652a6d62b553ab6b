//! API 라우트.
//!
//! `/api` 아래 모든 REST 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/api/health` - 헬스 체크 (liveness)
//! - `/api/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/scopes` - 인증된 요청의 스코프 (인증 필요)
//!
//! 매핑되지 않은 `/api/*` 경로는 JSON 404를 받으며 SPA 인덱스로 넘어가지 않습니다.

pub mod health;
pub mod scopes;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use scopes::{scopes_router, ScopesResponse};

use axum::{http::StatusCode, middleware, response::Response, Router};
use std::sync::Arc;

use crate::auth::auth_gate;
use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// API 경로 접두사.
pub const API_PREFIX: &str = "/api";

/// 매핑되지 않은 API 경로 응답.
pub async fn api_not_found() -> Response {
    ApiErrorResponse::new("NOT_FOUND", "API route not found")
        .into_response_with(StatusCode::NOT_FOUND)
}

/// 전체 API 라우터 생성 (`/api` 기준 상대 경로).
///
/// 보호 라우트 그룹에는 인증 게이트가 `route_layer`로 적용되므로
/// 매칭된 라우트에서만 인증이 수행됩니다.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let protected = scopes_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_gate));

    Router::new()
        .nest("/health", health_router())
        .merge(protected)
        .fallback(api_not_found)
        .with_state(state)
}
