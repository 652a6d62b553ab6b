//! 스코프 조회 endpoint.
//!
//! 인증 게이트를 통과한 요청의 스코프를 그대로 돌려줍니다.

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Identity;
use crate::state::AppState;

/// 스코프 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopesResponse {
    /// 토큰에 담긴 스코프 (순서 유지)
    pub scopes: Vec<String>,
}

/// 현재 요청의 스코프 조회.
///
/// GET /api/scopes
pub async fn get_scopes(Identity(identity): Identity) -> Json<ScopesResponse> {
    Json(ScopesResponse {
        scopes: identity.scopes,
    })
}

/// 스코프 라우터 생성. 인증 게이트는 상위에서 적용합니다.
pub fn scopes_router() -> Router<Arc<AppState>> {
    Router::new().route("/scopes", get(get_scopes))
}
