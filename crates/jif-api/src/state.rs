//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 시작 시 한 번 만들어지고 이후에는 읽기 전용입니다.
//! Arc로 래핑되어 여러 요청 간에 잠금 없이 공유됩니다.

use std::sync::Arc;

use jif_core::AuthConfig;

use crate::auth::TokenCodec;
use crate::repository::UserRepository;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러와 미들웨어에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 발급/검증기 (서명 키 보유)
    pub tokens: Arc<TokenCodec>,

    /// 사용자 저장소
    pub users: Arc<dyn UserRepository>,

    /// Authorization 헤더에서 요구하는 스킴 키워드
    pub bearer_scheme: String,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성. 스킴은 `Bearer`입니다.
    pub fn new(tokens: TokenCodec, users: Arc<dyn UserRepository>) -> Self {
        Self {
            tokens: Arc::new(tokens),
            users,
            bearer_scheme: "Bearer".to_string(),
            started_at: chrono::Utc::now(),
            version: jif_core::SERVICE_VERSION.to_string(),
        }
    }

    /// 인증 설정으로 AppState 생성.
    pub fn from_config(config: &AuthConfig, users: Arc<dyn UserRepository>) -> Self {
        Self::new(TokenCodec::from_config(config), users).with_bearer_scheme(&config.bearer_scheme)
    }

    /// Authorization 스킴 설정.
    pub fn with_bearer_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.bearer_scheme = scheme.into();
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}
