//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 스코프 전달을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`password`]: 비밀번호 복잡도 정책과 Argon2 해싱
//! - [`TokenCodec`]: 토큰 발급/검증
//! - [`auth_gate`]: 요청별 인증 미들웨어
//! - [`Identity`]: 인증된 요청 정보 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     Identity(identity): Identity,
//! ) -> impl IntoResponse {
//!     Json(identity.scopes)
//! }
//! ```

mod jwt;
mod middleware;
pub mod password;

pub use jwt::{Claims, Subject, TokenCodec, TokenError, TokenType};
pub use middleware::{auth_gate, authenticate, extract_token, AuthError, Identity, RequestIdentity};
pub use password::{
    hash_password, hash_with_policy, validate_complexity, verify_password, PasswordError,
    PolicyError,
};
