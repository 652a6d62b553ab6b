//! # Jif Core
//!
//! Jif-Tube 서비스 전반에서 공유되는 기반 타입을 제공합니다.
//!
//! - 설정 관리 (`config` 크레이트 기반 계층형 로딩)
//! - 로깅 인프라 (`tracing`)
//! - 공통 에러 타입

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::*;

/// 토큰 발급자(`iss`)와 로그에 사용되는 서비스 이름.
pub const SERVICE_NAME: &str = "Jif-Tube-API";

/// 서비스 버전.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `<서비스 이름>/<버전>` 형식의 발급자 문자열을 반환합니다.
pub fn service_issuer() -> String {
    format!("{}/{}", SERVICE_NAME, SERVICE_VERSION)
}
