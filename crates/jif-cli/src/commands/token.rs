//! 토큰 명령어.
//!
//! 서버와 같은 설정(서명 키, 유효 시간)으로 토큰을 발급하거나 검증합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 사용자 1에게 read/write 스코프 Access Token 발급
//! jif token issue --sub 1 --scope read --scope write
//!
//! # Refresh Token 발급
//! jif token issue --sub 1 --refresh
//!
//! # 토큰 내용 확인
//! jif token verify eyJhbGciOi...
//! ```

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};

use jif_api::auth::{Claims, Subject, TokenCodec};

/// `--sub` 값 해석. 정수면 사용자 ID, 아니면 문자열 주체입니다.
pub fn parse_subject(raw: &str) -> Subject {
    match raw.parse::<i64>() {
        Ok(id) => Subject::Id(id),
        Err(_) => Subject::Name(raw.to_string()),
    }
}

/// 토큰 발급.
pub fn issue_token(
    codec: &TokenCodec,
    sub: &str,
    scopes: Vec<String>,
    refresh: bool,
) -> Result<String> {
    let claims = Claims::for_subject(parse_subject(sub), scopes);
    Ok(codec.issue(claims, refresh)?)
}

/// 토큰 검증. 실패 사유는 구분하지 않습니다.
pub fn verify_token(codec: &TokenCodec, token: &str) -> Result<Claims> {
    codec
        .verify(token)
        .ok_or_else(|| anyhow!("Token is invalid or expired"))
}

/// 만료 시각을 사람이 읽는 형식으로.
pub fn format_expiry(claims: &Claims) -> Option<String> {
    claims
        .exp
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
        .map(|at| at.to_rfc3339())
}
