//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 발급/검증 로직.
//! 서명 키는 시작 시 설정에서 주입되며 이후 변경되지 않습니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use jif_core::AuthConfig;

/// 토큰 주체(`sub`).
///
/// 정수 ID와 문자열을 모두 허용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Id(i64),
    Name(String),
}

impl Subject {
    /// 값이 비어 있지 않은지(`0`, `""`가 아닌지) 확인.
    pub fn is_present(&self) -> bool {
        match self {
            Subject::Id(id) => *id != 0,
            Subject::Name(name) => !name.is_empty(),
        }
    }

    /// 사용자 기본 키로 해석. 정수로 해석할 수 없는 문자열이면 `None`.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Subject::Id(id) => Some(*id),
            Subject::Name(name) => name.parse().ok(),
        }
    }
}

impl From<i64> for Subject {
    fn from(id: i64) -> Self {
        Subject::Id(id)
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        Subject::Name(name.to_string())
    }
}

impl From<String> for Subject {
    fn from(name: String) -> Self {
        Subject::Name(name)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Id(id) => write!(f, "{}", id),
            Subject::Name(name) => f.write_str(name),
        }
    }
}

/// 토큰 종류. Refresh Token에만 `type` 클레임이 기록됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT 페이로드.
///
/// 모든 표준 필드는 선택적입니다. 발급 시 비어 있는 필드만 기본값으로 채워집니다.
/// 알 수 없는 클레임은 `extra`에 그대로 보존됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Subject>,
    /// Issued At (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Issuer - `<서비스 이름>/<버전>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Expiration (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// 부여된 스코프 (순서 유지)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    /// 토큰 종류
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    /// 그 밖의 클레임
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// 주체와 스코프만 지정한 Claims 생성.
    pub fn for_subject(sub: impl Into<Subject>, scopes: Vec<String>) -> Self {
        Self {
            sub: Some(sub.into()),
            scopes: Some(scopes),
            ..Default::default()
        }
    }

    /// 호출자 클레임을 기본값 위에 겹칩니다. 호출자 값이 항상 우선합니다.
    pub fn merged_over(self, defaults: Claims) -> Claims {
        let mut extra = defaults.extra;
        extra.extend(self.extra);

        Claims {
            sub: self.sub.or(defaults.sub),
            iat: self.iat.or(defaults.iat),
            iss: self.iss.or(defaults.iss),
            exp: self.exp.or(defaults.exp),
            scopes: self.scopes.or(defaults.scopes),
            token_type: self.token_type.or(defaults.token_type),
            extra,
        }
    }

    /// 스코프 목록. 없으면 빈 목록.
    pub fn scopes_or_empty(&self) -> Vec<String> {
        self.scopes.clone().unwrap_or_default()
    }

    /// Refresh Token인지 확인.
    pub fn is_refresh(&self) -> bool {
        self.token_type == Some(TokenType::Refresh)
    }
}

/// JWT 토큰 발급 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
}

/// 토큰 발급기/검증기.
///
/// 하나의 대칭 키(HS256)로 서명하고 검증합니다.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// 새 코덱 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HS256 서명 키
    /// * `issuer` - 기본 `iss` 값
    /// * `access_ttl` - Access Token 유효 시간
    /// * `refresh_ttl` - Refresh Token 유효 시간
    pub fn new(
        secret: &SecretString,
        issuer: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let key = secret.expose_secret().as_bytes();

        // 시계 오차 허용 없음. `aud`는 다른 추가 클레임처럼 그대로 전달
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// 인증 설정에서 코덱 생성. 발급자는 서비스 이름과 버전입니다.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            jif_core::service_issuer(),
            Duration::minutes(config.access_token_minutes),
            Duration::minutes(config.refresh_token_minutes),
        )
    }

    /// 기본 `iss` 값.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// 발급 시각 기준 기본 클레임.
    fn default_claims(&self, now: DateTime<Utc>, refresh: bool) -> Claims {
        let (ttl, token_type) = if refresh {
            (self.refresh_ttl, Some(TokenType::Refresh))
        } else {
            (self.access_ttl, None)
        };

        Claims {
            iat: Some(now.timestamp()),
            iss: Some(self.issuer.clone()),
            exp: Some((now + ttl).timestamp()),
            token_type,
            ..Default::default()
        }
    }

    /// 토큰 발급.
    ///
    /// 호출자가 주지 않은 `iat`, `iss`, `exp`(와 Refresh Token의 `type`)만 채운 뒤 서명합니다.
    pub fn issue(&self, claims: Claims, refresh: bool) -> Result<String, TokenError> {
        let claims = claims.merged_over(self.default_claims(Utc::now(), refresh));

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(TokenError::from)
    }

    /// 토큰 검증.
    ///
    /// 파싱 실패, 서명 불일치, 만료 중 하나라도 해당하면 `None`을 반환합니다.
    /// 실패 사유는 호출자에게 구분해서 알리지 않습니다.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "Token rejected");
                return None;
            }
        };

        // now < exp 인 동안만 유효
        match claims.exp {
            Some(exp) if exp > Utc::now().timestamp() => Some(claims),
            _ => {
                debug!("Token rejected: expired");
                None
            }
        }
    }
}
