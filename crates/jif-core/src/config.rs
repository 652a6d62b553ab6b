//! 설정 관리.
//!
//! 기본값, 선택적 TOML 파일, `JIF__` 접두사 환경 변수 순서로 설정을 합성합니다.
//!
//! ```text
//! JIF__SERVER__PORT=8080
//! JIF__AUTH__JWT_SECRET=...
//! JIF__STATIC_FILES__ROOT=./web/dist
//! ```

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// SPA 정적 파일 설정
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 연결 URL. 없으면 메모리 저장소를 사용합니다.
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }
}

/// 인증 설정.
///
/// 서명 키는 프로세스 시작 시 한 번 로드되며 실행 중에는 바뀌지 않습니다.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HS256 서명 키
    pub jwt_secret: SecretString,
    /// Access Token 유효 시간 (분)
    #[serde(default = "default_access_minutes")]
    pub access_token_minutes: i64,
    /// Refresh Token 유효 시간 (분)
    #[serde(default = "default_refresh_minutes")]
    pub refresh_token_minutes: i64,
    /// Authorization 헤더의 스킴 키워드
    #[serde(default = "default_bearer_scheme")]
    pub bearer_scheme: String,
}

fn default_access_minutes() -> i64 {
    30
}

fn default_refresh_minutes() -> i64 {
    60
}

fn default_bearer_scheme() -> String {
    "Bearer".to_string()
}

impl AuthConfig {
    /// 기본 유효 시간과 스킴으로 설정을 생성합니다.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::from(secret.into()),
            access_token_minutes: default_access_minutes(),
            refresh_token_minutes: default_refresh_minutes(),
            bearer_scheme: default_bearer_scheme(),
        }
    }
}

/// SPA 정적 파일 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 정적 번들 루트 디렉토리
    pub root: PathBuf,
    /// 알 수 없는 클라이언트 경로에 제공할 인덱스 문서 (루트 기준 상대 경로)
    pub index: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
            index: PathBuf::from("index.html"),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 선택적 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 주어지지 않으면 기본값과 환경 변수만 사용합니다.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("static_files.root", "static")?
            .set_default("static_files.index", "index.html")?;

        // 파일에서 로드
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        // 환경 변수로 오버라이드
        let builder = builder.add_source(
            config::Environment::with_prefix("JIF")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// 기본 경로(`config/default.toml`, 있을 때만)와 환경 변수에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            Self::load(Some(default_path))
        } else {
            Self::load(None)
        }
    }
}
