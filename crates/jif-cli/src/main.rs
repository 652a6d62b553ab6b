//! Jif-Tube 운영 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 스키마 초기화
//! jif db init
//!
//! # 사용자 등록
//! jif user create -u alice -e alice@example.com -p 'Str0ng!Pass'
//!
//! # 비밀번호 변경
//! jif user set-password --id 1 -p 'N3w!Secret'
//!
//! # 토큰 발급/검증
//! jif token issue --sub 1 --scope read --scope write
//! jif token verify <TOKEN>
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;

use jif_api::auth::TokenCodec;
use jif_cli::commands::{db, token, user};
use jif_core::{init_logging, AppConfig, JifError, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "jif")]
#[command(about = "Jif-Tube CLI - 스키마, 사용자, 토큰 관리", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml, 있을 때만)
    #[arg(short, long, global = true, env = "JIF_CONFIG")]
    config: Option<PathBuf>,

    /// 로그 레벨
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 데이터베이스 관리
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// 사용자 관리
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// 토큰 발급/검증
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// users 테이블 생성
    Init {
        /// 데이터베이스 URL
        #[arg(long, env = "JIF__DATABASE__URL")]
        db_url: String,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// 새 사용자 등록
    Create {
        /// 사용자 이름
        #[arg(short, long)]
        username: String,

        /// 이메일
        #[arg(short, long)]
        email: String,

        /// 비밀번호 (복잡도 정책 적용)
        #[arg(short, long, env = "JIF_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// 데이터베이스 URL
        #[arg(long, env = "JIF__DATABASE__URL")]
        db_url: String,
    },

    /// 비밀번호 변경
    SetPassword {
        /// 사용자 ID
        #[arg(long)]
        id: i64,

        /// 새 비밀번호 (복잡도 정책 적용)
        #[arg(short, long, env = "JIF_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// 데이터베이스 URL
        #[arg(long, env = "JIF__DATABASE__URL")]
        db_url: String,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// 토큰 발급
    Issue {
        /// 주체 (정수면 사용자 ID)
        #[arg(long)]
        sub: String,

        /// 부여할 스코프 (여러 번 지정 가능, 순서 유지)
        #[arg(long = "scope")]
        scopes: Vec<String>,

        /// Refresh Token 발급
        #[arg(long, default_value = "false")]
        refresh: bool,
    },

    /// 토큰 검증 후 클레임 출력
    Verify {
        /// 검증할 토큰
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(LogConfig::new(&cli.log_level).with_format(LogFormat::Compact))?;

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Db {
            command: DbCommands::Init { db_url },
        } => {
            db::init_db(&db_url).await?;
            println!("스키마 초기화 완료");
        }

        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                email,
                password,
                db_url,
            } => {
                let repo = db::init_db(&db_url).await?;
                let created = user::create_user(&repo, username, email, &password).await?;
                println!("사용자 등록 완료: id={} username={}", created.id, created.username);
            }
            UserCommands::SetPassword {
                id,
                password,
                db_url,
            } => {
                let repo = db::init_db(&db_url).await?;
                user::set_password(&repo, id, &password).await?;
                println!("비밀번호 변경 완료: id={}", id);
            }
        },

        Commands::Token { command } => {
            let codec = load_codec(cli.config)?;

            match command {
                TokenCommands::Issue {
                    sub,
                    scopes,
                    refresh,
                } => {
                    println!("{}", token::issue_token(&codec, &sub, scopes, refresh)?);
                }
                TokenCommands::Verify { token: raw } => {
                    let claims = token::verify_token(&codec, &raw)?;
                    println!("{}", serde_json::to_string_pretty(&claims)?);
                    if let Some(expires_at) = token::format_expiry(&claims) {
                        println!("만료: {}", expires_at);
                    }
                }
            }
        }
    }

    Ok(())
}

/// 서버와 같은 설정으로 토큰 코덱 생성.
fn load_codec(path: Option<PathBuf>) -> Result<TokenCodec> {
    let config = match path {
        Some(path) => AppConfig::load(Some(path.as_path())),
        None => AppConfig::load_default(),
    }
    .map_err(JifError::from)
    .context("Failed to load configuration (auth.jwt_secret is required)")?;

    Ok(TokenCodec::from_config(&config.auth))
}
