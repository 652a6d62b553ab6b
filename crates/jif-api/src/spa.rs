//! SPA(single-page application) 정적 번들 호스팅.
//!
//! 같은 리스너에서 API 네임스페이스와 정적 번들을 함께 제공합니다.
//!
//! 경로별 처리 순서:
//! 1. `/api` 또는 `/api/...` → API 라우터로 위임
//! 2. 루트 아래 실제 파일 → 정적 파일 응답
//! 3. 그 외 (클라이언트 라우팅 경로) → 인덱스 문서, 200
//!
//! 루트와 인덱스 문서는 시작 시 한 번 정규화되며, 실패하면 서버를 시작하지 않습니다.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, info};

use jif_core::{JifError, StaticFilesConfig};

use crate::routes::API_PREFIX;

/// SPA 자산 설정 에러. 시작 단계에서만 발생합니다.
#[derive(Debug, thiserror::Error)]
pub enum SpaError {
    #[error("정적 파일 루트를 찾을 수 없습니다: {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("정적 파일 루트가 디렉토리가 아닙니다: {0}")]
    RootNotDirectory(PathBuf),
    #[error("인덱스 문서를 찾을 수 없습니다: {path}: {source}")]
    IndexUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("인덱스 문서가 루트 밖에 있거나 파일이 아닙니다: {0}")]
    IndexOutsideRoot(PathBuf),
}

impl From<SpaError> for JifError {
    fn from(err: SpaError) -> Self {
        JifError::StaticFiles(err.to_string())
    }
}

/// 정규화된 정적 파일 루트와 인덱스 문서.
#[derive(Debug, Clone)]
pub struct SpaAssets {
    root: PathBuf,
    index: PathBuf,
}

impl SpaAssets {
    /// 루트 디렉토리와 (루트 기준) 인덱스 파일 이름으로 생성.
    pub fn new(root: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<Self, SpaError> {
        let root_path = root.as_ref();
        let root = std::fs::canonicalize(root_path).map_err(|source| SpaError::RootUnavailable {
            path: root_path.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(SpaError::RootNotDirectory(root));
        }

        let index_path = root.join(index.as_ref());
        let index =
            std::fs::canonicalize(&index_path).map_err(|source| SpaError::IndexUnavailable {
                path: index_path.clone(),
                source,
            })?;
        if !index.starts_with(&root) || !index.is_file() {
            return Err(SpaError::IndexOutsideRoot(index));
        }

        info!(root = %root.display(), index = %index.display(), "SPA assets configured");
        Ok(Self { root, index })
    }

    /// 설정으로 생성.
    pub fn from_config(config: &StaticFilesConfig) -> Result<Self, SpaError> {
        Self::new(&config.root, &config.index)
    }

    /// 정규화된 루트.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 정규화된 인덱스 문서 경로.
    pub fn index(&self) -> &Path {
        &self.index
    }

    /// API 네임스페이스 경로인지 확인. 세그먼트 단위로 비교합니다.
    pub fn is_api_path(path: &str) -> bool {
        path == API_PREFIX
            || path
                .strip_prefix(API_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// 요청 경로를 루트 안의 실제 파일로 해석.
    ///
    /// 세그먼트마다 퍼센트 디코딩한 뒤 일반 세그먼트만 허용하고(`..`, `.`, `/` 포함 거부),
    /// 정규화 결과가 루트 밖이거나 일반 파일이 아니면 `None`.
    pub async fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let mut candidate = self.root.clone();

        for raw in request_path.split('/').filter(|s| !s.is_empty()) {
            let segment = percent_decode_str(raw).decode_utf8().ok()?;
            let mut components = Path::new(segment.as_ref()).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => candidate.push(part),
                _ => return None,
            }
        }

        let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;
        if !resolved.starts_with(&self.root) {
            return None;
        }

        let metadata = tokio::fs::metadata(&resolved).await.ok()?;
        metadata.is_file().then_some(resolved)
    }
}

/// 파일 하나를 요청에 대한 응답으로 제공합니다.
async fn serve_file(path: &Path, request: Request) -> Response {
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}

/// SPA 라우팅 미들웨어 함수.
///
/// 최상위 라우터에 `layer`로 적용합니다. API 경로가 아니면 내부 라우터를 호출하지 않습니다.
pub async fn spa_fallback(
    State(assets): State<Arc<SpaAssets>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if SpaAssets::is_api_path(&path) {
        return next.run(request).await;
    }

    match assets.resolve(&path).await {
        Some(file) => serve_file(&file, request).await,
        None => {
            debug!(path = %path, "Serving SPA index for client route");
            serve_file(assets.index(), request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html>index</html>").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets").join("app.js"), "console.log(1)").unwrap();
        dir
    }

    #[test]
    fn test_is_api_path() {
        assert!(SpaAssets::is_api_path("/api"));
        assert!(SpaAssets::is_api_path("/api/"));
        assert!(SpaAssets::is_api_path("/api/scopes"));
        assert!(SpaAssets::is_api_path("/api/anything-unmapped"));

        assert!(!SpaAssets::is_api_path("/"));
        assert!(!SpaAssets::is_api_path("/apidocs"));
        assert!(!SpaAssets::is_api_path("/dashboard/api"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let result = SpaAssets::new("/definitely/not/a/real/root", "index.html");
        assert!(matches!(result, Err(SpaError::RootUnavailable { .. })));
    }

    #[test]
    fn test_missing_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = SpaAssets::new(dir.path(), "index.html");
        assert!(matches!(result, Err(SpaError::IndexUnavailable { .. })));
    }

    #[test]
    fn test_spa_error_is_static_files_startup_error() {
        let err: JifError = SpaAssets::new("/definitely/not/a/real/root", "index.html")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            JifError::StaticFiles(ref msg) if msg.contains("/definitely/not/a/real/root")
        ));
    }

    #[test]
    fn test_index_outside_root_is_fatal() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.html"), "secret").unwrap();
        let root = outer.path().join("dist");
        fs::create_dir(&root).unwrap();

        let result = SpaAssets::new(&root, "../secret.html");
        assert!(matches!(result, Err(SpaError::IndexOutsideRoot(_))));
    }

    #[tokio::test]
    async fn test_resolve_existing_file() {
        let dir = bundle();
        let assets = SpaAssets::new(dir.path(), "index.html").unwrap();

        let resolved = assets.resolve("/assets/app.js").await.unwrap();
        assert!(resolved.ends_with("assets/app.js"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_unknown_and_directories() {
        let dir = bundle();
        let assets = SpaAssets::new(dir.path(), "index.html").unwrap();

        assert!(assets.resolve("/dashboard/42").await.is_none());
        assert!(assets.resolve("/assets").await.is_none());
        assert!(assets.resolve("/").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("dist");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("index.html"), "index").unwrap();

        let assets = SpaAssets::new(&root, "index.html").unwrap();
        assert!(assets.resolve("/../secret.txt").await.is_none());
        assert!(assets.resolve("/./index.html").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_decodes_percent_encoded_segments() {
        let dir = bundle();
        fs::write(dir.path().join("my font.woff2"), "FONT").unwrap();
        fs::write(dir.path().join("assets").join("로고.svg"), "<svg/>").unwrap();
        let assets = SpaAssets::new(dir.path(), "index.html").unwrap();

        let font = assets.resolve("/my%20font.woff2").await.unwrap();
        assert!(font.ends_with("my font.woff2"));

        let logo = assets
            .resolve("/assets/%EB%A1%9C%EA%B3%A0.svg")
            .await
            .unwrap();
        assert!(logo.ends_with("assets/로고.svg"));

        // 잘못된 UTF-8 시퀀스
        assert!(assets.resolve("/%FF%FE").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_encoded_traversal() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("dist");
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(root.join("index.html"), "index").unwrap();
        fs::write(root.join("assets").join("app.js"), "app").unwrap();

        let assets = SpaAssets::new(&root, "index.html").unwrap();
        assert!(assets.resolve("/%2e%2e/secret.txt").await.is_none());
        assert!(assets.resolve("/%2E%2E%2Fsecret.txt").await.is_none());
        assert!(assets.resolve("/assets%2Fapp.js").await.is_none());
        assert!(assets.resolve("/%2e/index.html").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_rejects_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("dist");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("index.html"), "index").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("leak.txt")).unwrap();

        let assets = SpaAssets::new(&root, "index.html").unwrap();
        assert!(assets.resolve("/leak.txt").await.is_none());
    }
}
