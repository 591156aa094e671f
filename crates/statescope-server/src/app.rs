//! HTTP routing and handlers.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use statescope_search::{SearchResult, search};
use statescope_vfs::BackendList;

use crate::view::{self, SearchView};

/// Embedded stylesheet.
const STYLESHEET: &str = include_str!("../assets/style.css");

#[derive(Clone)]
struct AppState {
    backends: Arc<BackendList>,
}

/// Build the application router over the given backend registry.
pub fn build_router(backends: Arc<BackendList>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/search", get(search_handler))
        .route("/style.css", get(stylesheet_handler))
        .with_state(AppState { backends })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    backend: Option<String>,
    spath: Option<String>,
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(view::render_index(&state.backends.names()))
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let backend_names: Vec<String> = state
        .backends
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();

    // Absent or empty parameters fall back to the root path and the first
    // registered backend.
    let spath = params
        .spath
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ".".to_string());
    let backend = params
        .backend
        .filter(|b| !b.is_empty())
        .or_else(|| backend_names.first().cloned())
        .unwrap_or_default();

    info!(backend = %backend, spath = %spath, "searching");

    let mut page = SearchView {
        backend_names,
        selected_backend: backend.clone(),
        spath: spath.clone(),
        error: None,
        result: SearchResult::default(),
    };

    match state.backends.get(&backend) {
        None => {
            page.error = Some(format!("backend \"{backend}\" not found"));
        }
        Some(fs) => match search(fs.as_ref(), &spath, &backend).await {
            Ok(result) => page.result = result,
            Err(err) => {
                warn!(error = %err, "failed to execute search");
                page.error = Some(err.to_string());
            }
        },
    }

    Html(page.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use statescope_vfs::MemoryBackend;
    use tower::ServiceExt;

    const PROD_STATE: &str =
        r#"{"outputs":{"vpc_id":{"value":"vpc-123"}},"terraform_version":"1.5.0"}"#;

    fn test_router() -> Router {
        let be_1 = MemoryBackend::new();
        be_1.add_dir("infra/network");
        be_1.add_file("infra/prod.tfstate", PROD_STATE);

        let be_2 = MemoryBackend::new();
        be_2.add_dir("other");

        let mut backends = BackendList::new();
        backends.add("be_1", Arc::new(be_1));
        backends.add("be_2", Arc::new(be_2));
        build_router(Arc::new(backends))
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_search_defaults_to_first_backend_and_root() {
        let (status, body) = get_body(test_router(), "/search").await;
        assert_eq!(status, StatusCode::OK);
        // Root of be_1 contains the infra subdirectory.
        assert!(body.contains("/search?backend=be_1&amp;spath=infra"));
        assert!(!body.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn test_search_renders_outputs() {
        let (status, body) =
            get_body(test_router(), "/search?backend=be_1&spath=infra").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("terraform version 1.5.0"));
        assert!(body.contains("vpc_id"));
        assert!(body.contains("vpc-123"));
        assert!(body.contains("/search?backend=be_1&amp;spath=infra%2Fnetwork"));
    }

    #[tokio::test]
    async fn test_unknown_backend_keeps_navigation() {
        let (status, body) = get_body(test_router(), "/search?backend=nope").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("backend &quot;nope&quot; not found"));
        // All names still render so the operator can navigate away.
        assert!(body.contains("be_1"));
        assert!(body.contains("be_2"));
    }

    #[tokio::test]
    async fn test_search_error_renders_message() {
        let (status, body) =
            get_body(test_router(), "/search?backend=be_2&spath=missing").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("class=\"error\""));
        assert!(body.contains("could not read path contents"));
    }

    #[tokio::test]
    async fn test_index_lists_backends() {
        let (status, body) = get_body(test_router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/search?backend=be_1\""));
        assert!(body.contains("href=\"/search?backend=be_2\""));
    }

    #[tokio::test]
    async fn test_stylesheet_served() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/style.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
    }
}
