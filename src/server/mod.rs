//! HTTP server rendering pages on request

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::PageBuilder;
use crate::mail::{Enquiry, MailError, Mailer};
use crate::templates::{Banner, FormData, STYLESHEET};

const SENT_MESSAGE: &str = "Thanks! Your message has been sent.";

/// Shared state for all handlers
pub struct AppState {
    pub pages: PageBuilder,
    pub mailer: Arc<dyn Mailer>,
    pub assets_dir: PathBuf,
    /// How long the success banner stays up
    pub banner_seconds: u64,
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.assets_dir);

    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/about/", get(about))
        .route("/projects", get(projects))
        .route("/projects/", get(projects))
        .route("/blog", get(blog))
        .route("/blog/", get(blog))
        .route("/blog/:slug", get(post))
        .route("/blog/:slug/", get(post))
        .route("/contact", get(contact_page).post(contact_submit))
        .route("/contact/", get(contact_page).post(contact_submit))
        .route("/folio.css", get(stylesheet))
        .route("/healthz", get(healthz))
        .nest_service("/assets", assets)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(state: AppState, ip: &str, port: u16) -> Result<()> {
    let app = router(Arc::new(state));

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Turn a render result into a response; render errors become the 500 page
fn page(state: &AppState, result: Result<String>, status: StatusCode) -> Response {
    match result {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!("Failed to render page: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(state.pages.error_page()),
            )
                .into_response()
        }
    }
}

async fn home(State(state): State<Arc<AppState>>) -> Response {
    page(&state, state.pages.home().await, StatusCode::OK)
}

async fn about(State(state): State<Arc<AppState>>) -> Response {
    page(&state, state.pages.about().await, StatusCode::OK)
}

async fn projects(State(state): State<Arc<AppState>>) -> Response {
    page(&state, state.pages.projects().await, StatusCode::OK)
}

async fn blog(State(state): State<Arc<AppState>>) -> Response {
    page(&state, state.pages.blog().await, StatusCode::OK)
}

async fn post(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match state.pages.post(&slug).await {
        Ok(rendered) if rendered.not_found => {
            (StatusCode::NOT_FOUND, Html(rendered.html)).into_response()
        }
        Ok(rendered) => Html(rendered.html).into_response(),
        Err(err) => page(&state, Err(err), StatusCode::OK),
    }
}

async fn contact_page(State(state): State<Arc<AppState>>) -> Response {
    let result = state.pages.contact(&FormData::default(), None).await;
    page(&state, result, StatusCode::OK)
}

async fn contact_submit(
    State(state): State<Arc<AppState>>,
    Form(enquiry): Form<Enquiry>,
) -> Response {
    let submitted = FormData {
        name: enquiry.name.clone().unwrap_or_default(),
        email: enquiry.email.clone(),
        message: enquiry.message.clone().unwrap_or_default(),
    };

    let outcome = match enquiry.validate() {
        Ok(valid) => state.mailer.send(&valid).await,
        Err(err) => Err(err),
    };

    let (status, form, banner) = match outcome {
        Ok(()) => (
            StatusCode::OK,
            FormData::default(),
            Banner {
                kind: "success".to_string(),
                message: SENT_MESSAGE.to_string(),
                seconds: state.banner_seconds,
            },
        ),
        Err(err) => {
            let status = match err {
                MailError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MailError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                MailError::Rejected { .. } | MailError::Transport(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                submitted,
                Banner {
                    kind: "error".to_string(),
                    message: err.to_string(),
                    seconds: 0,
                },
            )
        }
    };

    let result = state.pages.contact(&form, Some(&banner)).await;
    page(&state, result, status)
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    page(&state, state.pages.not_found(), StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::queries::PROJECTS_QUERY;
    use crate::config::SiteConfig;
    use crate::testing::{RecordingMailer, StaticSource};
    use serde_json::json;
    use tempfile::TempDir;

    struct TestServer {
        base: String,
        http: reqwest::Client,
        _assets: TempDir,
    }

    async fn spawn(source: StaticSource, mailer: Arc<RecordingMailer>) -> TestServer {
        let assets = TempDir::new().unwrap();
        std::fs::write(assets.path().join("hello.txt"), "hi").unwrap();

        let pages = PageBuilder::new(&SiteConfig::default(), Arc::new(source)).unwrap();
        let state = AppState {
            pages,
            mailer,
            assets_dir: assets.path().to_path_buf(),
            banner_seconds: 5,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::new(state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base: format!("http://{}", addr),
            http: reqwest::Client::new(),
            _assets: assets,
        }
    }

    impl TestServer {
        async fn get(&self, path: &str) -> (u16, String) {
            let response = self
                .http
                .get(format!("{}{}", self.base, path))
                .send()
                .await
                .unwrap();
            let status = response.status().as_u16();
            (status, response.text().await.unwrap())
        }

        async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> (u16, String) {
            let response = self
                .http
                .post(format!("{}{}", self.base, path))
                .form(form)
                .send()
                .await
                .unwrap();
            let status = response.status().as_u16();
            (status, response.text().await.unwrap())
        }
    }

    #[tokio::test]
    async fn test_pages_and_static_routes() {
        let source = StaticSource::new().with(
            PROJECTS_QUERY,
            json!([{"_id": "p1", "title": "Folio"}]),
        );
        let server = spawn(source, Arc::new(RecordingMailer::new())).await;

        let (status, body) = server.get("/projects").await;
        assert_eq!(status, 200);
        assert!(body.contains("Folio"));

        let (status, _) = server.get("/projects/").await;
        assert_eq!(status, 200);

        let (status, body) = server.get("/healthz").await;
        assert_eq!((status, body.as_str()), (200, "ok"));

        let (status, body) = server.get("/folio.css").await;
        assert_eq!(status, 200);
        assert!(body.contains(".state-error"));

        let (status, body) = server.get("/assets/hello.txt").await;
        assert_eq!((status, body.as_str()), (200, "hi"));

        let (status, body) = server.get("/no/such/page").await;
        assert_eq!(status, 404);
        assert!(body.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let server = spawn(StaticSource::new(), Arc::new(RecordingMailer::new())).await;
        let (status, body) = server.get("/blog/missing").await;
        assert_eq!(status, 404);
        assert!(body.contains("Post not found"));
    }

    #[tokio::test]
    async fn test_contact_submit_success_clears_form() {
        let mailer = Arc::new(RecordingMailer::new());
        let server = spawn(StaticSource::new(), Arc::clone(&mailer)).await;

        let (status, body) = server
            .post_form(
                "/contact",
                &[
                    ("name", "Jane"),
                    ("email", "jane@example.com"),
                    ("message", "Hello there"),
                ],
            )
            .await;
        assert_eq!(status, 200);
        assert!(body.contains(SENT_MESSAGE));
        assert!(body.contains("banner-timed"));
        assert!(!body.contains("Hello there"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "jane@example.com");
        assert_eq!(sent[0].name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_contact_submit_failure_keeps_inputs() {
        let mailer = Arc::new(RecordingMailer::rejecting(429, "Too many requests today"));
        let server = spawn(StaticSource::new(), mailer).await;

        let (status, body) = server
            .post_form(
                "/contact",
                &[("email", "jane@example.com"), ("message", "Keep me")],
            )
            .await;
        assert_eq!(status, 502);
        assert!(body.contains("Too many requests today"));
        assert!(body.contains(">Keep me</textarea>"));
        assert!(body.contains("banner-error"));
    }

    #[tokio::test]
    async fn test_contact_submit_invalid_email() {
        let mailer = Arc::new(RecordingMailer::new());
        let server = spawn(StaticSource::new(), Arc::clone(&mailer)).await;

        let (status, body) = server
            .post_form("/contact", &[("email", "nope"), ("message", "x")])
            .await;
        assert_eq!(status, 422);
        assert!(body.contains("Please enter a valid email address."));
        assert!(mailer.sent().is_empty());
    }
}
