// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use futures::stream::{self, StreamExt};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::task::LocalPoolHandle;
use tower::ServiceExt;

use ogp_embed::ogp::{CacheFront, CacheStore, MemoryStore, OgpFetcher};
use ogp_embed::state::AppState;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A request observed by the fixture origin.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub user_agent: Option<String>,
}

/// Local HTTP server standing in for remote pages and their resources.
pub struct Origin {
    pub base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Origin {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn hits(&self, method: Method, path: &str) -> usize {
        self.seen()
            .iter()
            .filter(|s| s.method == method && s.path == path)
            .count()
    }
}

const PAGE: &str = r#"<!doctype html>
<html><head>
<meta charset="utf-8">
<title>Fixture</title>
<meta property="og:title" content="Fixture Page">
<meta property="og:description" content="A page used in tests">
<meta property="og:image" content="/img/ok.png">
<meta property="og:url" content="/page">
<meta property="og:site_name" content="Fixture Site">
<meta property="og:type" content="website">
<link rel="stylesheet" href="/style.css">
<link rel="shortcut icon" href="/favicon.ico">
</head><body><p>Hello</p></body></html>"#;

const BROKEN_RESOURCES: &str = r#"<html><head>
<meta property="og:title" content="Broken Resources">
<meta property="og:image" content="/img/missing.png">
<link rel="icon" href="/favicon.ico">
</head></html>"#;

const BROKEN_FAVICON: &str = r#"<html><head>
<meta property="og:image" content="/img/ok.png">
<link rel="icon" href="/missing.ico">
</head></html>"#;

const DUPLICATES: &str = r#"<html><head>
<meta property="og:title" content="First">
<meta property="og:title" content="Second">
</head></html>"#;

/// `<meta property="og:title" content="テスト">` in Shift_JIS.
const SHIFT_JIS_PAGE: &[u8] =
    b"<html><head><meta property=\"og:title\" content=\"\x83e\x83X\x83g\"></head></html>";

const STREAMED_HEAD: &str = r#"<html><head><meta property="og:title" content="Streamed">"#;

fn html(body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response()
}

/// Sends `STREAMED_HEAD` immediately; `rest` decides what follows.
fn streamed<S>(rest: S) -> Response
where
    S: futures::Stream<Item = Result<&'static str, std::io::Error>> + Send + 'static,
{
    let chunks = stream::iter([Ok(STREAMED_HEAD)]).chain(rest);
    (
        [(header::CONTENT_TYPE, "text/html")],
        Body::from_stream(chunks),
    )
        .into_response()
}

fn png() -> Response {
    ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G']).into_response()
}

async fn record(State(seen): State<Arc<Mutex<Vec<Seen>>>>, req: Request, next: Next) -> Response {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(Seen {
        method: req.method().clone(),
        path: req.uri().path().to_string(),
        user_agent,
    });
    next.run(req).await
}

/// Start the fixture origin on an ephemeral loopback port.
pub async fn spawn_origin() -> Origin {
    let seen = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/page", get(|| async { html(PAGE) }))
        .route("/broken-resources", get(|| async { html(BROKEN_RESOURCES) }))
        .route("/broken-favicon", get(|| async { html(BROKEN_FAVICON) }))
        .route("/duplicates", get(|| async { html(DUPLICATES) }))
        .route("/img/ok.png", get(|| async { png() }))
        .route("/favicon.ico", get(|| async { png() }))
        .route("/photo.png", get(|| async { png() }))
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/moved", get(|| async { Redirect::temporary("/page") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                html(PAGE)
            }),
        )
        .route(
            "/shift-jis",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html; charset=Shift_JIS")],
                    SHIFT_JIS_PAGE,
                )
            }),
        )
        .route(
            "/chunked",
            get(|| async {
                streamed(stream::once(async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(r#"<meta property="og:type" content="article"></head></html>"#)
                }))
            }),
        )
        .route(
            "/stalled",
            get(|| async {
                streamed(stream::once(async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok("</head></html>")
                }))
            }),
        )
        .route(
            "/truncated",
            get(|| async {
                streamed(stream::iter([Err(std::io::Error::other("connection reset"))]))
            }),
        )
        .layer(middleware::from_fn_with_state(seen.clone(), record));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Origin {
        base: format!("http://{addr}"),
        seen,
    }
}

pub fn test_fetcher() -> OgpFetcher {
    OgpFetcher::new(TEST_TIMEOUT).unwrap()
}

pub fn test_cache(store: Arc<dyn CacheStore>) -> CacheFront {
    CacheFront::new(test_fetcher(), store, Duration::from_secs(3600))
}

/// Build the application router wired to an in-memory cache.
pub fn create_test_app() -> Router {
    create_test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn create_test_app_with_store(store: Arc<dyn CacheStore>) -> Router {
    let state = AppState {
        ogp: Arc::new(test_cache(store)),
        extract_pool: LocalPoolHandle::new(1),
    };
    ogp_embed::routes(state)
}

/// GET the given URI and return status plus body, parsed as JSON when
/// possible and as a JSON string otherwise.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

/// Percent-encode a URL for use as a query parameter value.
pub fn encode(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}
