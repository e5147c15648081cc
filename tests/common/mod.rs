#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use redirect_tracker::application::services::TrackingService;
use redirect_tracker::domain::click_event::ClickEvent;
use redirect_tracker::domain::redirect::RedirectDecision;
use redirect_tracker::state::AppState;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use url::Url;

pub const TEST_DESTINATION: &str = "https://example.com/portfolio";

/// State with logging enabled; events land in the returned receiver.
pub fn create_test_state(capacity: usize) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    let state = AppState::new(
        RedirectDecision::resolve(Some(TEST_DESTINATION)),
        TrackingService::new(tx),
    );
    (state, rx)
}

/// State without a collector endpoint.
pub fn create_disabled_state(destination: Option<&str>) -> AppState {
    AppState::new(
        RedirectDecision::resolve(destination),
        TrackingService::disabled(),
    )
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// How the mock collector answers a POST.
#[derive(Clone, Debug)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Text(&'static str),
    Delayed(Duration, Value),
    /// Apps Script style: 302 to a result URL answered on GET.
    AppsScript,
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Json(json!({ "status": "ok" }))
    }
}

/// A POST received by the mock collector.
#[derive(Debug)]
pub struct CapturedRequest {
    pub content_type: Option<String>,
    pub body: Value,
}

pub struct MockCollector {
    pub addr: SocketAddr,
    pub received: mpsc::UnboundedReceiver<CapturedRequest>,
}

impl MockCollector {
    pub fn endpoint(&self) -> Url {
        format!("http://{}/exec", self.addr).parse().unwrap()
    }

    /// Waits for the next captured POST.
    pub async fn next_request(&mut self, within: Duration) -> Option<CapturedRequest> {
        tokio::time::timeout(within, self.received.recv())
            .await
            .ok()
            .flatten()
    }
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    tx: mpsc::UnboundedSender<CapturedRequest>,
}

async fn collect(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let _ = state.tx.send(CapturedRequest { content_type, body });

    match state.reply {
        Reply::Json(value) => axum::Json(value).into_response(),
        Reply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        Reply::Text(text) => text.into_response(),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            axum::Json(value).into_response()
        }
        Reply::AppsScript => (
            StatusCode::FOUND,
            [(header::LOCATION, HeaderValue::from_static("/echo"))],
        )
            .into_response(),
    }
}

async fn echo() -> axum::Json<Value> {
    axum::Json(json!({ "status": "ok" }))
}

/// Starts a collector on an ephemeral port.
pub async fn spawn_mock_collector(reply: Reply) -> MockCollector {
    let (tx, received) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/exec", post(collect))
        .route("/echo", get(echo))
        .with_state(MockState { reply, tx });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockCollector { addr, received }
}

/// An address nothing listens on.
pub async fn unreachable_endpoint() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/exec", addr).parse().unwrap()
}
