use std::{
    collections::HashSet,
    future::IntoFuture,
    io,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{StreamExt, stream};
use tokio::sync::oneshot;
use tracing::warn;

/// Path the mock serves, mirroring the real endpoint.
pub const API_PATH: &str = "/football/api/";

/// How the mock answers. Hit numbers are 1-based and count every request
/// the handler has seen, across all connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    AlwaysOk,
    AlwaysFail,
    /// 500 for the n-th hit, 200 otherwise.
    FailOn(usize),
    /// Never answers.
    Hang,
    /// Never answers the n-th hit, 200 otherwise.
    HangOn(usize),
    /// 200 for the n-th hit, but the connection drops before the body
    /// reaches its declared `Content-Length`.
    TruncateOn(usize),
}

#[derive(Clone)]
struct BackendState {
    behavior: Behavior,
    hits: Arc<AtomicUsize>,
    peers: Arc<Mutex<HashSet<SocketAddr>>>,
}

/// Local HTTP backend on `127.0.0.1` with a random port.
///
/// The server runs on its own thread and runtime so blocking clients and
/// `#[tokio::test]` runtimes can both talk to it. Dropping the value stops
/// the server and abandons any hanging requests.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    peers: Arc<Mutex<HashSet<SocketAddr>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn start(behavior: Behavior) -> Result<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")
            .context("Failed to bind mock backend")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let state = BackendState {
            behavior,
            hits: Arc::new(AtomicUsize::new(0)),
            peers: Arc::new(Mutex::new(HashSet::new())),
        };
        let hits = state.hits.clone();
        let peers = state.peers.clone();
        let app = Router::new()
            .route(API_PATH, get(football_api))
            .with_state(state);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to build mock backend runtime")?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("mock-backend".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let listener =
                        match tokio::net::TcpListener::from_std(listener) {
                            Ok(listener) => listener,
                            Err(e) => {
                                warn!("Mock backend listener failed: {}", e);
                                return;
                            }
                        };
                    let server = axum::serve(
                        listener,
                        app.into_make_service_with_connect_info::<SocketAddr>(),
                    )
                    .into_future();

                    tokio::select! {
                        result = server => {
                            if let Err(e) = result {
                                warn!("Mock backend stopped: {}", e);
                            }
                        }
                        _ = shutdown_rx => {}
                    }
                });
                runtime.shutdown_background();
            })
            .context("Failed to spawn mock backend thread")?;

        Ok(Self {
            addr,
            hits,
            peers,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn always_ok() -> Result<Self> { Self::start(Behavior::AlwaysOk) }

    pub fn url(&self) -> String { format!("http://{}{}", self.addr, API_PATH) }

    /// Requests that reached the handler.
    pub fn hits(&self) -> usize { self.hits.load(Ordering::SeqCst) }

    /// Distinct client sockets seen, i.e. TCP connections used.
    pub fn connections(&self) -> usize {
        self.peers.lock().map(|peers| peers.len()).unwrap_or_default()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

async fn football_api(
    State(state): State<BackendState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    if let Ok(mut peers) = state.peers.lock() {
        peers.insert(peer);
    }

    match state.behavior {
        Behavior::AlwaysFail => server_error(),
        Behavior::FailOn(n) if hit == n => server_error(),
        Behavior::Hang => std::future::pending().await,
        Behavior::HangOn(n) if hit == n => std::future::pending().await,
        Behavior::TruncateOn(n) if hit == n => truncated_body(),
        _ => fixtures(hit).into_response(),
    }
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

/// Sends the head and a first chunk, then fails the body stream so the
/// server aborts the connection mid-body.
fn truncated_body() -> Response {
    let head = stream::once(async {
        Ok::<_, io::Error>(Bytes::from_static(b"{\"competition\": \"Prem"))
    });
    let cut = stream::once(async {
        // Let the head and first chunk hit the wire before the abort.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err::<Bytes, _>(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "body cut short",
        ))
    });

    let mut response = Response::new(Body::from_stream(head.chain(cut)));
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from_static("4096"));
    response
}

fn fixtures(hit: usize) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "request": hit,
        "competition": "Premier League",
        "matches": [
            { "home": "Arsenal", "away": "Chelsea", "status": "FINISHED" },
            { "home": "Everton", "away": "Fulham", "status": "SCHEDULED" }
        ]
    }))
}
