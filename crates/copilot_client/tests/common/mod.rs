//! In-process copilot backend for integration tests. Real HTTP on a free port,
//! with a counter of every request that reached it.
#![allow(dead_code)]

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct Backend {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl Backend {
    /// Requests that reached the server.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn count_hits(State(hits): State<Arc<AtomicUsize>>, req: Request, next: Next) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    next.run(req).await
}

fn counted(router: Router, hits: Arc<AtomicUsize>) -> Router {
    router.layer(middleware::from_fn_with_state(hits, count_hits))
}

/// Serve `router` on the current runtime.
pub async fn spawn(router: Router) -> Backend {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counted(router, hits.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Backend {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

/// Serve `router` from a background thread with its own runtime, for tests that
/// block (e.g. running the binary).
pub fn spawn_blocking(router: Router) -> Backend {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counted(router, hits.clone());
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap().port()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    let port = rx.recv().unwrap();
    Backend {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

/// Backend answering every endpoint successfully.
pub fn healthy_routes() -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({ "message": "Healthy" })) }))
        .route(
            "/api/hello",
            get(|| async { Json(json!({ "message": "Hello from backend" })) }),
        )
        .route(
            "/generate",
            post(|| async {
                Json(json!({ "content": "Mocked assistant response", "model": "gpt-4o-mini" }))
            }),
        )
        .route(
            "/explain",
            post(|| async { Json(json!({ "content": "Explained code", "model": "gpt-4o-mini" })) }),
        )
        .route(
            "/debug",
            post(|| async { Json(json!({ "content": "Debug steps", "model": "gpt-4o-mini" })) }),
        )
}

/// Routes that record each JSON body posted to `path` and answer with `reply`.
pub fn recording_route(path: &str, reply: Value) -> (Router, Arc<Mutex<Vec<Value>>>) {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let sink = bodies.clone();
    let router = Router::new().route(
        path,
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            let reply = reply.clone();
            async move {
                sink.lock().unwrap().push(body);
                Json(reply)
            }
        }),
    );
    (router, bodies)
}

/// A base URL on which nothing is listening.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
