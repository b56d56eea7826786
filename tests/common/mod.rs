#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use texpress::{AppState, Compiler, Config, api};
use texpress_traits::{Fetched, InMemoryStore, SharedStore, Store, StoreError};
use tower::ServiceExt;

pub struct TestService {
    pub root: TempDir,
    pub bin: TempDir,
    pub state: AppState,
    pub router: Router,
}

pub fn service(compiler_body: &str, store: Option<SharedStore>) -> TestService {
    service_with_timeout(compiler_body, store, Duration::from_secs(10))
}

pub fn service_with_timeout(
    compiler_body: &str,
    store: Option<SharedStore>,
    timeout: Duration,
) -> TestService {
    let root = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let compiler = Compiler::new(fixtures::write_compiler(bin.path(), compiler_body), timeout);

    let mut config = Config::default();
    config.storage.root = root.path().to_path_buf();
    let state = AppState::new(config, store, compiler).unwrap();
    let router = api::build_router(state.clone());

    TestService {
        root,
        bin,
        state,
        router,
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn is_workspace(entry: &std::fs::DirEntry) -> bool {
    let name = entry.file_name();
    let name = name.to_string_lossy();
    entry.path().is_dir() && name.len() == 32 && name.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn workspaces(root: &Path) -> usize {
    std::fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(is_workspace)
        .count()
}

/// Workspace removal is detached from the response, so poll for it.
pub async fn assert_workspaces_removed(root: &Path) {
    for _ in 0..200 {
        if workspaces(root) == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{} workspace(s) left under {}", workspaces(root), root.display());
}

/// A store that counts fetches and answers slowly, so concurrent requests
/// overlap.
pub struct CountingStore {
    inner: InMemoryStore,
    fetches: AtomicUsize,
    delay: Duration,
}

impl CountingStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryStore::new(),
            fetches: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn insert(&self, id: &str, data: &[u8]) {
        self.inner.insert(id, data.to_vec());
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn fetch(&self, id: &str) -> Result<Fetched, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(id).await
    }

    async fn store(&self, id: &str, data: Fetched) -> Result<(), StoreError> {
        self.inner.store(id, data).await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

pub fn shared(store: &Arc<CountingStore>) -> SharedStore {
    Arc::clone(store) as SharedStore
}
