//! In-memory collaborators and request helpers shared by the router tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use floatpoint_common::BgcInput;
use floatpoint_inference::{
    normalise::{LABEL_CHLOROPHYLL, LABEL_SALINITY, LABEL_TEMPERATURE},
    InferenceBackend, InferenceError, LabelledValues, NlReply,
};
use floatpoint_store::{
    IdentityProvider, IdentityResolver, PersistenceWriter, RecordStore, StoreError, StoredQuery,
    TableNames,
};
use floatpoint_web::{
    dispatch::{PredictOptions, Predictor},
    router::build_router,
    state::AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const GOOD_TOKEN: &str = "good-token";
pub const USER_ID: &str = "user-1";

// ── Inference ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeBackend {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub last_datetime: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(InferenceError::Remote("space is sleeping".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl InferenceBackend for FakeBackend {
    async fn process_nl_query(&self, text: &str) -> Result<NlReply, InferenceError> {
        self.enter().await?;
        Ok(NlReply {
            text: format!("For \"{text}\": about 28.4 °C… and 12 more data points."),
        })
    }

    async fn predict_bgc(&self, _input: &BgcInput) -> Result<LabelledValues, InferenceError> {
        self.enter().await?;
        let mut reply = LabelledValues::new();
        reply.insert(LABEL_TEMPERATURE.into(), json!("28.1 °C"));
        reply.insert(LABEL_SALINITY.into(), json!("36.0 PSU"));
        reply.insert(LABEL_CHLOROPHYLL.into(), json!("n/a"));
        Ok(reply)
    }

    async fn predict_spatial_temporal(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: &str,
    ) -> Result<Value, InferenceError> {
        self.enter().await?;
        *self.last_datetime.lock().unwrap() = Some(datetime.to_string());
        Ok(json!({ "lat": latitude, "lon": longitude, "temperature": 27.9 }))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeIdentity {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_token(&self, token: &str) -> Result<String, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if token == GOOD_TOKEN {
            Ok(USER_ID.to_string())
        } else {
            Err(StoreError::Unauthorized)
        }
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeStore {
    pub rows: Mutex<Vec<(String, Value)>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl FakeStore {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Default::default() }
    }

    /// Background writes land shortly after the response; poll until `n` rows exist.
    pub async fn wait_for_rows(&self, n: usize) -> Vec<(String, Value)> {
        for _ in 0..200 {
            let rows = self.rows();
            if rows.len() >= n {
                return rows;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.rows()
    }

    pub fn rows(&self) -> Vec<(String, Value)> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed_query(&self, id: &str, user_id: &str, text: &str) {
        self.rows.lock().unwrap().push((
            "queries".to_string(),
            json!({
                "id": id,
                "user_id": user_id,
                "query_text": text,
                "params": { "type": "nlp" },
                "created_at": "2024-03-01T10:00:00+00:00",
            }),
        ));
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert(&self, table: &str, row: Value) -> floatpoint_store::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(StoreError::Api { status: 503, message: "read-only replica".into() });
        }
        self.rows.lock().unwrap().push((table.to_string(), row));
        Ok(())
    }

    async fn list_queries(&self, user_id: &str, limit: usize) -> floatpoint_store::Result<Vec<StoredQuery>> {
        if self.fail {
            return Err(StoreError::Api { status: 503, message: "read-only replica".into() });
        }
        let rows = self.rows.lock().unwrap();
        let mut out = Vec::new();
        for (table, row) in rows.iter().rev() {
            if table == "queries" && row["user_id"] == user_id && row.get("id").is_some() {
                out.push(serde_json::from_value(row.clone())?);
            }
        }
        out.truncate(limit);
        Ok(out)
    }

    async fn delete_query(&self, user_id: &str, id: &str) -> floatpoint_store::Result<bool> {
        if self.fail {
            return Err(StoreError::Api { status: 503, message: "read-only replica".into() });
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(table, row)| !(table == "queries" && row["id"] == id && row["user_id"] == user_id));
        Ok(rows.len() < before)
    }
}

// ── App ──────────────────────────────────────────────────────────────────────

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<FakeBackend>,
    pub identity: Arc<FakeIdentity>,
    pub store: Arc<FakeStore>,
}

pub const AUTH_TIMEOUT: Duration = Duration::from_millis(200);

pub fn app_with(backend: FakeBackend, store: FakeStore, timeout: Duration) -> TestApp {
    app_with_identity(backend, FakeIdentity::default(), store, timeout)
}

pub struct Wired {
    pub predictor: Predictor,
    pub resolver: IdentityResolver,
    pub backend: Arc<FakeBackend>,
    pub identity: Arc<FakeIdentity>,
    pub store: Arc<FakeStore>,
}

/// A `Predictor` over the fakes, with a short identity timeout.
pub fn wire(backend: FakeBackend, identity: FakeIdentity, store: FakeStore, timeout: Duration) -> Wired {
    let backend = Arc::new(backend);
    let identity = Arc::new(identity);
    let store = Arc::new(store);

    let resolver = IdentityResolver::new(identity.clone()).with_timeout(AUTH_TIMEOUT);
    let writer = PersistenceWriter::new(store.clone(), TableNames::default());
    let options = PredictOptions { timeout, strip_summary_suffix: true };
    let predictor = Predictor::new(backend.clone(), resolver.clone(), writer, options);
    Wired { predictor, resolver, backend, identity, store }
}

pub fn app_with_identity(
    backend: FakeBackend,
    identity: FakeIdentity,
    store: FakeStore,
    timeout: Duration,
) -> TestApp {
    let Wired { predictor, resolver, backend, identity, store } = wire(backend, identity, store, timeout);
    let state = AppState::new(predictor, resolver, Some(store.clone() as Arc<dyn RecordStore>), 50);
    TestApp { router: build_router(state), backend, identity, store }
}

pub fn app() -> TestApp {
    app_with(FakeBackend::default(), FakeStore::default(), Duration::from_secs(5))
}

pub fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    req.body(Body::from(body.to_string())).unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    req.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
