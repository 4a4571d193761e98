//! In-process mock of the storage service.
//!
//! Mirrors the real service's contract closely enough to exercise the HTTP
//! client end to end:
//!
//! - open shares with a read limit are consumed on retrieval;
//! - bound shares are consumed only by `PUT /reads/{id}` carrying a valid
//!   signature from the recipient's key;
//! - exhausted or unknown ids answer 404 `{"error": "Secret not found"}`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use hidr::crypto::keypair;
use hidr::protocol::{
    ErrorResponse, InitRequest, PublicKeyResponse, RetrieveResponse, StoreRequest,
    SIGNATURE_HEADER,
};

#[derive(Default)]
pub struct Inner {
    pub users: HashMap<String, String>,
    pub secrets: HashMap<String, Record>,
    /// Every `PUT /reads/{id}` received, with its signature header.
    pub decrements: Vec<(String, Option<String>)>,
}

pub struct Record {
    pub request: StoreRequest,
    pub remaining: Option<u64>,
}

#[derive(Clone, Default)]
pub struct MockStorage {
    pub inner: Arc<Mutex<Inner>>,
}

impl MockStorage {
    /// Bind to an ephemeral loopback port and serve in the background.
    /// Returns the state handle and the base URL.
    pub async fn start() -> (Self, String) {
        let storage = MockStorage::default();
        let app = Router::new()
            .route("/init", post(init))
            .route("/users/:uid/key", get(public_key))
            .route("/store", post(store))
            .route("/retrieve/:id", get(retrieve))
            .route("/reads/:id", put(decrement))
            .with_state(storage.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (storage, format!("http://{addr}"))
    }

    pub fn stored(&self, id: &str) -> Option<StoreRequest> {
        let inner = self.inner.lock().unwrap();
        inner.secrets.get(id).map(|r| r.request.clone())
    }

    pub fn secret_count(&self) -> usize {
        self.inner.lock().unwrap().secrets.len()
    }

    pub fn decrements(&self) -> Vec<(String, Option<String>)> {
        self.inner.lock().unwrap().decrements.clone()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

async fn init(State(s): State<MockStorage>, Json(req): Json<InitRequest>) -> Response {
    let mut inner = s.inner.lock().unwrap();
    if inner.users.contains_key(&req.user_id) {
        return error(StatusCode::CONFLICT, "User already exists");
    }
    inner.users.insert(req.user_id, req.public_key);
    StatusCode::CREATED.into_response()
}

async fn public_key(State(s): State<MockStorage>, Path(uid): Path<String>) -> Response {
    let inner = s.inner.lock().unwrap();
    match inner.users.get(&uid) {
        Some(pem) => Json(PublicKeyResponse {
            public_key: pem.clone(),
        })
        .into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn store(State(s): State<MockStorage>, Json(req): Json<StoreRequest>) -> Response {
    let mut inner = s.inner.lock().unwrap();
    if req.ttl.is_some_and(|t| t < 60) {
        return error(StatusCode::BAD_REQUEST, "TTL too short");
    }
    let record = Record {
        remaining: req.reads.map(u64::from),
        request: req.clone(),
    };
    inner.secrets.insert(req.id, record);
    StatusCode::CREATED.into_response()
}

async fn retrieve(State(s): State<MockStorage>, Path(id): Path<String>) -> Response {
    let mut inner = s.inner.lock().unwrap();
    let Some(record) = inner.secrets.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Secret not found");
    };
    if record.remaining == Some(0) {
        return error(StatusCode::NOT_FOUND, "Secret not found");
    }
    // Open shares are consumed by retrieval itself.
    if record.request.uid.is_none() {
        if let Some(n) = record.remaining.as_mut() {
            *n -= 1;
        }
    }
    let req = &record.request;
    Json(RetrieveResponse {
        content: req.content.clone(),
        iv: req.iv.clone(),
        tag: req.tag.clone(),
        encrypted: req.encrypted.clone(),
        remaining_reads: record.remaining,
    })
    .into_response()
}

async fn decrement(
    State(s): State<MockStorage>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut inner = s.inner.lock().unwrap();
    inner.decrements.push((id.clone(), signature.clone()));

    let Some(uid) = inner.secrets.get(&id).map(|r| r.request.uid.clone()) else {
        return error(StatusCode::NOT_FOUND, "Secret not found");
    };
    if let Some(uid) = uid {
        let Some(pem) = inner.users.get(&uid) else {
            return error(StatusCode::NOT_FOUND, "User not found");
        };
        let valid = signature
            .as_deref()
            .is_some_and(|sig| keypair::verify(pem, id.as_bytes(), sig).is_ok());
        if !valid {
            return error(StatusCode::UNAUTHORIZED, "Invalid signature");
        }
    }

    if let Some(record) = inner.secrets.get_mut(&id) {
        if let Some(n) = record.remaining.as_mut() {
            *n = n.saturating_sub(1);
        }
    }
    StatusCode::NO_CONTENT.into_response()
}
